//! Shortest-path search over a floor graph.
//!
//! Binary-heap Dijkstra with lazy deletion: stale queue entries are
//! skipped when popped. All weights are non-negative (distance × scale),
//! so the search may stop as soon as the end node is popped.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::graph::FloorGraph;
use crate::model::NodeId;

/// Result of a shortest-path query.
///
/// "No route exists" is an expected outcome, not a fault: it is encoded as
/// an infinite distance with an empty path rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Total path cost in metric units; `f64::INFINITY` when unreachable.
    pub distance: f64,
    /// Ordered node sequence from start to end inclusive. Empty when
    /// unreachable; `[start]` when start equals end.
    pub nodes: Vec<NodeId>,
}

impl Route {
    pub fn unreachable() -> Self {
        Self {
            distance: f64::INFINITY,
            nodes: Vec::new(),
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.distance.is_finite()
    }
}

/// Heap entry keyed by tentative distance. `BinaryHeap` is a max-heap, so
/// entries are pushed wrapped in `Reverse`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct QueueEntry {
    distance: f64,
    node: NodeId,
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Distances are never NaN: weights are products of non-negative
        // finite inputs. total_cmp keeps the impl panic-free regardless.
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Single-source Dijkstra from `start`, stopping once `end` is settled.
///
/// O((V+E) log V). Among equal-cost paths the result is whichever the heap
/// yields first; callers must not rely on a particular tie-break.
pub fn shortest_path(graph: &FloorGraph, start: NodeId, end: NodeId) -> Route {
    let mut distances: HashMap<NodeId, f64> = HashMap::new();
    let mut previous: HashMap<NodeId, NodeId> = HashMap::new();
    let mut heap = BinaryHeap::new();

    distances.insert(start, 0.0);
    heap.push(Reverse(QueueEntry {
        distance: 0.0,
        node: start,
    }));

    while let Some(Reverse(QueueEntry { distance, node })) = heap.pop() {
        if node == end {
            break;
        }
        // Stale entry: a shorter route to this node was already settled.
        if distance > distances.get(&node).copied().unwrap_or(f64::INFINITY) {
            continue;
        }

        for &(neighbor, weight) in graph.neighbors(node) {
            let candidate = distance + weight;
            let best = distances.get(&neighbor).copied().unwrap_or(f64::INFINITY);
            if candidate < best {
                distances.insert(neighbor, candidate);
                previous.insert(neighbor, node);
                heap.push(Reverse(QueueEntry {
                    distance: candidate,
                    node: neighbor,
                }));
            }
        }
    }

    let Some(&total) = distances.get(&end) else {
        trace!(%start, %end, "no path");
        return Route::unreachable();
    };

    // Walk predecessors back from the end, then reverse.
    let mut nodes = vec![end];
    let mut cursor = end;
    while let Some(&prev) = previous.get(&cursor) {
        nodes.push(prev);
        cursor = prev;
    }
    nodes.reverse();

    trace!(%start, %end, total, hops = nodes.len() - 1, "path found");

    Route {
        distance: total,
        nodes,
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Connectivity graph builder.
//!
//! Turns stored floor connectivity (edges with raw distances, floor scale)
//! into an immutable in-memory weighted undirected graph. The snapshot
//! holds no reference back to storage and can be rebuilt at any time.

use std::collections::HashMap;

use smallvec::SmallVec;
use tracing::debug;

use crate::model::{FloorId, NodeId};
use crate::store::Store;
use crate::{Error, Result};

/// Neighbor list entry: (neighbor node, edge weight in metric units).
pub type Neighbor = (NodeId, f64);

/// Options controlling graph construction.
#[derive(Debug, Clone, Copy)]
pub struct GraphOptions {
    /// Whether edges flagged non-walkable still enter the graph. Defaults
    /// to true, matching the behavior mobile clients were built against;
    /// set to false to route around blocked connections.
    pub include_non_walkable: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            include_non_walkable: true,
        }
    }
}

/// An immutable adjacency snapshot of one floor's connectivity.
///
/// Weights are `edge.distance × floor.scale` and therefore always
/// non-negative. Both directions are present for every stored edge.
#[derive(Debug, Clone, Default)]
pub struct FloorGraph {
    adjacency: HashMap<NodeId, SmallVec<[Neighbor; 4]>>,
}

impl FloorGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an undirected edge. Self-loops get a single entry.
    pub fn insert_edge(&mut self, a: NodeId, b: NodeId, weight: f64) {
        self.adjacency.entry(a).or_default().push((b, weight));
        if a != b {
            self.adjacency.entry(b).or_default().push((a, weight));
        }
    }

    /// Neighbors of a node; empty for unknown nodes.
    pub fn neighbors(&self, node: NodeId) -> &[Neighbor] {
        self.adjacency
            .get(&node)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Number of nodes that appear on at least one edge.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.adjacency.contains_key(&node)
    }
}

/// Build the connectivity graph for a floor.
///
/// Loads all edges for the floor and the floor's scale factor. Fails with
/// `NotFound` if the floor does not exist; a floor with no edges yields an
/// empty graph.
pub async fn build_graph<S: Store>(
    store: &S,
    floor_id: FloorId,
    opts: &GraphOptions,
) -> Result<FloorGraph> {
    let floor = store
        .get_floor(floor_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Floor {floor_id}")))?;
    let scale = floor.effective_scale();

    let edges = store.edges_by_floor(floor_id).await?;

    let mut graph = FloorGraph::new();
    let mut skipped = 0usize;
    for edge in &edges {
        if !opts.include_non_walkable && !edge.walkable {
            skipped += 1;
            continue;
        }
        graph.insert_edge(edge.start, edge.end, edge.distance * scale);
    }

    debug!(
        %floor_id,
        scale,
        edges = edges.len(),
        skipped,
        nodes = graph.node_count(),
        "built floor graph"
    );

    Ok(graph)
}

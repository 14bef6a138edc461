//! Edge — a walkable connection between two nodes on the same floor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FloorId, NodeId};

/// Opaque edge identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A connection between two nodes. Stored with a start/end orientation but
/// treated as undirected by the routing graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub start: NodeId,
    pub end: NodeId,
    /// Raw length in floor-local units; multiplied by the floor scale when
    /// the routing graph is built. Never negative.
    pub distance: f64,
    pub floor_id: FloorId,
    pub walkable: bool,
    pub created_at: DateTime<Utc>,
}

impl Edge {
    /// The "other" endpoint of the edge from the given node.
    pub fn other_node(&self, from: NodeId) -> Option<NodeId> {
        if from == self.start {
            Some(self.end)
        } else if from == self.end {
            Some(self.start)
        } else {
            None
        }
    }
}

/// Parameters for creating an edge. The store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEdge {
    pub start: NodeId,
    pub end: NodeId,
    pub distance: f64,
    pub floor_id: FloorId,
    pub walkable: bool,
}

impl NewEdge {
    pub fn new(start: NodeId, end: NodeId, distance: f64, floor_id: FloorId) -> Self {
        Self {
            start,
            end,
            distance,
            floor_id,
            walkable: true,
        }
    }

    pub fn non_walkable(mut self) -> Self {
        self.walkable = false;
        self
    }
}

//! Node — a point of interest or junction on a floor plan.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FloorId;

/// Opaque node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named location on a floor: room, stairwell, junction, elevator, ...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    /// Floor-local coordinates (same unit as raw edge distances).
    pub x: f64,
    pub y: f64,
    /// Category label, e.g. `"room"`, `"stairwell"`, `"junction"`.
    pub kind: String,
    pub floor_id: FloorId,
    pub created_at: DateTime<Utc>,
}

/// Parameters for creating a node. The store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNode {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub kind: String,
    pub floor_id: FloorId,
}

impl NewNode {
    pub fn new(name: impl Into<String>, floor_id: FloorId) -> Self {
        Self {
            name: name.into(),
            x: 0.0,
            y: 0.0,
            kind: "junction".into(),
            floor_id,
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }
}

/// Partial update for a node. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeUpdate {
    pub name: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub kind: Option<String>,
    pub floor_id: Option<FloorId>,
}

impl NodeUpdate {
    /// Apply this patch to an existing node in place.
    pub fn apply(&self, node: &mut Node) {
        if let Some(name) = &self.name {
            node.name = name.clone();
        }
        if let Some(x) = self.x {
            node.x = x;
        }
        if let Some(y) = self.y {
            node.y = y;
        }
        if let Some(kind) = &self.kind {
            node.kind = kind.clone();
        }
        if let Some(floor_id) = self.floor_id {
            node.floor_id = floor_id;
        }
    }
}

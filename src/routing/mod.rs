//! # Routing
//!
//! Walking routes between points of interest on a floor:
//!
//! - [`graph`] builds the weighted undirected connectivity graph for a
//!   floor from stored edges.
//! - [`dijkstra`] runs shortest-path search over that graph.

pub mod dijkstra;
pub mod graph;

pub use dijkstra::{Route, shortest_path};
pub use graph::{FloorGraph, GraphOptions, build_graph};

use serde::{Deserialize, Serialize};

use crate::model::Node;

/// A route with its node-id path resolved into full node records, so
/// callers get names and coordinates without extra lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDetails {
    /// Total walking distance in metric units; `f64::INFINITY` when no
    /// route exists.
    pub distance: f64,
    /// Nodes along the route, start first. Empty when no route exists.
    pub nodes: Vec<Node>,
}

impl RouteDetails {
    pub fn is_reachable(&self) -> bool {
        self.distance.is_finite()
    }
}

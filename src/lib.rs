//! # navigant — Indoor Positioning Core
//!
//! Locates a mobile device inside a building from ambient magnetic-field
//! readings and computes walking routes between points of interest on a
//! floor.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `Store` is the contract between the engines and
//!    persistence
//! 2. **Clean DTOs**: `Node`, `Edge`, `Fingerprint`, `MagSample` cross
//!    all boundaries
//! 3. **Pure computations**: feature extraction, k-NN, and Dijkstra take
//!    typed values and touch no storage
//! 4. **Derived cache only**: the classifier cache is rebuildable state,
//!    invalidated on every ingest, never a source of truth
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use navigant::{MagSample, Navigant, NewBuilding, NewFloor, NewNode, Store};
//!
//! # async fn example() -> navigant::Result<()> {
//! let nav = Navigant::open_memory();
//!
//! // Map setup (normally done by the editing layer).
//! let building = nav.store().create_building(NewBuilding::new("Library")).await?;
//! let floor = nav.store().create_floor(NewFloor::new(building.id, 1)).await?;
//! let desk = nav.store().create_node(NewNode::new("Front desk", floor.id)).await?;
//!
//! // Teach the classifier what the front desk "sounds" like magnetically.
//! let samples = vec![MagSample::new(21.0, -3.5, 44.2); 10];
//! nav.ingest_fingerprint(desk.id, &samples).await?;
//!
//! // Later: where is the device?
//! let predicted = nav.localize(&samples).await?;
//! assert_eq!(predicted, desk.id);
//! # Ok(())
//! # }
//! ```
//!
//! ## Operations
//!
//! | Operation | Method | Outcome |
//! |-----------|--------|---------|
//! | Build floor graph | `build_graph` | adjacency snapshot or `NotFound` |
//! | Shortest path | `shortest_path` | `Route` (infinite distance = no route) |
//! | Enriched route | `route` | `RouteDetails` with full node records |
//! | Ingest fingerprint | `ingest_fingerprint` | count stored or `InsufficientData` |
//! | Localize | `localize` | node id, `InsufficientData`, or `NoTrainingData` |

// ============================================================================
// Modules
// ============================================================================

pub mod localize;
pub mod ml;
pub mod model;
pub mod routing;
pub mod store;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Building, BuildingId, CaptureSession, Edge, EdgeId, FeatureVector, Fingerprint,
    FingerprintId, Floor, FloorId, FloorUpdate, MagSample, NewBuilding, NewEdge,
    NewFingerprint, NewFloor, NewNode, Node, NodeId, NodeUpdate, RawReading, ReadingId,
    SessionId,
};

// ============================================================================
// Re-exports: Store
// ============================================================================

pub use store::{MemoryStore, Store};

// ============================================================================
// Re-exports: Engines
// ============================================================================

pub use localize::ModelCache;
pub use ml::{Knn, extract_features};
pub use routing::{FloorGraph, GraphOptions, Route, RouteDetails, shortest_path};

use tracing::debug;

// ============================================================================
// Configuration
// ============================================================================

/// Tunables for the positioning engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Samples per feature window. Ingest and localize both reject inputs
    /// shorter than one window.
    pub window_size: usize,
    /// Neighbors consulted per k-NN prediction; clamped to the training
    /// set size when the fingerprint database is still small.
    pub k: usize,
    /// Whether non-walkable edges enter the routing graph.
    pub include_non_walkable: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_size: 10,
            k: 3,
            include_non_walkable: true,
        }
    }
}

impl Config {
    fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(Error::InvalidConfig("window_size must be positive".into()));
        }
        if self.k == 0 {
            return Err(Error::InvalidConfig("k must be positive".into()));
        }
        Ok(())
    }
}

// ============================================================================
// Top-level handle
// ============================================================================

/// The primary entry point. A `Navigant` wraps a storage collaborator and
/// provides routing and localization.
pub struct Navigant<S: Store> {
    store: S,
    config: Config,
    cache: localize::ModelCache,
}

impl<S: Store> Navigant<S> {
    /// Create a handle with the default configuration.
    pub fn with_store(store: S) -> Self {
        Self {
            store,
            config: Config::default(),
            cache: localize::ModelCache::new(),
        }
    }

    /// Create a handle with an explicit configuration.
    pub fn with_config(store: S, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            cache: localize::ModelCache::new(),
        })
    }

    /// Access the underlying store (for map editing and advanced use).
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ========================================================================
    // Routing
    // ========================================================================

    /// Build the connectivity graph for a floor. `NotFound` if the floor
    /// does not exist.
    pub async fn build_graph(&self, floor_id: FloorId) -> Result<FloorGraph> {
        let opts = GraphOptions {
            include_non_walkable: self.config.include_non_walkable,
        };
        routing::build_graph(&self.store, floor_id, &opts).await
    }

    /// Shortest path between two nodes over a previously built graph.
    pub fn shortest_path(&self, graph: &FloorGraph, start: NodeId, end: NodeId) -> Route {
        routing::shortest_path(graph, start, end)
    }

    /// Build the floor graph, search, and resolve the resulting node ids
    /// into full node records. An unreachable pair yields an empty,
    /// infinite-distance `RouteDetails`, not an error.
    pub async fn route(
        &self,
        floor_id: FloorId,
        start: NodeId,
        end: NodeId,
    ) -> Result<RouteDetails> {
        let graph = self.build_graph(floor_id).await?;
        let route = routing::shortest_path(&graph, start, end);

        let mut nodes = Vec::with_capacity(route.nodes.len());
        for id in &route.nodes {
            let node = self
                .store
                .get_node(*id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("Node {id}")))?;
            nodes.push(node);
        }

        Ok(RouteDetails {
            distance: route.distance,
            nodes,
        })
    }

    // ========================================================================
    // Localization
    // ========================================================================

    /// Ingest a capture: persist the raw readings, derive one fingerprint
    /// per complete window, and invalidate the cached classifier.
    ///
    /// Returns the number of fingerprints stored. Inputs shorter than one
    /// window are rejected with `InsufficientData` before anything is
    /// persisted.
    pub async fn ingest_fingerprint(
        &self,
        node_id: NodeId,
        samples: &[MagSample],
    ) -> Result<usize> {
        let node = self
            .store
            .get_node(node_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Node {node_id}")))?;

        let window = self.config.window_size;
        let features = ml::extract_features(samples, window);
        if features.is_empty() {
            return Err(Error::InsufficientData {
                got: samples.len(),
                need: window,
            });
        }

        let session = self.store.create_session(node.id).await?;
        self.store.save_raw_readings(&session.id, samples).await?;

        for vector in &features {
            self.store
                .save_fingerprint(NewFingerprint::from_features(node.id, vector, window))
                .await?;
        }

        self.cache.invalidate();
        debug!(
            node = %node.id,
            session = %session.id,
            samples = samples.len(),
            fingerprints = features.len(),
            "fingerprints ingested"
        );

        Ok(features.len())
    }

    /// Predict which node the device is at from a raw sample stream.
    ///
    /// `InsufficientData` if the stream is shorter than one window;
    /// `NoTrainingData` if no fingerprints have ever been ingested.
    pub async fn localize(&self, samples: &[MagSample]) -> Result<NodeId> {
        let window = self.config.window_size;
        let features = ml::extract_features(samples, window);
        if features.is_empty() {
            return Err(Error::InsufficientData {
                got: samples.len(),
                need: window,
            });
        }

        let model = self.cache.get_or_build(&self.store, self.config.k).await?;

        // The model is non-empty by construction, so a vote always exists.
        localize::classify_windows(&model, &features).ok_or(Error::NoTrainingData)
    }

    /// Current classifier generation (bumped on every ingest). Mostly
    /// useful for observability and tests.
    pub fn model_generation(&self) -> u64 {
        self.cache.generation()
    }
}

/// In-memory engine for testing and embedding.
impl Navigant<MemoryStore> {
    pub fn open_memory() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient data: {got} samples, need at least {need}")]
    InsufficientData { got: usize, need: usize },

    #[error("No training data: ingest at least one fingerprint first")]
    NoTrainingData,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

pub type Result<T> = std::result::Result<T, Error>;

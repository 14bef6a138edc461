//! # Store Trait
//!
//! This is THE contract between the positioning core and any persistence
//! layer. It covers the four collaborator roles the core consumes:
//!
//! | Role | Methods |
//! |------|---------|
//! | Graph data source | `edges_by_floor`, `get_floor` |
//! | Node lookup | `get_node` |
//! | Fingerprint store | `all_fingerprints`, `save_fingerprint` |
//! | Session store | `create_session`, `save_raw_readings` |
//!
//! plus the CRUD surface the map-editing layer sits on. The core only ever
//! reads map data; fingerprints are append-only.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | In-memory for testing/embedding |

pub mod memory;

use async_trait::async_trait;

use crate::Result;
use crate::model::*;

pub use memory::MemoryStore;

/// The universal persistence contract.
///
/// Storage failures surface as `Error::StorageError`; missing referenced
/// records as `Error::NotFound`. The trait performs no retries — retry
/// policy belongs to the implementation behind it.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    // ========================================================================
    // Buildings
    // ========================================================================

    async fn create_building(&self, new: NewBuilding) -> Result<Building>;

    /// Get a building by id. Returns `None` if not found.
    async fn get_building(&self, id: BuildingId) -> Result<Option<Building>>;

    // ========================================================================
    // Floors
    // ========================================================================

    /// Create a floor. Fails with `NotFound` if the building is absent.
    async fn create_floor(&self, new: NewFloor) -> Result<Floor>;

    async fn get_floor(&self, id: FloorId) -> Result<Option<Floor>>;

    async fn update_floor(&self, id: FloorId, patch: FloorUpdate) -> Result<Floor>;

    /// Delete a floor. Returns true if it existed.
    async fn delete_floor(&self, id: FloorId) -> Result<bool>;

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Create a node. Fails with `NotFound` if the floor is absent.
    async fn create_node(&self, new: NewNode) -> Result<Node>;

    async fn get_node(&self, id: NodeId) -> Result<Option<Node>>;

    async fn update_node(&self, id: NodeId, patch: NodeUpdate) -> Result<Node>;

    /// Delete a node. Returns true if it existed. Fails with
    /// `ConstraintViolation` while edges still reference the node.
    async fn delete_node(&self, id: NodeId) -> Result<bool>;

    // ========================================================================
    // Edges
    // ========================================================================

    /// Create an edge. Enforces the graph invariants: both endpoints must
    /// exist, live on the edge's floor, and the distance must be
    /// non-negative.
    async fn create_edge(&self, new: NewEdge) -> Result<Edge>;

    async fn get_edge(&self, id: EdgeId) -> Result<Option<Edge>>;

    /// Delete an edge. Returns true if it existed.
    async fn delete_edge(&self, id: EdgeId) -> Result<bool>;

    /// All edges stored for a floor, in insertion order.
    async fn edges_by_floor(&self, floor_id: FloorId) -> Result<Vec<Edge>>;

    // ========================================================================
    // Capture sessions & raw readings
    // ========================================================================

    /// Open a capture session at a node. Fails with `NotFound` if the node
    /// is absent. The store assigns the session id.
    async fn create_session(&self, node_id: NodeId) -> Result<CaptureSession>;

    /// Persist a batch of raw samples under a session, assigning ids and
    /// timestamps. Returns the number of readings stored.
    async fn save_raw_readings(&self, session: &SessionId, samples: &[MagSample])
    -> Result<usize>;

    // ========================================================================
    // Fingerprints
    // ========================================================================

    /// Persist a fingerprint, assigning id and timestamp.
    async fn save_fingerprint(&self, new: NewFingerprint) -> Result<Fingerprint>;

    /// All stored fingerprints — the classifier's training set.
    async fn all_fingerprints(&self) -> Result<Vec<Fingerprint>>;

    /// Total number of stored fingerprints.
    async fn fingerprint_count(&self) -> Result<u64>;
}

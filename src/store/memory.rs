//! In-memory store.
//!
//! This is the reference implementation of `Store`.
//! It uses simple HashMaps protected by RwLock.
//!
//! ## Limitations
//!
//! - **No persistence**: everything is lost when the process exits.
//! - **Per-collection locks**: multi-step mutations are NOT atomic. Safe
//!   for single-threaded or read-heavy use only.
//!
//! Use this store for:
//! - Testing the routing and localization engines
//! - Embedding the core in applications that don't need persistence

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::Store;
use crate::model::*;
use crate::{Error, Result};

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory map + fingerprint storage.
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    buildings: RwLock<HashMap<BuildingId, Building>>,
    floors: RwLock<HashMap<FloorId, Floor>>,
    nodes: RwLock<HashMap<NodeId, Node>>,
    /// Edges keyed by id; `edges_by_floor` scans in id order.
    edges: RwLock<HashMap<EdgeId, Edge>>,
    sessions: RwLock<HashMap<SessionId, CaptureSession>>,
    readings: RwLock<Vec<RawReading>>,
    fingerprints: RwLock<Vec<Fingerprint>>,
    next_building_id: AtomicU64,
    next_floor_id: AtomicU64,
    next_node_id: AtomicU64,
    next_edge_id: AtomicU64,
    next_session_id: AtomicU64,
    next_reading_id: AtomicU64,
    next_fingerprint_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                buildings: RwLock::new(HashMap::new()),
                floors: RwLock::new(HashMap::new()),
                nodes: RwLock::new(HashMap::new()),
                edges: RwLock::new(HashMap::new()),
                sessions: RwLock::new(HashMap::new()),
                readings: RwLock::new(Vec::new()),
                fingerprints: RwLock::new(Vec::new()),
                next_building_id: AtomicU64::new(1),
                next_floor_id: AtomicU64::new(1),
                next_node_id: AtomicU64::new(1),
                next_edge_id: AtomicU64::new(1),
                next_session_id: AtomicU64::new(1),
                next_reading_id: AtomicU64::new(1),
                next_fingerprint_id: AtomicU64::new(1),
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Store impl
// ============================================================================

#[async_trait]
impl Store for MemoryStore {
    // ========================================================================
    // Buildings
    // ========================================================================

    async fn create_building(&self, new: NewBuilding) -> Result<Building> {
        let id = BuildingId(self.inner.next_building_id.fetch_add(1, Ordering::Relaxed));
        let building = Building {
            id,
            name: new.name,
            description: new.description,
            created_at: Utc::now(),
        };
        self.inner.buildings.write().insert(id, building.clone());
        Ok(building)
    }

    async fn get_building(&self, id: BuildingId) -> Result<Option<Building>> {
        Ok(self.inner.buildings.read().get(&id).cloned())
    }

    // ========================================================================
    // Floors
    // ========================================================================

    async fn create_floor(&self, new: NewFloor) -> Result<Floor> {
        if !self.inner.buildings.read().contains_key(&new.building_id) {
            return Err(Error::NotFound(format!("Building {}", new.building_id)));
        }

        let id = FloorId(self.inner.next_floor_id.fetch_add(1, Ordering::Relaxed));
        let floor = Floor {
            id,
            building_id: new.building_id,
            level: new.level,
            map_img_url: new.map_img_url,
            scale: new.scale,
            origin_x: new.origin_x,
            origin_y: new.origin_y,
            created_at: Utc::now(),
        };
        self.inner.floors.write().insert(id, floor.clone());
        Ok(floor)
    }

    async fn get_floor(&self, id: FloorId) -> Result<Option<Floor>> {
        Ok(self.inner.floors.read().get(&id).cloned())
    }

    async fn update_floor(&self, id: FloorId, patch: FloorUpdate) -> Result<Floor> {
        let mut floors = self.inner.floors.write();
        let floor = floors
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Floor {id}")))?;
        patch.apply(floor);
        Ok(floor.clone())
    }

    async fn delete_floor(&self, id: FloorId) -> Result<bool> {
        Ok(self.inner.floors.write().remove(&id).is_some())
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    async fn create_node(&self, new: NewNode) -> Result<Node> {
        if !self.inner.floors.read().contains_key(&new.floor_id) {
            return Err(Error::NotFound(format!("Floor {}", new.floor_id)));
        }

        let id = NodeId(self.inner.next_node_id.fetch_add(1, Ordering::Relaxed));
        let node = Node {
            id,
            name: new.name,
            x: new.x,
            y: new.y,
            kind: new.kind,
            floor_id: new.floor_id,
            created_at: Utc::now(),
        };
        self.inner.nodes.write().insert(id, node.clone());
        Ok(node)
    }

    async fn get_node(&self, id: NodeId) -> Result<Option<Node>> {
        Ok(self.inner.nodes.read().get(&id).cloned())
    }

    async fn update_node(&self, id: NodeId, patch: NodeUpdate) -> Result<Node> {
        let mut nodes = self.inner.nodes.write();
        let node = nodes
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Node {id}")))?;
        patch.apply(node);
        Ok(node.clone())
    }

    async fn delete_node(&self, id: NodeId) -> Result<bool> {
        // Refuse to delete a node that edges still reference.
        {
            let edges = self.inner.edges.read();
            let referencing = edges
                .values()
                .filter(|e| e.start == id || e.end == id)
                .count();
            if referencing > 0 {
                return Err(Error::ConstraintViolation(format!(
                    "Cannot delete node {id} with {referencing} edges. Delete edges first."
                )));
            }
        }

        Ok(self.inner.nodes.write().remove(&id).is_some())
    }

    // ========================================================================
    // Edges
    // ========================================================================

    async fn create_edge(&self, new: NewEdge) -> Result<Edge> {
        if new.distance < 0.0 {
            return Err(Error::ConstraintViolation(format!(
                "Edge distance must be non-negative, got {}",
                new.distance
            )));
        }

        // Verify both endpoints exist and share the edge's floor.
        {
            let nodes = self.inner.nodes.read();
            for endpoint in [new.start, new.end] {
                let node = nodes
                    .get(&endpoint)
                    .ok_or_else(|| Error::NotFound(format!("Node {endpoint}")))?;
                if node.floor_id != new.floor_id {
                    return Err(Error::ConstraintViolation(format!(
                        "Node {endpoint} is on floor {}, edge is on floor {}",
                        node.floor_id, new.floor_id
                    )));
                }
            }
        }

        let id = EdgeId(self.inner.next_edge_id.fetch_add(1, Ordering::Relaxed));
        let edge = Edge {
            id,
            start: new.start,
            end: new.end,
            distance: new.distance,
            floor_id: new.floor_id,
            walkable: new.walkable,
            created_at: Utc::now(),
        };
        self.inner.edges.write().insert(id, edge.clone());
        Ok(edge)
    }

    async fn get_edge(&self, id: EdgeId) -> Result<Option<Edge>> {
        Ok(self.inner.edges.read().get(&id).cloned())
    }

    async fn delete_edge(&self, id: EdgeId) -> Result<bool> {
        Ok(self.inner.edges.write().remove(&id).is_some())
    }

    async fn edges_by_floor(&self, floor_id: FloorId) -> Result<Vec<Edge>> {
        let edges = self.inner.edges.read();
        let mut result: Vec<Edge> = edges
            .values()
            .filter(|e| e.floor_id == floor_id)
            .cloned()
            .collect();
        result.sort_by_key(|e| e.id.0);
        Ok(result)
    }

    // ========================================================================
    // Capture sessions & raw readings
    // ========================================================================

    async fn create_session(&self, node_id: NodeId) -> Result<CaptureSession> {
        if !self.inner.nodes.read().contains_key(&node_id) {
            return Err(Error::NotFound(format!("Node {node_id}")));
        }

        let n = self.inner.next_session_id.fetch_add(1, Ordering::Relaxed);
        let session = CaptureSession {
            id: SessionId(format!("mem-session-{n}")),
            node_id,
        };
        self.inner
            .sessions
            .write()
            .insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn save_raw_readings(
        &self,
        session: &SessionId,
        samples: &[MagSample],
    ) -> Result<usize> {
        if !self.inner.sessions.read().contains_key(session) {
            return Err(Error::NotFound(format!("Session {session}")));
        }

        let mut readings = self.inner.readings.write();
        for sample in samples {
            let id = ReadingId(self.inner.next_reading_id.fetch_add(1, Ordering::Relaxed));
            readings.push(RawReading {
                id,
                session_id: session.clone(),
                sample: *sample,
                timestamp: Utc::now(),
            });
        }
        Ok(samples.len())
    }

    // ========================================================================
    // Fingerprints
    // ========================================================================

    async fn save_fingerprint(&self, new: NewFingerprint) -> Result<Fingerprint> {
        if !self.inner.nodes.read().contains_key(&new.node_id) {
            return Err(Error::NotFound(format!("Node {}", new.node_id)));
        }

        let id = FingerprintId(
            self.inner
                .next_fingerprint_id
                .fetch_add(1, Ordering::Relaxed),
        );
        let fingerprint = Fingerprint {
            id,
            node_id: new.node_id,
            mean: new.mean,
            std_dev: new.std_dev,
            sample_count: new.sample_count,
            created_at: Utc::now(),
        };
        self.inner.fingerprints.write().push(fingerprint.clone());
        Ok(fingerprint)
    }

    async fn all_fingerprints(&self) -> Result<Vec<Fingerprint>> {
        Ok(self.inner.fingerprints.read().clone())
    }

    async fn fingerprint_count(&self) -> Result<u64> {
        Ok(self.inner.fingerprints.read().len() as u64)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_floor() -> (MemoryStore, FloorId) {
        let store = MemoryStore::new();
        let building = store
            .create_building(NewBuilding::new("Library"))
            .await
            .unwrap();
        let floor = store
            .create_floor(NewFloor::new(building.id, 1))
            .await
            .unwrap();
        (store, floor.id)
    }

    #[tokio::test]
    async fn test_create_and_get_node() {
        let (store, floor) = store_with_floor().await;

        let node = store
            .create_node(NewNode::new("Stairwell A", floor).at(3.0, 4.0).kind("stairwell"))
            .await
            .unwrap();
        let fetched = store.get_node(node.id).await.unwrap().unwrap();

        assert_eq!(fetched.name, "Stairwell A");
        assert_eq!(fetched.kind, "stairwell");
        assert_eq!((fetched.x, fetched.y), (3.0, 4.0));
    }

    #[tokio::test]
    async fn test_get_building() {
        let store = MemoryStore::new();
        let building = store
            .create_building(NewBuilding::new("Library"))
            .await
            .unwrap();

        let fetched = store.get_building(building.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Library");
        assert!(store.get_building(BuildingId(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_and_delete_floor() {
        let (store, floor) = store_with_floor().await;

        let patch = FloorUpdate {
            scale: Some(0.5),
            level: Some(3),
            ..Default::default()
        };
        let updated = store.update_floor(floor, patch).await.unwrap();
        assert_eq!(updated.scale, 0.5);
        assert_eq!(updated.level, 3);

        assert!(store.delete_floor(floor).await.unwrap());
        assert!(store.get_floor(floor).await.unwrap().is_none());
        assert!(!store.delete_floor(floor).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_edge() {
        let (store, floor) = store_with_floor().await;
        let a = store.create_node(NewNode::new("a", floor)).await.unwrap();
        let b = store.create_node(NewNode::new("b", floor)).await.unwrap();
        let edge = store
            .create_edge(NewEdge::new(a.id, b.id, 2.0, floor))
            .await
            .unwrap();

        let fetched = store.get_edge(edge.id).await.unwrap().unwrap();
        assert_eq!(fetched.other_node(a.id), Some(b.id));
        assert!(store.get_edge(EdgeId(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_node_missing_floor() {
        let store = MemoryStore::new();
        let result = store.create_node(NewNode::new("orphan", FloorId(99))).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_node() {
        let (store, floor) = store_with_floor().await;
        let node = store.create_node(NewNode::new("101", floor)).await.unwrap();

        let patch = NodeUpdate {
            name: Some("Room 101".into()),
            x: Some(7.5),
            ..Default::default()
        };
        let updated = store.update_node(node.id, patch).await.unwrap();

        assert_eq!(updated.name, "Room 101");
        assert_eq!(updated.x, 7.5);
        assert_eq!(updated.y, node.y);
    }

    #[tokio::test]
    async fn test_create_edge_checks_endpoints() {
        let (store, floor) = store_with_floor().await;
        let a = store.create_node(NewNode::new("a", floor)).await.unwrap();

        let result = store
            .create_edge(NewEdge::new(a.id, NodeId(42), 1.0, floor))
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_edge_rejects_cross_floor() {
        let (store, floor) = store_with_floor().await;
        let building = store.create_building(NewBuilding::new("Annex")).await.unwrap();
        let other_floor = store
            .create_floor(NewFloor::new(building.id, 2))
            .await
            .unwrap();

        let a = store.create_node(NewNode::new("a", floor)).await.unwrap();
        let b = store
            .create_node(NewNode::new("b", other_floor.id))
            .await
            .unwrap();

        let result = store.create_edge(NewEdge::new(a.id, b.id, 1.0, floor)).await;
        assert!(matches!(result, Err(Error::ConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_create_edge_rejects_negative_distance() {
        let (store, floor) = store_with_floor().await;
        let a = store.create_node(NewNode::new("a", floor)).await.unwrap();
        let b = store.create_node(NewNode::new("b", floor)).await.unwrap();

        let result = store
            .create_edge(NewEdge::new(a.id, b.id, -1.0, floor))
            .await;
        assert!(matches!(result, Err(Error::ConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_cannot_delete_connected_node() {
        let (store, floor) = store_with_floor().await;
        let a = store.create_node(NewNode::new("a", floor)).await.unwrap();
        let b = store.create_node(NewNode::new("b", floor)).await.unwrap();
        let edge = store
            .create_edge(NewEdge::new(a.id, b.id, 2.0, floor))
            .await
            .unwrap();

        assert!(store.delete_node(a.id).await.is_err());

        // After removing the edge the node can go.
        assert!(store.delete_edge(edge.id).await.unwrap());
        assert!(store.delete_node(a.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_edges_by_floor() {
        let (store, floor) = store_with_floor().await;
        let a = store.create_node(NewNode::new("a", floor)).await.unwrap();
        let b = store.create_node(NewNode::new("b", floor)).await.unwrap();
        let c = store.create_node(NewNode::new("c", floor)).await.unwrap();

        store.create_edge(NewEdge::new(a.id, b.id, 1.0, floor)).await.unwrap();
        store.create_edge(NewEdge::new(b.id, c.id, 2.0, floor)).await.unwrap();

        let edges = store.edges_by_floor(floor).await.unwrap();
        assert_eq!(edges.len(), 2);
        assert!(store.edges_by_floor(FloorId(99)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sessions_and_readings() {
        let (store, floor) = store_with_floor().await;
        let node = store.create_node(NewNode::new("lab", floor)).await.unwrap();

        let session = store.create_session(node.id).await.unwrap();
        assert_eq!(session.node_id, node.id);

        let samples = vec![MagSample::new(1.0, 2.0, 3.0); 4];
        let stored = store
            .save_raw_readings(&session.id, &samples)
            .await
            .unwrap();
        assert_eq!(stored, 4);

        let missing = SessionId("nope".into());
        assert!(store.save_raw_readings(&missing, &samples).await.is_err());
    }

    #[tokio::test]
    async fn test_fingerprints_accumulate() {
        let (store, floor) = store_with_floor().await;
        let node = store.create_node(NewNode::new("lab", floor)).await.unwrap();

        assert_eq!(store.fingerprint_count().await.unwrap(), 0);

        let new = NewFingerprint {
            node_id: node.id,
            mean: [1.0, 0.0, 0.0],
            std_dev: [0.0; 3],
            sample_count: 10,
        };
        let fp = store.save_fingerprint(new.clone()).await.unwrap();
        store.save_fingerprint(new).await.unwrap();

        assert_eq!(fp.sample_count, 10);
        assert_eq!(store.fingerprint_count().await.unwrap(), 2);
        assert_eq!(store.all_fingerprints().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fingerprint_requires_node() {
        let store = MemoryStore::new();
        let result = store
            .save_fingerprint(NewFingerprint {
                node_id: NodeId(7),
                mean: [0.0; 3],
                std_dev: [0.0; 3],
                sample_count: 10,
            })
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}

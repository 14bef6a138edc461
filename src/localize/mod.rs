//! # Localization
//!
//! Holds the trained classifier between queries. The cache is derived,
//! rebuildable state: it is never the source of truth, only an index over
//! the persisted fingerprints. Any fingerprint ingestion invalidates it
//! before the next localization request is served.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::ml::Knn;
use crate::ml::knn::majority_vote;
use crate::model::{FeatureVector, NodeId};
use crate::store::Store;
use crate::{Error, Result};

/// Process-wide cache of the fitted classifier.
///
/// Lifecycle: absent → ready(model, generation) → absent (on invalidation).
/// A single mutex guards the slot; rebuilds load training data with the
/// lock released and install the model only if no invalidation happened in
/// between, so a model fitted from pre-invalidation data is never served.
/// A failed rebuild leaves the slot empty, forcing a clean retry.
pub struct ModelCache {
    slot: Mutex<Option<Arc<Knn>>>,
    generation: AtomicU64,
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// The current model generation; bumped on every invalidation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Whether a fitted model is currently cached.
    pub fn is_ready(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Drop the cached model. The next query rebuilds from storage.
    pub fn invalidate(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.slot.lock() = None;
        debug!(generation, "model cache invalidated");
    }

    /// Return the cached model, fitting a fresh one from the persisted
    /// fingerprints if the slot is empty.
    ///
    /// Zero stored fingerprints yield `NoTrainingData`; the slot stays
    /// empty so the next ingest can make localization work again.
    pub async fn get_or_build<S: Store>(&self, store: &S, k: usize) -> Result<Arc<Knn>> {
        loop {
            if let Some(model) = self.slot.lock().as_ref() {
                return Ok(Arc::clone(model));
            }

            let observed = self.generation.load(Ordering::SeqCst);
            let fingerprints = store.all_fingerprints().await?;
            if fingerprints.is_empty() {
                return Err(Error::NoTrainingData);
            }

            let training: Vec<(FeatureVector, NodeId)> = fingerprints
                .iter()
                .map(|fp| (fp.features(), fp.node_id))
                .collect();
            let fitted = Arc::new(Knn::fit(training, k));

            let mut slot = self.slot.lock();
            if self.generation.load(Ordering::SeqCst) == observed {
                let model = slot.get_or_insert_with(|| Arc::clone(&fitted));
                info!(
                    generation = observed,
                    fingerprints = fingerprints.len(),
                    k,
                    "classifier ready"
                );
                return Ok(Arc::clone(model));
            }

            // Invalidated while fitting: discard this model and retry so a
            // stale training set never gets installed.
            debug!(generation = observed, "rebuild raced an invalidation, retrying");
            drop(slot);
        }
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify each window independently, then majority-vote across windows
/// (ties to the earliest window). `None` only for an empty window list or
/// an empty model, both of which the callers rule out.
pub fn classify_windows(model: &Knn, windows: &[FeatureVector]) -> Option<NodeId> {
    majority_vote(model.predict_batch(windows).into_iter().flatten())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewBuilding, NewFingerprint, NewFloor, NewNode};
    use crate::store::MemoryStore;

    async fn store_with_node() -> (MemoryStore, NodeId) {
        let store = MemoryStore::new();
        let building = store.create_building(NewBuilding::new("B")).await.unwrap();
        let floor = store
            .create_floor(NewFloor::new(building.id, 1))
            .await
            .unwrap();
        let node = store.create_node(NewNode::new("n", floor.id)).await.unwrap();
        (store, node.id)
    }

    fn fingerprint_at(node_id: NodeId, mean_x: f64) -> NewFingerprint {
        NewFingerprint {
            node_id,
            mean: [mean_x, 0.0, 0.0],
            std_dev: [0.0; 3],
            sample_count: 10,
        }
    }

    #[tokio::test]
    async fn test_empty_store_yields_no_training_data() {
        let store = MemoryStore::new();
        let cache = ModelCache::new();

        let result = cache.get_or_build(&store, 3).await;
        assert!(matches!(result, Err(Error::NoTrainingData)));
        assert!(!cache.is_ready());
    }

    #[tokio::test]
    async fn test_build_then_reuse() {
        let (store, node) = store_with_node().await;
        store.save_fingerprint(fingerprint_at(node, 1.0)).await.unwrap();

        let cache = ModelCache::new();
        let first = cache.get_or_build(&store, 3).await.unwrap();
        assert!(cache.is_ready());

        // A second call returns the same instance, not a refit.
        let second = cache.get_or_build(&store, 3).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_invalidate_forces_rebuild() {
        let (store, node) = store_with_node().await;
        store.save_fingerprint(fingerprint_at(node, 1.0)).await.unwrap();

        let cache = ModelCache::new();
        let first = cache.get_or_build(&store, 3).await.unwrap();
        assert_eq!(first.len(), 1);

        store.save_fingerprint(fingerprint_at(node, 2.0)).await.unwrap();
        let generation = cache.generation();
        cache.invalidate();
        assert_eq!(cache.generation(), generation + 1);
        assert!(!cache.is_ready());

        let second = cache.get_or_build(&store, 3).await.unwrap();
        assert_eq!(second.len(), 2);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_classify_windows_majority() {
        let (store, node) = store_with_node().await;
        let other = {
            let floor = store.get_node(node).await.unwrap().unwrap().floor_id;
            store
                .create_node(NewNode::new("m", floor))
                .await
                .unwrap()
                .id
        };
        store.save_fingerprint(fingerprint_at(node, 0.0)).await.unwrap();
        store.save_fingerprint(fingerprint_at(other, 10.0)).await.unwrap();

        let cache = ModelCache::new();
        let model = cache.get_or_build(&store, 1).await.unwrap();

        // Two windows near 0, one near 10: majority says `node`.
        let windows = [
            FeatureVector([0.1, 0.0, 0.0, 0.0, 0.0, 0.0]),
            FeatureVector([9.9, 0.0, 0.0, 0.0, 0.0, 0.0]),
            FeatureVector([0.2, 0.0, 0.0, 0.0, 0.0, 0.0]),
        ];
        assert_eq!(classify_windows(&model, &windows), Some(node));
    }

    #[test]
    fn test_classify_no_windows() {
        let model = Knn::fit(Vec::new(), 1);
        assert_eq!(classify_windows(&model, &[]), None);
    }
}

//! Brute-force k-nearest-neighbor classifier.
//!
//! Training sets here are small (one fingerprint per captured window), so
//! every prediction scans the full set; no spatial index is kept. The
//! label type is the node the training fingerprint was captured at.

use std::collections::HashMap;

use crate::model::{FeatureVector, NodeId};

/// A fitted k-NN model. Fit once, predict many times; never mutated after
/// construction (the cache replaces the whole model on invalidation).
#[derive(Debug, Clone)]
pub struct Knn {
    k: usize,
    training: Vec<(FeatureVector, NodeId)>,
}

impl Knn {
    /// Fit a model over labeled feature vectors.
    ///
    /// `k` larger than the training set is clamped to the set size at
    /// prediction time rather than rejected: a sparse fingerprint database
    /// is a normal early state, not an error.
    pub fn fit(training: Vec<(FeatureVector, NodeId)>, k: usize) -> Self {
        Self { k, training }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.training.len()
    }

    pub fn is_empty(&self) -> bool {
        self.training.is_empty()
    }

    /// Predict the label for one query vector, or `None` on an empty
    /// training set.
    ///
    /// Euclidean distance to every training vector; the k smallest win,
    /// equal distances keeping training order (stable sort). Majority vote
    /// among the winners, frequency ties broken by whichever label occurs
    /// first in distance order.
    pub fn predict(&self, query: &FeatureVector) -> Option<NodeId> {
        if self.training.is_empty() {
            return None;
        }

        let mut ranked: Vec<(f64, NodeId)> = self
            .training
            .iter()
            .map(|(vector, label)| (query.euclidean(vector), *label))
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

        let k = self.k.min(ranked.len());
        majority_vote(ranked[..k].iter().map(|(_, label)| *label))
    }

    /// Predict independently for each query vector.
    pub fn predict_batch(&self, queries: &[FeatureVector]) -> Vec<Option<NodeId>> {
        queries.iter().map(|q| self.predict(q)).collect()
    }
}

/// Most frequent label; frequency ties go to the label seen earliest.
pub(crate) fn majority_vote(labels: impl IntoIterator<Item = NodeId>) -> Option<NodeId> {
    let mut counts: HashMap<NodeId, (usize, usize)> = HashMap::new();
    for (position, label) in labels.into_iter().enumerate() {
        let entry = counts.entry(label).or_insert((0, position));
        entry.0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(label, _)| label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(x: f64) -> FeatureVector {
        FeatureVector([x, 0.0, 0.0, 0.0, 0.0, 0.0])
    }

    #[test]
    fn test_single_example_always_wins_with_k1() {
        let model = Knn::fit(vec![(vector(0.0), NodeId(7))], 1);

        assert_eq!(model.predict(&vector(0.0)), Some(NodeId(7)));
        assert_eq!(model.predict(&vector(1000.0)), Some(NodeId(7)));
    }

    #[test]
    fn test_nearest_neighbor_wins() {
        let model = Knn::fit(
            vec![(vector(0.0), NodeId(1)), (vector(10.0), NodeId(2))],
            1,
        );

        assert_eq!(model.predict(&vector(1.0)), Some(NodeId(1)));
        assert_eq!(model.predict(&vector(9.0)), Some(NodeId(2)));
    }

    #[test]
    fn test_majority_beats_proximity() {
        // Closest single neighbor is node 2, but two of the three nearest
        // are node 1.
        let model = Knn::fit(
            vec![
                (vector(5.0), NodeId(2)),
                (vector(3.0), NodeId(1)),
                (vector(7.0), NodeId(1)),
                (vector(100.0), NodeId(3)),
            ],
            3,
        );

        assert_eq!(model.predict(&vector(5.0)), Some(NodeId(1)));
    }

    #[test]
    fn test_frequency_tie_goes_to_nearest_label() {
        // k=2: one vote each; node 9 is closer, so it wins the tie.
        let model = Knn::fit(
            vec![(vector(1.0), NodeId(9)), (vector(2.0), NodeId(4))],
            2,
        );

        assert_eq!(model.predict(&vector(0.0)), Some(NodeId(9)));
    }

    #[test]
    fn test_k_clamped_to_training_size() {
        let model = Knn::fit(vec![(vector(0.0), NodeId(1))], 5);
        assert_eq!(model.k(), 5);
        assert_eq!(model.len(), 1);
        assert_eq!(model.predict(&vector(2.0)), Some(NodeId(1)));
    }

    #[test]
    fn test_empty_training_set_predicts_nothing() {
        let model = Knn::fit(Vec::new(), 3);
        assert_eq!(model.predict(&vector(0.0)), None);
        assert!(model.is_empty());
    }

    #[test]
    fn test_equal_distances_keep_training_order() {
        // Both training vectors are equidistant from the query; with k=1
        // the earlier training row must win.
        let model = Knn::fit(
            vec![(vector(-1.0), NodeId(5)), (vector(1.0), NodeId(6))],
            1,
        );
        assert_eq!(model.predict(&vector(0.0)), Some(NodeId(5)));
    }

    #[test]
    fn test_predict_batch_is_independent() {
        let model = Knn::fit(
            vec![(vector(0.0), NodeId(1)), (vector(10.0), NodeId(2))],
            1,
        );

        let results = model.predict_batch(&[vector(1.0), vector(9.0)]);
        assert_eq!(results, vec![Some(NodeId(1)), Some(NodeId(2))]);
    }

    #[test]
    fn test_majority_vote_tiebreak() {
        assert_eq!(
            majority_vote([NodeId(1), NodeId(2), NodeId(2), NodeId(1)]),
            Some(NodeId(1))
        );
        assert_eq!(majority_vote([]), None);
    }
}

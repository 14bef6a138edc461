//! Fingerprint — a labeled statistical summary of one sampling window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::NodeId;

/// Number of magnetometer axes.
pub const AXES: usize = 3;

/// Opaque fingerprint identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FingerprintId(pub u64);

impl std::fmt::Display for FingerprintId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 6-dimensional feature vector, ordered
/// `[mean_x, mean_y, mean_z, std_x, std_y, std_z]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; 2 * AXES]);

impl FeatureVector {
    pub fn from_stats(mean: [f64; AXES], std_dev: [f64; AXES]) -> Self {
        Self([mean[0], mean[1], mean[2], std_dev[0], std_dev[1], std_dev[2]])
    }

    pub fn mean(&self) -> [f64; AXES] {
        [self.0[0], self.0[1], self.0[2]]
    }

    pub fn std_dev(&self) -> [f64; AXES] {
        [self.0[3], self.0[4], self.0[5]]
    }

    /// Euclidean distance to another vector.
    pub fn euclidean(&self, other: &FeatureVector) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

impl From<[f64; 2 * AXES]> for FeatureVector {
    fn from(v: [f64; 2 * AXES]) -> Self {
        Self(v)
    }
}

/// A labeled feature vector: per-axis mean and population standard
/// deviation over one fixed-size window of samples, tied to the node where
/// the window was captured. Fingerprints are accumulated, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub id: FingerprintId,
    pub node_id: NodeId,
    pub mean: [f64; AXES],
    pub std_dev: [f64; AXES],
    /// Always equals the window size the extractor ran with.
    pub sample_count: usize,
    pub created_at: DateTime<Utc>,
}

impl Fingerprint {
    /// The 6-d training vector this fingerprint contributes.
    pub fn features(&self) -> FeatureVector {
        FeatureVector::from_stats(self.mean, self.std_dev)
    }
}

/// Parameters for persisting a fingerprint. The store assigns id and
/// timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFingerprint {
    pub node_id: NodeId,
    pub mean: [f64; AXES],
    pub std_dev: [f64; AXES],
    pub sample_count: usize,
}

impl NewFingerprint {
    pub fn from_features(node_id: NodeId, features: &FeatureVector, sample_count: usize) -> Self {
        Self {
            node_id,
            mean: features.mean(),
            std_dev: features.std_dev(),
            sample_count,
        }
    }
}

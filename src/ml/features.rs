//! Windowed feature extraction.
//!
//! Raw sample sequences are partitioned into consecutive non-overlapping
//! windows of exactly `window` samples; a trailing remainder is dropped,
//! never padded. Each complete window yields one 6-d feature vector:
//! per-axis mean and per-axis population standard deviation.

use crate::model::{AXES, FeatureVector, MagSample};

/// Extract one feature vector per complete window, in window order.
///
/// Fewer than `window` samples yield an empty result — callers must treat
/// that as "insufficient data", not a silent default.
pub fn extract_features(samples: &[MagSample], window: usize) -> Vec<FeatureVector> {
    debug_assert!(window > 0, "window size must be positive");
    if window == 0 {
        return Vec::new();
    }

    samples.chunks_exact(window).map(window_stats).collect()
}

/// Mean and population standard deviation per axis over one window.
fn window_stats(window: &[MagSample]) -> FeatureVector {
    let n = window.len() as f64;

    let mut mean = [0.0; AXES];
    for s in window {
        mean[0] += s.x;
        mean[1] += s.y;
        mean[2] += s.z;
    }
    for m in &mut mean {
        *m /= n;
    }

    let mut var = [0.0; AXES];
    for s in window {
        var[0] += (s.x - mean[0]) * (s.x - mean[0]);
        var[1] += (s.y - mean[1]) * (s.y - mean[1]);
        var[2] += (s.z - mean[2]) * (s.z - mean[2]);
    }
    let std_dev = [
        (var[0] / n).sqrt(),
        (var[1] / n).sqrt(),
        (var[2] / n).sqrt(),
    ];

    FeatureVector::from_stats(mean, std_dev)
}

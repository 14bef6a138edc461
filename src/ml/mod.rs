//! # Sensing ML
//!
//! The two pure computations behind magnetic localization:
//!
//! - [`features`] turns raw 3-axis sample streams into fixed-size
//!   statistical feature vectors.
//! - [`knn`] classifies feature vectors against labeled training vectors
//!   by nearest-neighbor majority vote.
//!
//! Both are synchronous and storage-free; the cache in
//! [`crate::localize`] wires them to persisted fingerprints.

pub mod features;
pub mod knn;

pub use features::extract_features;
pub use knn::Knn;

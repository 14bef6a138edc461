//! # Domain Model
//!
//! Clean DTOs for the indoor map and the magnetic sensing pipeline.
//! These types cross every boundary: store ↔ routing ↔ localization ↔ user.
//!
//! Design rule: this module is pure data — no I/O, no state, no async.

pub mod node;
pub mod edge;
pub mod floor;
pub mod reading;
pub mod fingerprint;

pub use node::{NewNode, Node, NodeId, NodeUpdate};
pub use edge::{Edge, EdgeId, NewEdge};
pub use floor::{
    Building, BuildingId, Floor, FloorId, FloorUpdate, NewBuilding, NewFloor,
};
pub use reading::{CaptureSession, MagSample, RawReading, ReadingId, SessionId};
pub use fingerprint::{AXES, FeatureVector, Fingerprint, FingerprintId, NewFingerprint};

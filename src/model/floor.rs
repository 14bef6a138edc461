//! Building and Floor — the map containers the graph lives in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque building identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildingId(pub u64);

impl std::fmt::Display for BuildingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque floor identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FloorId(pub u64);

impl std::fmt::Display for FloorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBuilding {
    pub name: String,
    pub description: Option<String>,
}

impl NewBuilding {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

/// One level of a building. The scale factor converts raw edge distances
/// (floor-plan units) into metres; the floor-plan metadata is carried for
/// upstream consumers and unused by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub id: FloorId,
    pub building_id: BuildingId,
    pub level: i32,
    pub map_img_url: Option<String>,
    pub scale: f64,
    pub origin_x: f64,
    pub origin_y: f64,
    pub created_at: DateTime<Utc>,
}

impl Floor {
    /// Scale used for graph weights. An unset (zero or negative) scale
    /// falls back to 1.0 so raw distances pass through unchanged.
    pub fn effective_scale(&self) -> f64 {
        if self.scale > 0.0 { self.scale } else { 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFloor {
    pub building_id: BuildingId,
    pub level: i32,
    pub map_img_url: Option<String>,
    pub scale: f64,
    pub origin_x: f64,
    pub origin_y: f64,
}

impl NewFloor {
    pub fn new(building_id: BuildingId, level: i32) -> Self {
        Self {
            building_id,
            level,
            map_img_url: None,
            scale: 1.0,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// Partial update for a floor. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FloorUpdate {
    pub building_id: Option<BuildingId>,
    pub level: Option<i32>,
    pub map_img_url: Option<String>,
    pub scale: Option<f64>,
    pub origin_x: Option<f64>,
    pub origin_y: Option<f64>,
}

impl FloorUpdate {
    /// Apply this patch to an existing floor in place.
    pub fn apply(&self, floor: &mut Floor) {
        if let Some(building_id) = self.building_id {
            floor.building_id = building_id;
        }
        if let Some(level) = self.level {
            floor.level = level;
        }
        if let Some(url) = &self.map_img_url {
            floor.map_img_url = Some(url.clone());
        }
        if let Some(scale) = self.scale {
            floor.scale = scale;
        }
        if let Some(origin_x) = self.origin_x {
            floor.origin_x = origin_x;
        }
        if let Some(origin_y) = self.origin_y {
            floor.origin_y = origin_y;
        }
    }
}

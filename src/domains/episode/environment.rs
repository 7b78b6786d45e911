use serde::{Deserialize, Serialize};

use super::geometry::{Point3D, TraversabilityGrid};
use crate::common::{DecodeError, DecodeResult};

/// Static surroundings of an episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EnvironmentFields")]
pub struct Environment {
    scale: f64,
    room_center: Point3D,
    building_grid: TraversabilityGrid,
    human_grid: TraversabilityGrid,
}

#[derive(Deserialize)]
struct EnvironmentFields {
    scale: f64,
    room_center: Point3D,
    building_grid: TraversabilityGrid,
    #[serde(default)]
    human_grid: TraversabilityGrid,
}

impl TryFrom<EnvironmentFields> for Environment {
    type Error = DecodeError;

    fn try_from(f: EnvironmentFields) -> DecodeResult<Self> {
        Self::new(f.scale, f.room_center, f.building_grid, f.human_grid)
    }
}

impl Environment {
    /// `scale` is metres per grid cell and must be positive.
    pub fn new(
        scale: f64,
        room_center: Point3D,
        building_grid: TraversabilityGrid,
        human_grid: TraversabilityGrid,
    ) -> DecodeResult<Self> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(DecodeError::InvalidScale(scale));
        }
        Ok(Self {
            scale,
            room_center,
            building_grid,
            human_grid,
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn room_center(&self) -> Point3D {
        self.room_center
    }

    pub fn building_grid(&self) -> &TraversabilityGrid {
        &self.building_grid
    }

    pub fn human_grid(&self) -> &TraversabilityGrid {
        &self.human_grid
    }

    /// Whether the world position `(x, y)` in metres lies on a navigable cell.
    ///
    /// The human grid only constrains the answer when it has been supplied and
    /// matches the building grid's shape.
    pub fn is_traversable(&self, x: f64, y: f64) -> bool {
        if x < 0.0 || y < 0.0 || !x.is_finite() || !y.is_finite() {
            return false;
        }
        let col = (x / self.scale).floor() as usize;
        let row = (y / self.scale).floor() as usize;

        if !self.building_grid.is_traversable(row, col) {
            return false;
        }
        if !self.human_grid.is_empty() && self.human_grid.shape() == self.building_grid.shape() {
            return self.human_grid.is_traversable(row, col);
        }
        true
    }
}

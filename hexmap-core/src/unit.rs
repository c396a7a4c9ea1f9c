//! Units placed on map cells

use serde::{Deserialize, Serialize};

use crate::cell::CellIndex;

/// Unit identifier, unique for the lifetime of a grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// A unit standing on a cell
#[derive(Clone, Debug, PartialEq)]
pub struct HexUnit {
    id: UnitId,
    location: CellIndex,
    /// Facing in degrees around the vertical axis
    pub orientation: f32,
}

impl HexUnit {
    pub(crate) fn new(id: UnitId, location: CellIndex, orientation: f32) -> Self {
        Self {
            id,
            location,
            orientation,
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn location(&self) -> CellIndex {
        self.location
    }

    pub(crate) fn set_location(&mut self, location: CellIndex) {
        self.location = location;
    }
}

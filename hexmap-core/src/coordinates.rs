//! Hex coordinates (cube form) and directions

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metrics::{Position, INNER_RADIUS, OUTER_RADIUS};

/// Cube hex coordinates. Only `x` and `z` are stored; `y = -x - z`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HexCoordinates {
    x: i32,
    z: i32,
}

impl HexCoordinates {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        -self.x - self.z
    }

    pub fn z(&self) -> i32 {
        self.z
    }

    /// Convert offset (column, row) coordinates to cube coordinates
    pub fn from_offset(col: i32, row: i32) -> Self {
        Self::new(col - row / 2, row)
    }

    /// Convert back to offset (column, row)
    pub fn to_offset(&self) -> (i32, i32) {
        (self.x + self.z / 2, self.z)
    }

    /// Coordinates of the cell containing a planar position
    pub fn from_position(position: Position) -> Self {
        let mut x = position.x / (INNER_RADIUS * 2.0);
        let mut y = -x;

        let offset = position.z / (OUTER_RADIUS * 3.0);
        x -= offset;
        y -= offset;

        let mut ix = x.round_ties_even() as i32;
        let iy = y.round_ties_even() as i32;
        let mut iz = (-x - y).round_ties_even() as i32;

        if ix + iy + iz != 0 {
            let dx = (x - ix as f32).abs();
            let dy = (y - iy as f32).abs();
            let dz = (-x - y - iz as f32).abs();

            if dx > dy && dx > dz {
                ix = -iy - iz;
            } else if dz > dy {
                iz = -ix - iy;
            }
            // Otherwise y carries the error and y is never stored.
        }

        Self::new(ix, iz)
    }

    /// Distance between two hexes
    pub fn distance_to(&self, other: HexCoordinates) -> i32 {
        ((self.x - other.x).abs() + (self.y() - other.y()).abs() + (self.z - other.z).abs()) / 2
    }

    /// Adjacent coordinates in a direction
    pub fn step(&self, direction: HexDirection) -> Self {
        let (dx, dz) = direction.delta();
        Self::new(self.x + dx, self.z + dz)
    }
}

impl fmt::Display for HexCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y(), self.z)
    }
}

/// The six hex directions, clockwise from north-east
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HexDirection {
    NE = 0,
    E = 1,
    SE = 2,
    SW = 3,
    W = 4,
    NW = 5,
}

/// All directions in index order
pub const DIRECTIONS: [HexDirection; 6] = [
    HexDirection::NE,
    HexDirection::E,
    HexDirection::SE,
    HexDirection::SW,
    HexDirection::W,
    HexDirection::NW,
];

/// Cube deltas (dx, dz) per direction index
const DELTAS: [(i32, i32); 6] = [
    (0, 1),   // NE
    (1, 0),   // E
    (1, -1),  // SE
    (0, -1),  // SW
    (-1, 0),  // W
    (-1, 1),  // NW
];

impl HexDirection {
    pub fn index(self) -> usize {
        self as usize
    }

    /// Direction for an index in 0..6
    pub fn from_index(index: usize) -> Option<Self> {
        DIRECTIONS.get(index).copied()
    }

    pub fn opposite(self) -> Self {
        DIRECTIONS[(self.index() + 3) % 6]
    }

    pub fn previous(self) -> Self {
        DIRECTIONS[(self.index() + 5) % 6]
    }

    pub fn next(self) -> Self {
        DIRECTIONS[(self.index() + 1) % 6]
    }

    fn delta(self) -> (i32, i32) {
        DELTAS[self.index()]
    }
}

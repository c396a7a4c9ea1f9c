//! Hex geometry constants and edge classification

use serde::{Deserialize, Serialize};

/// Distance from cell center to a corner
pub const OUTER_RADIUS: f32 = 10.0;

/// Distance from cell center to the middle of an edge
pub const INNER_RADIUS: f32 = OUTER_RADIUS * 0.866_025_4;

/// Map sizes must be positive multiples of the chunk dimensions
pub const CHUNK_SIZE_X: i32 = 5;
pub const CHUNK_SIZE_Z: i32 = 5;

/// Largest number of cells a map may hold
pub const MAX_CELL_COUNT: usize = 1 << 22;

/// Planar position on the map (y is up and ignored)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub z: f32,
}

impl Position {
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }
}

/// Elevation relationship across a cell edge
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeType {
    Flat,
    Slope,
    Cliff,
}

/// Classify the edge between two elevations
pub fn edge_type(elevation1: i32, elevation2: i32) -> EdgeType {
    match (elevation1 - elevation2).abs() {
        0 => EdgeType::Flat,
        1 => EdgeType::Slope,
        _ => EdgeType::Cliff,
    }
}

/// Center of the cell at offset (column, row)
pub fn cell_center(col: i32, row: i32) -> Position {
    Position::new(
        (col as f32 + row as f32 * 0.5 - (row / 2) as f32) * (INNER_RADIUS * 2.0),
        row as f32 * (OUTER_RADIUS * 1.5),
    )
}

/// Check a map size against the chunk grid and the cell limit
pub fn is_valid_map_size(width: i32, height: i32) -> bool {
    width > 0
        && width % CHUNK_SIZE_X == 0
        && height > 0
        && height % CHUNK_SIZE_Z == 0
        && width
            .checked_mul(height)
            .is_some_and(|count| count as usize <= MAX_CELL_COUNT)
}

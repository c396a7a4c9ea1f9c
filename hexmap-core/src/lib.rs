//! HEXMAP Core - Hex terrain grid and pathfinding
//!
//! This crate provides the map model and movement engine for HEXMAP:
//! - Cube coordinates with offset and world-space conversion
//! - Grid of cells with an explicit neighbor table
//! - Terrain editing (elevation, water, roads, rivers, visibility, units)
//! - Bucket-queue search frontier
//! - Turn-aware best-first path search with phase stamping
//! - Versioned binary map files

pub mod coordinates;
pub mod metrics;
pub mod error;
pub mod unit;
pub mod cell;
pub mod grid;
pub mod frontier;
pub mod search;
pub mod persistence;
pub mod map;
pub mod config;

// Re-exports for convenient access
pub use coordinates::{HexCoordinates, HexDirection, DIRECTIONS};
pub use metrics::{EdgeType, Position, CHUNK_SIZE_X, CHUNK_SIZE_Z};
pub use error::{HexMapError, Result};
pub use unit::{HexUnit, UnitId};
pub use cell::{CellIndex, HexCell};
pub use grid::{HexGrid, DEFAULT_CELL_COUNT_X, DEFAULT_CELL_COUNT_Z};
pub use frontier::{SearchFrontier, DEFAULT_FRONTIER_CAPACITY};
pub use search::{Path, PathSearch, PathStep};
pub use persistence::MAP_FORMAT_VERSION;
pub use map::HexMap;
pub use config::HexMapConfig;

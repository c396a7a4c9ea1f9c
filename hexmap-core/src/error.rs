//! Error types for map operations

use crate::coordinates::HexCoordinates;
use crate::unit::UnitId;

/// Errors produced by grid building, editing, searching and persistence
#[derive(Debug, thiserror::Error)]
pub enum HexMapError {
    #[error("Unsupported map size: {width}x{height}")]
    InvalidMapSize { width: i32, height: i32 },

    #[error("Movement speed must be positive")]
    InvalidSpeed,

    #[error("Cell index {0} is outside the grid")]
    CellOutOfBounds(usize),

    #[error("Cell {0} is already occupied by a unit")]
    CellOccupied(HexCoordinates),

    #[error("Unknown unit: {0:?}")]
    UnknownUnit(UnitId),

    #[error("Unsupported map version: {0}")]
    UnsupportedVersion(i32),

    #[error("Value out of range for {field}: {value}")]
    ValueOutOfRange { field: &'static str, value: i32 },

    #[error("Invalid river data: {0}")]
    InvalidRiverData(u8),

    #[error("Unit at {0} lies outside the map")]
    UnitOutOfBounds(HexCoordinates),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HexMapError>;

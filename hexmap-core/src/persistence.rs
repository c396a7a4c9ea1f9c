//! Binary map format
//!
//! Little-endian, fixed field order, versioned by a leading `i32` header:
//!
//! - version 1 adds the map dimensions (version 0 maps are 20x15)
//! - version 2 adds the unit list
//! - version 3 adds the per-cell explored flag
//! - version 4 stores elevation biased by +127 (older maps store it raw)
//!
//! Loading builds a fresh grid and only hands it back once the whole stream
//! has been read, so a failed load never leaves a half-written map behind.

use std::io::{Read, Write};

use crate::cell::HexCell;
use crate::coordinates::{HexCoordinates, HexDirection};
use crate::error::{HexMapError, Result};
use crate::grid::{HexGrid, DEFAULT_CELL_COUNT_X, DEFAULT_CELL_COUNT_Z};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Version written by `save`; the highest version `load` accepts
pub const MAP_FORMAT_VERSION: i32 = 4;

/// Added to elevation so it fits an unsigned byte
const ELEVATION_BIAS: i32 = 127;

/// Marks a present river direction in its byte
const RIVER_FLAG: u8 = 128;

// ============================================================================
// SAVE
// ============================================================================

/// Write a grid and its units at the current format version
pub fn save<W: Write>(grid: &HexGrid, writer: &mut W) -> Result<()> {
    write_i32(writer, MAP_FORMAT_VERSION)?;
    write_i32(writer, grid.cell_count_x())?;
    write_i32(writer, grid.cell_count_z())?;

    for (_, cell) in grid.cells() {
        save_cell(cell, writer)?;
    }

    let units = grid.units();
    write_i32(writer, units.len() as i32)?;
    for unit in units {
        let coordinates = grid.cell(unit.location()).coordinates();
        write_i32(writer, coordinates.x())?;
        write_i32(writer, coordinates.z())?;
        writer.write_all(&unit.orientation.to_le_bytes())?;
    }

    writer.flush()?;
    Ok(())
}

fn save_cell<W: Write>(cell: &HexCell, writer: &mut W) -> Result<()> {
    let elevation = to_byte("elevation", cell.elevation + ELEVATION_BIAS)?;
    let water_level = to_byte("water level", cell.water_level)?;

    writer.write_all(&[
        cell.terrain_type_index,
        elevation,
        water_level,
        cell.urban_level,
        cell.farm_level,
        cell.plant_level,
        cell.special_index,
        cell.walled as u8,
        river_byte(cell.incoming_river),
        river_byte(cell.outgoing_river),
        cell.road_flags(),
        cell.explored as u8,
    ])?;
    Ok(())
}

fn river_byte(river: Option<HexDirection>) -> u8 {
    river.map_or(0, |d| d.index() as u8 + RIVER_FLAG)
}

fn to_byte(field: &'static str, value: i32) -> Result<u8> {
    u8::try_from(value).map_err(|_| HexMapError::ValueOutOfRange { field, value })
}

// ============================================================================
// LOAD
// ============================================================================

/// Read a grid and its units written by any known format version
pub fn load<R: Read>(reader: &mut R) -> Result<HexGrid> {
    let version = read_i32(reader)?;
    if !(0..=MAP_FORMAT_VERSION).contains(&version) {
        return Err(HexMapError::UnsupportedVersion(version));
    }

    let (width, height) = if version >= 1 {
        (read_i32(reader)?, read_i32(reader)?)
    } else {
        (DEFAULT_CELL_COUNT_X, DEFAULT_CELL_COUNT_Z)
    };
    let mut grid = HexGrid::new(width, height)?;

    for cell in grid.cells.iter_mut() {
        load_cell(cell, reader, version)?;
    }

    if version >= 2 {
        let unit_count = read_i32(reader)?;
        if unit_count < 0 {
            return Err(HexMapError::ValueOutOfRange {
                field: "unit count",
                value: unit_count,
            });
        }
        for _ in 0..unit_count {
            let coordinates = HexCoordinates::new(read_i32(reader)?, read_i32(reader)?);
            let orientation = read_f32(reader)?;
            let location = grid
                .cell_index(coordinates)
                .ok_or(HexMapError::UnitOutOfBounds(coordinates))?;
            grid.add_unit(location, orientation)?;
        }
    }

    tracing::debug!(
        "Loaded version {} map: {}x{}, {} units",
        version,
        width,
        height,
        grid.unit_count()
    );
    Ok(grid)
}

fn load_cell<R: Read>(cell: &mut HexCell, reader: &mut R, version: i32) -> Result<()> {
    let mut bytes = [0u8; 11];
    reader.read_exact(&mut bytes)?;

    cell.terrain_type_index = bytes[0];
    cell.elevation = bytes[1] as i32;
    if version >= 4 {
        cell.elevation -= ELEVATION_BIAS;
    }
    cell.water_level = bytes[2] as i32;
    cell.urban_level = bytes[3];
    cell.farm_level = bytes[4];
    cell.plant_level = bytes[5];
    cell.special_index = bytes[6];
    cell.walled = bytes[7] != 0;
    cell.incoming_river = read_river(bytes[8])?;
    cell.outgoing_river = read_river(bytes[9])?;
    for (i, road) in cell.roads.iter_mut().enumerate() {
        *road = bytes[10] & (1 << i) != 0;
    }
    cell.explored = version >= 3 && read_u8(reader)? != 0;
    Ok(())
}

fn read_river(byte: u8) -> Result<Option<HexDirection>> {
    if byte < RIVER_FLAG {
        return Ok(None);
    }
    HexDirection::from_index((byte - RIVER_FLAG) as usize)
        .map(Some)
        .ok_or(HexMapError::InvalidRiverData(byte))
}

// ============================================================================
// PRIMITIVES
// ============================================================================

fn write_i32<W: Write>(writer: &mut W, value: i32) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_f32<R: Read>(reader: &mut R) -> Result<f32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

// ============================================================================
// TESTS
// ============================================================================

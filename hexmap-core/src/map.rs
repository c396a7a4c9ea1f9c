//! Map facade: one grid, one search engine, and the path they share
//!
//! Every mutable route into the grid goes through here and drops the
//! retained path, so `path()` never walks predecessors left over from a grid
//! that has since changed.

use std::io::{Read, Write};

use crate::cell::{CellIndex, HexCell};
use crate::config::HexMapConfig;
use crate::coordinates::HexCoordinates;
use crate::error::Result;
use crate::grid::HexGrid;
use crate::metrics::Position;
use crate::persistence;
use crate::search::{Path, PathSearch};
use crate::unit::{HexUnit, UnitId};

#[derive(Clone, Debug)]
pub struct HexMap {
    grid: HexGrid,
    search: PathSearch,
    default_speed: u32,
}

impl HexMap {
    /// Build a flat map using the configured size and search settings
    pub fn new(config: &HexMapConfig) -> Result<Self> {
        let grid = HexGrid::new(config.map_width, config.map_height)?;
        tracing::info!("Created {}x{} map", config.map_width, config.map_height);
        Ok(Self {
            grid,
            search: PathSearch::with_frontier_capacity(config.frontier_capacity),
            default_speed: config.default_speed,
        })
    }

    /// Wrap an existing grid, e.g. one just loaded from disk
    pub fn from_grid(grid: HexGrid, config: &HexMapConfig) -> Self {
        Self {
            grid,
            search: PathSearch::with_frontier_capacity(config.frontier_capacity),
            default_speed: config.default_speed,
        }
    }

    /// Replace the map with a flat one. On error the current map is kept.
    pub fn build(&mut self, width: i32, height: i32) -> Result<()> {
        self.grid.rebuild(width, height)?;
        self.search.clear_path();
        tracing::info!("Rebuilt map as {}x{}", width, height);
        Ok(())
    }

    // ========================================================================
    // LOOKUP
    // ========================================================================

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    /// Mutable grid access for terrain editing; drops the current path
    pub fn grid_mut(&mut self) -> &mut HexGrid {
        self.search.clear_path();
        &mut self.grid
    }

    pub fn cell(&self, index: CellIndex) -> &HexCell {
        self.grid.cell(index)
    }

    pub fn cell_at(&self, coordinates: HexCoordinates) -> Option<CellIndex> {
        self.grid.cell_index(coordinates)
    }

    pub fn cell_at_position(&self, position: Position) -> Option<CellIndex> {
        self.grid.cell_at_position(position)
    }

    pub fn cell_at_offset(&self, col: i32, row: i32) -> Option<CellIndex> {
        self.grid.cell_at_offset(col, row)
    }

    pub fn default_speed(&self) -> u32 {
        self.default_speed
    }

    // ========================================================================
    // PATHS
    // ========================================================================

    /// Search from `source` to `target`, keeping the result for `path`
    pub fn find_path(&mut self, source: CellIndex, target: CellIndex, speed: u32) -> Result<bool> {
        self.search.find_path(&mut self.grid, source, target, speed)
    }

    /// Cells from source to target inclusive, if the last search succeeded
    pub fn path(&self) -> Option<Path> {
        self.search.path(&self.grid)
    }

    pub fn has_path(&self) -> bool {
        self.search.has_path()
    }

    pub fn clear_path(&mut self) {
        self.search.clear_path();
    }

    // ========================================================================
    // UNITS
    // ========================================================================

    pub fn place_unit(&mut self, cell: CellIndex, orientation: f32) -> Result<UnitId> {
        let id = self.grid.add_unit(cell, orientation)?;
        self.search.clear_path();
        Ok(id)
    }

    pub fn remove_unit(&mut self, id: UnitId) -> Result<HexUnit> {
        let unit = self.grid.remove_unit(id)?;
        self.search.clear_path();
        Ok(unit)
    }

    pub fn move_unit(&mut self, id: UnitId, cell: CellIndex) -> Result<()> {
        self.grid.move_unit(id, cell)?;
        self.search.clear_path();
        Ok(())
    }

    pub fn unit(&self, id: UnitId) -> Option<&HexUnit> {
        self.grid.unit(id)
    }

    /// Move a unit to the end of the current path, then clear the path.
    /// Returns false when there is no path to follow.
    pub fn travel(&mut self, id: UnitId) -> Result<bool> {
        let Some(target) = self.path().and_then(|path| path.target()) else {
            return Ok(false);
        };
        self.grid.move_unit(id, target)?;
        self.search.clear_path();
        tracing::debug!("Unit {:?} travelled to {}", id, self.grid.cell(target).coordinates());
        Ok(true)
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    pub fn save<W: Write>(&self, writer: &mut W) -> Result<()> {
        persistence::save(&self.grid, writer)?;
        tracing::info!(
            "Saved {}x{} map with {} units",
            self.grid.cell_count_x(),
            self.grid.cell_count_z(),
            self.grid.unit_count()
        );
        Ok(())
    }

    /// Replace the map with one read from `reader`. On error the current map
    /// is kept.
    pub fn load<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        match persistence::load(reader) {
            Ok(grid) => {
                self.grid = grid;
                self.search.clear_path();
                tracing::info!(
                    "Loaded {}x{} map with {} units",
                    self.grid.cell_count_x(),
                    self.grid.cell_count_z(),
                    self.grid.unit_count()
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Map load failed, keeping current map: {}", e);
                Err(e)
            }
        }
    }
}

impl Default for HexMap {
    fn default() -> Self {
        let config = HexMapConfig::default();
        Self::from_grid(HexGrid::default(), &config)
    }
}

// ============================================================================
// TESTS
// ============================================================================

//! Hex grid: cell storage, adjacency, terrain editing and unit placement

use rustc_hash::FxHashMap;

use crate::cell::{CellIndex, HexCell};
use crate::coordinates::{HexCoordinates, HexDirection, DIRECTIONS};
use crate::error::{HexMapError, Result};
use crate::metrics::{self, EdgeType, Position};
use crate::unit::{HexUnit, UnitId};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Map width used when nothing else is specified (and by version 0 saves)
pub const DEFAULT_CELL_COUNT_X: i32 = 20;

/// Map height used when nothing else is specified (and by version 0 saves)
pub const DEFAULT_CELL_COUNT_Z: i32 = 15;

/// Largest elevation difference a road may span
const MAX_ROAD_ELEVATION_DIFFERENCE: i32 = 1;

// ============================================================================
// GRID
// ============================================================================

/// Rectangular hex grid stored row-major, x fastest
#[derive(Clone, Debug)]
pub struct HexGrid {
    cell_count_x: i32,
    cell_count_z: i32,

    /// Cells indexed by `x + z * cell_count_x` (offset column x)
    pub(crate) cells: Vec<HexCell>,

    /// Adjacency table, one slot per direction; always symmetric
    neighbors: Vec<[Option<CellIndex>; 6]>,

    units: FxHashMap<UnitId, HexUnit>,
    next_unit_id: u32,

    /// Highest phase stamped on any cell, shared by every search engine
    pub(crate) search_phase: u32,
}

impl HexGrid {
    // ========================================================================
    // CONSTRUCTION
    // ========================================================================

    /// Build a flat, empty grid of `width` x `height` cells
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if !metrics::is_valid_map_size(width, height) {
            return Err(HexMapError::InvalidMapSize { width, height });
        }

        let count = width as usize * height as usize;
        let mut grid = Self {
            cell_count_x: width,
            cell_count_z: height,
            cells: Vec::with_capacity(count),
            neighbors: vec![[None; 6]; count],
            units: FxHashMap::default(),
            next_unit_id: 0,
            search_phase: 0,
        };

        for z in 0..height {
            for x in 0..width {
                grid.create_cell(x, z);
            }
        }

        tracing::debug!("Built {}x{} grid ({} cells)", width, height, count);
        Ok(grid)
    }

    /// Replace this grid with a fresh one. On error the grid is left unchanged.
    pub fn rebuild(&mut self, width: i32, height: i32) -> Result<()> {
        *self = Self::new(width, height)?;
        Ok(())
    }

    /// Zero every cell's search stamp so phases can start over
    pub(crate) fn reset_search_phases(&mut self) {
        for cell in &mut self.cells {
            cell.search.phase = 0;
        }
        self.search_phase = 0;
    }

    fn create_cell(&mut self, x: i32, z: i32) {
        let i = self.cells.len();
        self.cells
            .push(HexCell::new(HexCoordinates::from_offset(x, z)));

        let width = self.cell_count_x as usize;
        if x > 0 {
            self.set_neighbor(i, HexDirection::W, i - 1);
        }
        if z > 0 {
            if z & 1 == 0 {
                self.set_neighbor(i, HexDirection::SE, i - width);
                if x > 0 {
                    self.set_neighbor(i, HexDirection::SW, i - width - 1);
                }
            } else {
                self.set_neighbor(i, HexDirection::SW, i - width);
                if x < self.cell_count_x - 1 {
                    self.set_neighbor(i, HexDirection::SE, i - width + 1);
                }
            }
        }
    }

    fn set_neighbor(&mut self, cell: usize, direction: HexDirection, other: usize) {
        self.neighbors[cell][direction.index()] = Some(CellIndex(other));
        self.neighbors[other][direction.opposite().index()] = Some(CellIndex(cell));
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn cell_count_x(&self) -> i32 {
        self.cell_count_x
    }

    pub fn cell_count_z(&self) -> i32 {
        self.cell_count_z
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether an index belongs to this grid
    pub fn contains(&self, index: CellIndex) -> bool {
        index.0 < self.cells.len()
    }

    /// Cell at an index obtained from this grid.
    ///
    /// Panics if the index is out of range.
    pub fn cell(&self, index: CellIndex) -> &HexCell {
        &self.cells[index.0]
    }

    /// Cell at an index, or `None` if it belongs to no cell of this grid
    pub fn get(&self, index: CellIndex) -> Option<&HexCell> {
        self.cells.get(index.0)
    }

    /// Iterate cells in storage order
    pub fn cells(&self) -> impl Iterator<Item = (CellIndex, &HexCell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, cell)| (CellIndex(i), cell))
    }

    pub(crate) fn check_index(&self, index: CellIndex) -> Result<()> {
        if self.contains(index) {
            Ok(())
        } else {
            Err(HexMapError::CellOutOfBounds(index.0))
        }
    }

    // ========================================================================
    // LOOKUP
    // ========================================================================

    /// Cell with the given coordinates, if it lies inside the grid
    pub fn cell_index(&self, coordinates: HexCoordinates) -> Option<CellIndex> {
        let z = coordinates.z();
        if z < 0 || z >= self.cell_count_z {
            return None;
        }
        let x = coordinates.x() + z / 2;
        if x < 0 || x >= self.cell_count_x {
            return None;
        }
        Some(CellIndex((x + z * self.cell_count_x) as usize))
    }

    /// Cell at offset (column, row)
    pub fn cell_at_offset(&self, col: i32, row: i32) -> Option<CellIndex> {
        self.cell_index(HexCoordinates::from_offset(col, row))
    }

    /// Cell containing a planar position
    pub fn cell_at_position(&self, position: Position) -> Option<CellIndex> {
        self.cell_index(HexCoordinates::from_position(position))
    }

    // ========================================================================
    // ADJACENCY
    // ========================================================================

    /// Neighbor through an edge; `None` at the border or for a foreign index
    pub fn neighbor(&self, cell: CellIndex, direction: HexDirection) -> Option<CellIndex> {
        self.neighbors.get(cell.0)?[direction.index()]
    }

    /// Existing neighbors with their directions
    pub fn neighbors(&self, cell: CellIndex) -> impl Iterator<Item = (HexDirection, CellIndex)> + '_ {
        DIRECTIONS
            .into_iter()
            .filter_map(move |d| self.neighbor(cell, d).map(|n| (d, n)))
    }

    /// Edge type between two cells of this grid
    pub fn edge_type(&self, a: CellIndex, b: CellIndex) -> Option<EdgeType> {
        let a = self.get(a)?;
        let b = self.get(b)?;
        Some(metrics::edge_type(a.elevation, b.elevation))
    }

    /// Edge type towards a neighbor; `None` at the grid border
    pub fn edge_type_in(&self, cell: CellIndex, direction: HexDirection) -> Option<EdgeType> {
        self.neighbor(cell, direction)
            .and_then(|n| self.edge_type(cell, n))
    }

    /// Absolute elevation difference towards a neighbor
    pub fn elevation_difference(&self, cell: CellIndex, direction: HexDirection) -> Option<i32> {
        self.neighbor(cell, direction)
            .map(|n| (self.cells[cell.0].elevation - self.cells[n.0].elevation).abs())
    }

    // ========================================================================
    // TERRAIN EDITING
    // ========================================================================

    /// Change elevation, dropping rivers and roads the new height invalidates
    pub fn set_elevation(&mut self, cell: CellIndex, elevation: i32) -> Result<()> {
        self.check_index(cell)?;
        if self.cells[cell.0].elevation == elevation {
            return Ok(());
        }
        self.cells[cell.0].elevation = elevation;
        self.validate_rivers(cell);

        for d in DIRECTIONS {
            if self.cells[cell.0].roads[d.index()]
                && self
                    .elevation_difference(cell, d)
                    .is_some_and(|diff| diff > MAX_ROAD_ELEVATION_DIFFERENCE)
            {
                self.set_road(cell, d, false);
            }
        }
        Ok(())
    }

    pub fn set_water_level(&mut self, cell: CellIndex, water_level: i32) -> Result<()> {
        self.check_index(cell)?;
        if self.cells[cell.0].water_level == water_level {
            return Ok(());
        }
        self.cells[cell.0].water_level = water_level;
        self.validate_rivers(cell);
        Ok(())
    }

    pub fn set_terrain_type_index(&mut self, cell: CellIndex, index: u8) -> Result<()> {
        self.cell_mut(cell)?.terrain_type_index = index;
        Ok(())
    }

    pub fn set_urban_level(&mut self, cell: CellIndex, level: u8) -> Result<()> {
        self.cell_mut(cell)?.urban_level = level;
        Ok(())
    }

    pub fn set_farm_level(&mut self, cell: CellIndex, level: u8) -> Result<()> {
        self.cell_mut(cell)?.farm_level = level;
        Ok(())
    }

    pub fn set_plant_level(&mut self, cell: CellIndex, level: u8) -> Result<()> {
        self.cell_mut(cell)?.plant_level = level;
        Ok(())
    }

    pub fn set_walled(&mut self, cell: CellIndex, walled: bool) -> Result<()> {
        self.cell_mut(cell)?.walled = walled;
        Ok(())
    }

    pub fn set_explorable(&mut self, cell: CellIndex, explorable: bool) -> Result<()> {
        self.cell_mut(cell)?.explorable = explorable;
        Ok(())
    }

    /// Place a special feature. Cells with rivers keep theirs; roads are removed.
    pub fn set_special_index(&mut self, cell: CellIndex, index: u8) -> Result<()> {
        let current = self.cell_mut(cell)?;
        if current.special_index == index || current.has_river() {
            return Ok(());
        }
        current.special_index = index;
        self.clear_roads(cell);
        Ok(())
    }

    fn cell_mut(&mut self, cell: CellIndex) -> Result<&mut HexCell> {
        self.cells
            .get_mut(cell.0)
            .ok_or(HexMapError::CellOutOfBounds(cell.0))
    }

    // ========================================================================
    // ROADS
    // ========================================================================

    /// Add a road through an edge. `Ok(false)` if the edge cannot carry one.
    pub fn add_road(&mut self, cell: CellIndex, direction: HexDirection) -> Result<bool> {
        self.check_index(cell)?;
        let Some(neighbor) = self.neighbor(cell, direction) else {
            return Ok(false);
        };
        let here = &self.cells[cell.0];
        let there = &self.cells[neighbor.0];

        let allowed = !here.roads[direction.index()]
            && !here.has_river_through_edge(direction)
            && !here.is_special()
            && !there.is_special()
            && (here.elevation - there.elevation).abs() <= MAX_ROAD_ELEVATION_DIFFERENCE;

        if allowed {
            self.set_road(cell, direction, true);
        } else {
            tracing::debug!(
                "Road rejected at {} towards {:?}",
                here.coordinates(),
                direction
            );
        }
        Ok(allowed)
    }

    pub fn remove_roads(&mut self, cell: CellIndex) -> Result<()> {
        self.check_index(cell)?;
        self.clear_roads(cell);
        Ok(())
    }

    fn clear_roads(&mut self, cell: CellIndex) {
        for d in DIRECTIONS {
            if self.cells[cell.0].roads[d.index()] {
                self.set_road(cell, d, false);
            }
        }
    }

    fn set_road(&mut self, cell: CellIndex, direction: HexDirection, state: bool) {
        self.cells[cell.0].roads[direction.index()] = state;
        if let Some(neighbor) = self.neighbor(cell, direction) {
            self.cells[neighbor.0].roads[direction.opposite().index()] = state;
        }
    }

    // ========================================================================
    // RIVERS
    // ========================================================================

    /// Start a river flowing out through an edge. `Ok(false)` if the
    /// neighbor cannot receive it.
    pub fn set_outgoing_river(&mut self, cell: CellIndex, direction: HexDirection) -> Result<bool> {
        self.check_index(cell)?;
        if self.cells[cell.0].outgoing_river == Some(direction) {
            return Ok(true);
        }
        let Some(neighbor) = self.neighbor(cell, direction) else {
            return Ok(false);
        };
        if !self.is_valid_river_destination(cell, neighbor) {
            tracing::debug!(
                "River rejected at {} towards {:?}",
                self.cells[cell.0].coordinates(),
                direction
            );
            return Ok(false);
        }

        self.clear_outgoing_river(cell);
        if self.cells[cell.0].incoming_river == Some(direction) {
            self.clear_incoming_river(cell);
        }

        let source = &mut self.cells[cell.0];
        source.outgoing_river = Some(direction);
        source.special_index = 0;

        self.clear_incoming_river(neighbor);
        let target = &mut self.cells[neighbor.0];
        target.incoming_river = Some(direction.opposite());
        target.special_index = 0;

        self.set_road(cell, direction, false);
        Ok(true)
    }

    pub fn remove_outgoing_river(&mut self, cell: CellIndex) -> Result<()> {
        self.check_index(cell)?;
        self.clear_outgoing_river(cell);
        Ok(())
    }

    pub fn remove_incoming_river(&mut self, cell: CellIndex) -> Result<()> {
        self.check_index(cell)?;
        self.clear_incoming_river(cell);
        Ok(())
    }

    pub fn remove_river(&mut self, cell: CellIndex) -> Result<()> {
        self.check_index(cell)?;
        self.clear_outgoing_river(cell);
        self.clear_incoming_river(cell);
        Ok(())
    }

    fn clear_outgoing_river(&mut self, cell: CellIndex) {
        let Some(direction) = self.cells[cell.0].outgoing_river.take() else {
            return;
        };
        if let Some(neighbor) = self.neighbor(cell, direction) {
            self.cells[neighbor.0].incoming_river = None;
        }
    }

    fn clear_incoming_river(&mut self, cell: CellIndex) {
        let Some(direction) = self.cells[cell.0].incoming_river.take() else {
            return;
        };
        if let Some(neighbor) = self.neighbor(cell, direction) {
            self.cells[neighbor.0].outgoing_river = None;
        }
    }

    /// Rivers flow downhill or into a lake at the same level, never over a cliff
    fn is_valid_river_destination(&self, from: CellIndex, to: CellIndex) -> bool {
        let source = &self.cells[from.0];
        let target = &self.cells[to.0];
        metrics::edge_type(source.elevation, target.elevation) != EdgeType::Cliff
            && (source.elevation >= target.elevation || source.water_level == target.elevation)
    }

    fn validate_rivers(&mut self, cell: CellIndex) {
        if let Some(d) = self.cells[cell.0].outgoing_river {
            let valid = self
                .neighbor(cell, d)
                .is_some_and(|n| self.is_valid_river_destination(cell, n));
            if !valid {
                self.clear_outgoing_river(cell);
            }
        }
        if let Some(d) = self.cells[cell.0].incoming_river {
            let valid = self
                .neighbor(cell, d)
                .is_some_and(|n| self.is_valid_river_destination(n, cell));
            if !valid {
                self.clear_incoming_river(cell);
            }
        }
    }

    // ========================================================================
    // VISIBILITY
    // ========================================================================

    /// Add one viewer; the first viewer marks the cell explored
    pub fn increase_visibility(&mut self, cell: CellIndex) -> Result<()> {
        let cell = self.cell_mut(cell)?;
        cell.visibility += 1;
        if cell.visibility == 1 {
            cell.explored = true;
        }
        Ok(())
    }

    pub fn decrease_visibility(&mut self, cell: CellIndex) -> Result<()> {
        let cell = self.cell_mut(cell)?;
        cell.visibility = cell.visibility.saturating_sub(1);
        Ok(())
    }

    pub fn reset_visibility(&mut self) {
        for cell in &mut self.cells {
            cell.visibility = 0;
        }
    }

    pub fn set_explored(&mut self, cell: CellIndex, explored: bool) -> Result<()> {
        self.cell_mut(cell)?.explored = explored;
        Ok(())
    }

    // ========================================================================
    // UNITS
    // ========================================================================

    /// Place a new unit on an empty cell
    pub fn add_unit(&mut self, location: CellIndex, orientation: f32) -> Result<UnitId> {
        self.check_index(location)?;
        let cell = &mut self.cells[location.0];
        if cell.unit.is_some() {
            return Err(HexMapError::CellOccupied(cell.coordinates()));
        }

        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        cell.unit = Some(id);
        self.units.insert(id, HexUnit::new(id, location, orientation));
        Ok(id)
    }

    /// Remove a unit, freeing its cell
    pub fn remove_unit(&mut self, id: UnitId) -> Result<HexUnit> {
        let unit = self.units.remove(&id).ok_or(HexMapError::UnknownUnit(id))?;
        self.cells[unit.location().0].unit = None;
        Ok(unit)
    }

    /// Relocate a unit to another cell
    pub fn move_unit(&mut self, id: UnitId, location: CellIndex) -> Result<()> {
        self.check_index(location)?;
        let target = &self.cells[location.0];
        if target.unit.is_some_and(|other| other != id) {
            return Err(HexMapError::CellOccupied(target.coordinates()));
        }

        let unit = self.units.get_mut(&id).ok_or(HexMapError::UnknownUnit(id))?;
        self.cells[unit.location().0].unit = None;
        unit.set_location(location);
        self.cells[location.0].unit = Some(id);
        Ok(())
    }

    pub fn set_unit_orientation(&mut self, id: UnitId, orientation: f32) -> Result<()> {
        let unit = self.units.get_mut(&id).ok_or(HexMapError::UnknownUnit(id))?;
        unit.orientation = orientation;
        Ok(())
    }

    pub fn clear_units(&mut self) {
        for unit in self.units.values() {
            self.cells[unit.location().0].unit = None;
        }
        self.units.clear();
    }

    pub fn unit(&self, id: UnitId) -> Option<&HexUnit> {
        self.units.get(&id)
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Units in placement order
    pub fn units(&self) -> Vec<&HexUnit> {
        let mut units: Vec<&HexUnit> = self.units.values().collect();
        units.sort_by_key(|unit| unit.id());
        units
    }

    /// Whether a unit could end its move on this cell
    pub fn is_valid_destination(&self, cell: CellIndex) -> bool {
        self.get(cell)
            .is_some_and(|cell| !cell.is_underwater() && cell.unit.is_none())
    }
}

impl Default for HexGrid {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_COUNT_X, DEFAULT_CELL_COUNT_Z)
            .expect("default map size is chunk aligned")
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> HexGrid {
        HexGrid::new(10, 10).unwrap()
    }

    fn at(grid: &HexGrid, col: i32, row: i32) -> CellIndex {
        grid.cell_at_offset(col, row).unwrap()
    }

    #[test]
    fn test_grid_creation() {
        let grid = grid();
        assert_eq!(grid.len(), 100);
        assert_eq!(grid.cell_count_x(), 10);
        assert_eq!(grid.cell_count_z(), 10);
        for (index, cell) in grid.cells() {
            assert_eq!(grid.cell_index(cell.coordinates()), Some(index));
        }
    }

    #[test]
    fn test_invalid_sizes() {
        assert!(matches!(
            HexGrid::new(12, 10),
            Err(HexMapError::InvalidMapSize { width: 12, height: 10 })
        ));
        assert!(HexGrid::new(0, 5).is_err());
        assert!(HexGrid::new(5, -5).is_err());
    }

    #[test]
    fn test_failed_rebuild_keeps_grid() {
        let mut grid = grid();
        let cell = at(&grid, 3, 3);
        grid.set_elevation(cell, 2).unwrap();
        assert!(grid.rebuild(7, 10).is_err());
        assert_eq!(grid.len(), 100);
        assert_eq!(grid.cell(cell).elevation(), 2);

        grid.rebuild(5, 5).unwrap();
        assert_eq!(grid.len(), 25);
    }

    #[test]
    fn test_stale_index_after_rebuild() {
        let mut grid = HexGrid::new(20, 15).unwrap();
        let stale = grid.cell_at_offset(19, 14).unwrap();
        grid.rebuild(5, 5).unwrap();

        assert!(grid.get(stale).is_none());
        assert_eq!(grid.neighbor(stale, HexDirection::E), None);
        assert_eq!(grid.neighbors(stale).count(), 0);
        assert_eq!(grid.edge_type(stale, CellIndex(0)), None);
        assert!(!grid.is_valid_destination(stale));

        let out_of_bounds =
            |result: Result<()>| matches!(result, Err(HexMapError::CellOutOfBounds(i)) if i == stale.0);
        assert!(out_of_bounds(grid.set_elevation(stale, 1)));
        assert!(out_of_bounds(grid.set_water_level(stale, 1)));
        assert!(out_of_bounds(grid.set_urban_level(stale, 1)));
        assert!(out_of_bounds(grid.set_walled(stale, true)));
        assert!(out_of_bounds(grid.set_special_index(stale, 1)));
        assert!(out_of_bounds(grid.increase_visibility(stale)));
        assert!(out_of_bounds(grid.remove_roads(stale)));
        assert!(out_of_bounds(grid.remove_river(stale)));
        assert!(matches!(
            grid.add_road(stale, HexDirection::E),
            Err(HexMapError::CellOutOfBounds(_))
        ));
        assert!(matches!(
            grid.set_outgoing_river(stale, HexDirection::E),
            Err(HexMapError::CellOutOfBounds(_))
        ));
    }

    #[test]
    fn test_neighbor_symmetry() {
        let grid = HexGrid::new(20, 15).unwrap();
        for (index, _) in grid.cells() {
            for (d, neighbor) in grid.neighbors(index) {
                assert_eq!(grid.neighbor(neighbor, d.opposite()), Some(index));
            }
        }
    }

    #[test]
    fn test_neighbors_match_coordinates() {
        let grid = HexGrid::new(20, 15).unwrap();
        for (index, cell) in grid.cells() {
            for d in DIRECTIONS {
                let expected = grid.cell_index(cell.coordinates().step(d));
                assert_eq!(grid.neighbor(index, d), expected, "{} {:?}", cell.coordinates(), d);
            }
        }
    }

    #[test]
    fn test_interior_cell_has_six_neighbors() {
        let grid = grid();
        assert_eq!(grid.neighbors(at(&grid, 4, 4)).count(), 6);
        assert_eq!(grid.neighbors(at(&grid, 0, 0)).count(), 2);
    }

    #[test]
    fn test_lookup_out_of_bounds() {
        let grid = grid();
        assert_eq!(grid.cell_at_offset(-1, 0), None);
        assert_eq!(grid.cell_at_offset(10, 0), None);
        assert_eq!(grid.cell_at_offset(0, 10), None);
        assert_eq!(grid.cell_index(HexCoordinates::new(0, -1)), None);
        assert_eq!(grid.cell_at_position(Position::new(-100.0, -100.0)), None);
    }

    #[test]
    fn test_lookup_by_position() {
        let grid = grid();
        let center = metrics::cell_center(6, 7);
        assert_eq!(grid.cell_at_position(center), Some(at(&grid, 6, 7)));
    }

    #[test]
    fn test_edge_types() {
        let mut grid = grid();
        let a = at(&grid, 2, 2);
        let east = grid.neighbor(a, HexDirection::E).unwrap();
        assert_eq!(grid.edge_type(a, east), Some(EdgeType::Flat));
        grid.set_elevation(east, 1).unwrap();
        assert_eq!(grid.edge_type_in(a, HexDirection::E), Some(EdgeType::Slope));
        grid.set_elevation(east, 3).unwrap();
        assert_eq!(grid.edge_type_in(a, HexDirection::E), Some(EdgeType::Cliff));
        assert_eq!(grid.elevation_difference(a, HexDirection::E), Some(3));
        assert_eq!(grid.edge_type_in(at(&grid, 0, 0), HexDirection::W), None);
    }

    #[test]
    fn test_roads_are_mirrored() {
        let mut grid = grid();
        let a = at(&grid, 4, 4);
        let b = grid.neighbor(a, HexDirection::NE).unwrap();
        assert!(grid.add_road(a, HexDirection::NE).unwrap());
        assert!(grid.cell(a).has_road_through_edge(HexDirection::NE));
        assert!(grid.cell(b).has_road_through_edge(HexDirection::SW));

        grid.remove_roads(b).unwrap();
        assert!(!grid.cell(a).has_roads());
        assert!(!grid.cell(b).has_roads());
    }

    #[test]
    fn test_road_rejections() {
        let mut grid = grid();
        let a = at(&grid, 4, 4);
        let east = grid.neighbor(a, HexDirection::E).unwrap();
        grid.set_elevation(east, 2).unwrap();
        assert!(!grid.add_road(a, HexDirection::E).unwrap());

        let west = grid.neighbor(a, HexDirection::W).unwrap();
        grid.set_special_index(west, 1).unwrap();
        assert!(!grid.add_road(a, HexDirection::W).unwrap());

        assert!(!grid.add_road(at(&grid, 0, 0), HexDirection::W).unwrap());
    }

    #[test]
    fn test_elevation_change_removes_steep_roads() {
        let mut grid = grid();
        let a = at(&grid, 4, 4);
        assert!(grid.add_road(a, HexDirection::E).unwrap());
        grid.set_elevation(a, 1).unwrap();
        assert!(grid.cell(a).has_road_through_edge(HexDirection::E));
        grid.set_elevation(a, 2).unwrap();
        assert!(!grid.cell(a).has_roads());
    }

    #[test]
    fn test_rivers_link_both_cells() {
        let mut grid = grid();
        let a = at(&grid, 4, 4);
        let b = grid.neighbor(a, HexDirection::SE).unwrap();
        grid.add_road(a, HexDirection::SE).unwrap();
        assert!(grid.set_outgoing_river(a, HexDirection::SE).unwrap());

        assert_eq!(grid.cell(a).outgoing_river(), Some(HexDirection::SE));
        assert_eq!(grid.cell(b).incoming_river(), Some(HexDirection::NW));
        assert!(!grid.cell(a).has_road_through_edge(HexDirection::SE));
        assert!(!grid.add_road(a, HexDirection::SE).unwrap());

        grid.remove_river(b).unwrap();
        assert!(!grid.cell(a).has_river());
        assert!(!grid.cell(b).has_river());
    }

    #[test]
    fn test_river_cannot_flow_uphill_or_over_cliff() {
        let mut grid = grid();
        let a = at(&grid, 4, 4);
        let b = grid.neighbor(a, HexDirection::E).unwrap();
        grid.set_elevation(b, 1).unwrap();
        assert!(!grid.set_outgoing_river(a, HexDirection::E).unwrap());

        grid.set_elevation(a, 3).unwrap();
        assert!(!grid.set_outgoing_river(a, HexDirection::E).unwrap());

        grid.set_elevation(a, 2).unwrap();
        assert!(grid.set_outgoing_river(a, HexDirection::E).unwrap());
    }

    #[test]
    fn test_elevation_change_validates_rivers() {
        let mut grid = grid();
        let a = at(&grid, 4, 4);
        let b = grid.neighbor(a, HexDirection::E).unwrap();
        assert!(grid.set_outgoing_river(a, HexDirection::E).unwrap());
        grid.set_elevation(b, 1).unwrap();
        assert!(!grid.cell(a).has_river());
        assert!(!grid.cell(b).has_river());
    }

    #[test]
    fn test_new_river_replaces_old_one() {
        let mut grid = grid();
        let a = at(&grid, 4, 4);
        let east = grid.neighbor(a, HexDirection::E).unwrap();
        let west = grid.neighbor(a, HexDirection::W).unwrap();
        assert!(grid.set_outgoing_river(a, HexDirection::E).unwrap());
        assert!(grid.set_outgoing_river(a, HexDirection::W).unwrap());
        assert_eq!(grid.cell(east).incoming_river(), None);
        assert_eq!(grid.cell(west).incoming_river(), Some(HexDirection::E));
    }

    #[test]
    fn test_special_index_blocked_by_river() {
        let mut grid = grid();
        let a = at(&grid, 4, 4);
        assert!(grid.set_outgoing_river(a, HexDirection::E).unwrap());
        grid.set_special_index(a, 2).unwrap();
        assert_eq!(grid.cell(a).special_index(), 0);

        let b = at(&grid, 1, 1);
        grid.add_road(b, HexDirection::E).unwrap();
        grid.set_special_index(b, 2).unwrap();
        assert!(grid.cell(b).is_special());
        assert!(!grid.cell(b).has_roads());
    }

    #[test]
    fn test_visibility() {
        let mut grid = grid();
        let a = at(&grid, 2, 2);
        assert!(!grid.cell(a).is_explored());
        grid.increase_visibility(a).unwrap();
        grid.increase_visibility(a).unwrap();
        assert!(grid.cell(a).is_visible());
        assert!(grid.cell(a).is_explored());
        grid.decrease_visibility(a).unwrap();
        assert!(grid.cell(a).is_visible());
        grid.decrease_visibility(a).unwrap();
        assert!(!grid.cell(a).is_visible());
        assert!(grid.cell(a).is_explored());

        grid.increase_visibility(a).unwrap();
        grid.reset_visibility();
        assert!(!grid.cell(a).is_visible());

        grid.set_explorable(a, false).unwrap();
        assert!(!grid.cell(a).is_explored());
    }

    #[test]
    fn test_unit_placement() {
        let mut grid = grid();
        let a = at(&grid, 1, 1);
        let b = at(&grid, 2, 1);
        let unit = grid.add_unit(a, 90.0).unwrap();
        assert_eq!(grid.cell(a).unit(), Some(unit));
        assert!(!grid.is_valid_destination(a));
        assert!(matches!(grid.add_unit(a, 0.0), Err(HexMapError::CellOccupied(_))));

        grid.move_unit(unit, b).unwrap();
        assert_eq!(grid.cell(a).unit(), None);
        assert_eq!(grid.cell(b).unit(), Some(unit));
        assert_eq!(grid.unit(unit).unwrap().location(), b);

        let other = grid.add_unit(a, 0.0).unwrap();
        assert!(grid.move_unit(other, b).is_err());

        let removed = grid.remove_unit(unit).unwrap();
        assert_eq!(removed.orientation, 90.0);
        assert_eq!(grid.cell(b).unit(), None);
        assert!(matches!(grid.remove_unit(unit), Err(HexMapError::UnknownUnit(_))));
        assert_eq!(grid.unit_count(), 1);

        grid.clear_units();
        assert_eq!(grid.cell(a).unit(), None);
        assert_eq!(grid.unit_count(), 0);
    }

    #[test]
    fn test_units_in_placement_order() {
        let mut grid = grid();
        let mut ids = Vec::new();
        for i in 0..5 {
            let cell = at(&grid, i, 0);
            ids.push(grid.add_unit(cell, i as f32).unwrap());
        }
        let listed: Vec<UnitId> = grid.units().iter().map(|u| u.id()).collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn test_underwater_is_not_destination() {
        let mut grid = grid();
        let a = at(&grid, 3, 3);
        grid.set_water_level(a, 1).unwrap();
        assert!(grid.cell(a).is_underwater());
        assert!(!grid.is_valid_destination(a));
    }
}

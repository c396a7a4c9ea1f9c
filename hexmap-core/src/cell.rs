//! Map cells: terrain state plus transient search fields

use serde::{Deserialize, Serialize};

use crate::coordinates::{HexCoordinates, HexDirection};
use crate::unit::UnitId;

/// Index of a cell in the grid's flat cell array
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellIndex(pub usize);

/// Per-search bookkeeping, valid only while `phase` matches the running search
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SearchData {
    pub distance: i32,
    pub heuristic: i32,
    pub phase: u32,
    pub path_from: Option<CellIndex>,
    pub next_with_same_priority: Option<CellIndex>,
}

impl SearchData {
    pub fn priority(&self) -> i32 {
        self.distance + self.heuristic
    }
}

/// One hex tile
#[derive(Clone, Debug)]
pub struct HexCell {
    coordinates: HexCoordinates,

    // Terrain
    pub(crate) terrain_type_index: u8,
    pub(crate) elevation: i32,
    pub(crate) water_level: i32,
    pub(crate) urban_level: u8,
    pub(crate) farm_level: u8,
    pub(crate) plant_level: u8,
    pub(crate) special_index: u8,
    pub(crate) walled: bool,

    // Edge features, mirrored on the neighbor by the grid
    pub(crate) roads: [bool; 6],
    pub(crate) incoming_river: Option<HexDirection>,
    pub(crate) outgoing_river: Option<HexDirection>,

    // Visibility
    pub(crate) visibility: u32,
    pub(crate) explored: bool,
    pub(crate) explorable: bool,

    pub(crate) unit: Option<UnitId>,
    pub(crate) search: SearchData,
}

impl HexCell {
    pub(crate) fn new(coordinates: HexCoordinates) -> Self {
        Self {
            coordinates,
            terrain_type_index: 0,
            elevation: 0,
            water_level: 0,
            urban_level: 0,
            farm_level: 0,
            plant_level: 0,
            special_index: 0,
            walled: false,
            roads: [false; 6],
            incoming_river: None,
            outgoing_river: None,
            visibility: 0,
            explored: false,
            explorable: true,
            unit: None,
            search: SearchData::default(),
        }
    }

    // ========================================================================
    // TERRAIN
    // ========================================================================

    pub fn coordinates(&self) -> HexCoordinates {
        self.coordinates
    }

    pub fn terrain_type_index(&self) -> u8 {
        self.terrain_type_index
    }

    pub fn elevation(&self) -> i32 {
        self.elevation
    }

    pub fn water_level(&self) -> i32 {
        self.water_level
    }

    pub fn is_underwater(&self) -> bool {
        self.water_level > self.elevation
    }

    /// Height used for sight lines: the water surface when submerged
    pub fn view_elevation(&self) -> i32 {
        self.elevation.max(self.water_level)
    }

    pub fn urban_level(&self) -> u8 {
        self.urban_level
    }

    pub fn farm_level(&self) -> u8 {
        self.farm_level
    }

    pub fn plant_level(&self) -> u8 {
        self.plant_level
    }

    pub fn special_index(&self) -> u8 {
        self.special_index
    }

    pub fn is_special(&self) -> bool {
        self.special_index > 0
    }

    pub fn walled(&self) -> bool {
        self.walled
    }

    // ========================================================================
    // ROADS AND RIVERS
    // ========================================================================

    pub fn has_road_through_edge(&self, direction: HexDirection) -> bool {
        self.roads[direction.index()]
    }

    pub fn has_roads(&self) -> bool {
        self.roads.iter().any(|&road| road)
    }

    /// Road flags packed as bit `i` for direction `i`
    pub fn road_flags(&self) -> u8 {
        (0..6)
            .filter(|&i| self.roads[i])
            .fold(0u8, |flags, i| flags | (1 << i))
    }

    pub fn incoming_river(&self) -> Option<HexDirection> {
        self.incoming_river
    }

    pub fn outgoing_river(&self) -> Option<HexDirection> {
        self.outgoing_river
    }

    pub fn has_river(&self) -> bool {
        self.incoming_river.is_some() || self.outgoing_river.is_some()
    }

    /// True for a river source or mouth
    pub fn has_river_begin_or_end(&self) -> bool {
        self.incoming_river.is_some() != self.outgoing_river.is_some()
    }

    pub fn has_river_through_edge(&self, direction: HexDirection) -> bool {
        self.incoming_river == Some(direction) || self.outgoing_river == Some(direction)
    }

    // ========================================================================
    // VISIBILITY AND OCCUPANCY
    // ========================================================================

    pub fn is_visible(&self) -> bool {
        self.visibility > 0 && self.explorable
    }

    pub fn is_explored(&self) -> bool {
        self.explored && self.explorable
    }

    pub fn is_explorable(&self) -> bool {
        self.explorable
    }

    pub fn unit(&self) -> Option<UnitId> {
        self.unit
    }

    // ========================================================================
    // SEARCH RESULTS
    // ========================================================================

    /// Distance recorded by the last search that reached this cell. Only
    /// meaningful while that search's phase is current.
    pub(crate) fn search_distance(&self) -> i32 {
        self.search.distance
    }

    pub(crate) fn path_from(&self) -> Option<CellIndex> {
        self.search.path_from
    }

    pub(crate) fn search_priority(&self) -> i32 {
        self.search.priority()
    }
}

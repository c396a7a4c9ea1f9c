//! Integration tests for HEXMAP
//!
//! Tests the full stack: grid editing, path search, units, config and map files

use hexmap_core::{
    persistence, CellIndex, HexCoordinates, HexDirection, HexGrid, HexMap, HexMapConfig,
    HexMapError, Position, DIRECTIONS,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::io::Cursor;
use std::time::Instant;

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn flat_map() -> HexMap {
    HexMap::new(&HexMapConfig::default()).unwrap()
}

fn offset(map: &HexMap, col: i32, row: i32) -> CellIndex {
    map.cell_at_offset(col, row).unwrap()
}

/// Rolling hills with some lakes, roads and rivers
fn rough_map(seed: u64, width: i32, height: i32) -> HexMap {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut map = HexMap::new(&HexMapConfig::default().with_map_size(width, height)).unwrap();
    let grid = map.grid_mut();
    let cells: Vec<CellIndex> = grid.cells().map(|(index, _)| index).collect();

    for &cell in &cells {
        grid.set_elevation(cell, rng.gen_range(0..4)).unwrap();
        if rng.gen_bool(0.1) {
            grid.set_water_level(cell, 3).unwrap();
        }
        grid.set_walled(cell, rng.gen_bool(0.05)).unwrap();
    }
    for &cell in &cells {
        let direction = DIRECTIONS[rng.gen_range(0..6)];
        if rng.gen_bool(0.3) {
            grid.add_road(cell, direction).unwrap();
        } else if rng.gen_bool(0.1) {
            grid.set_outgoing_river(cell, direction).unwrap();
        }
    }
    map
}

// ============================================================================
// SEARCH SCENARIOS
// ============================================================================

#[test]
fn test_flat_map_scenario() {
    let mut map = flat_map();
    let from = offset(&map, 0, 0);
    let to = offset(&map, 3, 0);

    assert!(map.find_path(from, to, 2).unwrap());
    let path = map.path().unwrap();

    assert_eq!(path.len(), 4);
    assert_eq!(path.source(), Some(from));
    assert_eq!(path.target(), Some(to));
    // Every flat move overflows the 2-point turn budget
    let distances: Vec<i32> = path.steps().iter().map(|step| step.distance).collect();
    assert_eq!(distances, vec![0, 9, 19, 29]);
    assert_eq!(path.turns(), 14);

    for pair in path.cells().windows(2) {
        let a = map.cell(pair[0]).coordinates();
        let b = map.cell(pair[1]).coordinates();
        assert_eq!(a.distance_to(b), 1);
    }
}

#[test]
fn test_underwater_target_has_no_path() {
    let mut map = flat_map();
    let from = offset(&map, 0, 0);
    let to = offset(&map, 6, 4);
    map.grid_mut().set_water_level(to, 1).unwrap();

    assert!(!map.find_path(from, to, 24).unwrap());
    assert!(map.path().is_none());
}

#[test]
fn test_plateau_behind_cliffs_has_no_path() {
    let mut map = flat_map();
    let from = offset(&map, 0, 0);
    let to = offset(&map, 8, 7);
    map.grid_mut().set_elevation(to, 3).unwrap();

    assert!(!map.find_path(from, to, 24).unwrap());

    // One ramp cell makes it reachable
    let ramp = map.grid().neighbor(to, HexDirection::W).unwrap();
    map.grid_mut().set_elevation(ramp, 2).unwrap();
    let step = map.grid().neighbor(ramp, HexDirection::W).unwrap();
    map.grid_mut().set_elevation(step, 1).unwrap();
    assert!(map.find_path(from, to, 24).unwrap());
    assert!(map.path().unwrap().cells().contains(&ramp));
}

#[test]
fn test_roads_shorten_travel() {
    let mut map = flat_map();
    let from = offset(&map, 2, 5);
    let to = offset(&map, 12, 5);

    map.find_path(from, to, 24).unwrap();
    let off_road = map.path().unwrap().cost();

    let mut cell = from;
    while cell != to {
        assert!(map.grid_mut().add_road(cell, HexDirection::E).unwrap());
        cell = map.grid().neighbor(cell, HexDirection::E).unwrap();
    }
    map.find_path(from, to, 24).unwrap();
    let on_road = map.path().unwrap().cost();

    // Ten flat moves at 5 with two turn overflows at speed 24
    assert_eq!(off_road, 58);
    assert_eq!(on_road, 10);
}

#[test]
fn test_repeated_searches_need_no_reset() {
    let mut map = rough_map(3, 20, 15);
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let queries: Vec<(CellIndex, CellIndex)> = (0..20)
        .map(|_| {
            (
                CellIndex(rng.gen_range(0..map.grid().len())),
                CellIndex(rng.gen_range(0..map.grid().len())),
            )
        })
        .collect();

    let first: Vec<Option<i32>> = queries
        .iter()
        .map(|&(from, to)| {
            map.find_path(from, to, 12).unwrap();
            map.path().map(|path| path.cost())
        })
        .collect();
    for _ in 0..5 {
        let again: Vec<Option<i32>> = queries
            .iter()
            .map(|&(from, to)| {
                map.find_path(from, to, 12).unwrap();
                map.path().map(|path| path.cost())
            })
            .collect();
        assert_eq!(again, first);
    }
}

#[test]
fn test_invalid_requests() {
    let mut map = flat_map();
    let cell = offset(&map, 1, 1);
    assert!(matches!(map.find_path(cell, cell, 0), Err(HexMapError::InvalidSpeed)));
    assert!(matches!(
        map.find_path(cell, CellIndex(10_000), 5),
        Err(HexMapError::CellOutOfBounds(10_000))
    ));
    assert_eq!(map.cell_at(HexCoordinates::new(-5, -5)), None);
    assert_eq!(map.cell_at_position(Position::new(-100.0, -100.0)), None);
}

// ============================================================================
// UNITS
// ============================================================================

#[test]
fn test_unit_travel_and_blocking() {
    let mut map = flat_map();
    let start = offset(&map, 0, 0);
    let goal = offset(&map, 5, 5);
    let scout = map.place_unit(start, 0.0).unwrap();

    assert!(map.find_path(start, goal, 24).unwrap());
    assert!(map.travel(scout).unwrap());
    assert_eq!(map.unit(scout).unwrap().location(), goal);

    // The occupied goal is no longer a valid destination
    let other = offset(&map, 9, 9);
    assert!(!map.find_path(other, goal, 24).unwrap());

    map.remove_unit(scout).unwrap();
    assert!(map.find_path(other, goal, 24).unwrap());
}

// ============================================================================
// CONFIG AND MAP FILES
// ============================================================================

#[test]
fn test_config_drives_map() {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("hexmap_it_config_{}.json", std::process::id()));
    HexMapConfig::default()
        .with_map_size(30, 10)
        .with_speed(7)
        .with_frontier_capacity(8)
        .save(&path)
        .unwrap();

    let config = HexMapConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let mut map = HexMap::new(&config).unwrap();
    assert_eq!(map.grid().len(), 300);
    assert_eq!(map.default_speed(), 7);

    // A small frontier still finds the long way round
    let from = offset(&map, 0, 0);
    let to = offset(&map, 29, 9);
    assert!(map.find_path(from, to, map.default_speed()).unwrap());
}

#[test]
fn test_map_file_round_trip_preserves_search() {
    let mut map = rough_map(11, 20, 15);
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    for _ in 0..4 {
        let cell = CellIndex(rng.gen_range(0..map.grid().len()));
        let _ = map.place_unit(cell, rng.gen_range(0.0..360.0));
    }

    let path = std::env::temp_dir().join(format!("hexmap_it_{}.map", std::process::id()));
    {
        let mut file = std::io::BufWriter::new(std::fs::File::create(&path).unwrap());
        map.save(&mut file).unwrap();
    }
    let mut loaded = HexMap::default();
    {
        let mut file = std::io::BufReader::new(std::fs::File::open(&path).unwrap());
        loaded.load(&mut file).unwrap();
    }
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.grid().unit_count(), map.grid().unit_count());
    for _ in 0..50 {
        let from = CellIndex(rng.gen_range(0..map.grid().len()));
        let to = CellIndex(rng.gen_range(0..map.grid().len()));
        let a = map.find_path(from, to, 10).unwrap();
        let b = loaded.find_path(from, to, 10).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            map.path().map(|p| p.cost()),
            loaded.path().map(|p| p.cost())
        );
    }
}

#[test]
fn test_corrupt_file_keeps_loaded_map() {
    let map = rough_map(21, 10, 10);
    let mut bytes = Vec::new();
    map.save(&mut bytes).unwrap();

    let mut target = rough_map(22, 15, 5);
    let before = persistence_bytes(target.grid());

    let mut future = bytes.clone();
    future[0..4].copy_from_slice(&9i32.to_le_bytes());
    assert!(matches!(
        target.load(&mut Cursor::new(&future)),
        Err(HexMapError::UnsupportedVersion(9))
    ));
    assert!(target.load(&mut Cursor::new(&bytes[..bytes.len() - 3])).is_err());
    assert_eq!(persistence_bytes(target.grid()), before);

    target.load(&mut Cursor::new(&bytes)).unwrap();
    assert_eq!(persistence_bytes(target.grid()), bytes);
}

fn persistence_bytes(grid: &HexGrid) -> Vec<u8> {
    let mut bytes = Vec::new();
    persistence::save(grid, &mut bytes).unwrap();
    bytes
}

// ============================================================================
// PERFORMANCE
// ============================================================================

#[test]
fn test_search_performance() {
    let mut map = rough_map(1, 80, 60);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let start = Instant::now();
    let mut found = 0;
    for _ in 0..200 {
        let from = CellIndex(rng.gen_range(0..map.grid().len()));
        let to = CellIndex(rng.gen_range(0..map.grid().len()));
        if map.find_path(from, to, 24).unwrap() {
            found += 1;
        }
    }
    let elapsed = start.elapsed();

    println!("Search Performance:");
    println!("  200 searches on 80x60: {:?} ({} found)", elapsed, found);
    assert!(elapsed.as_secs() < 30, "Searches took too long");
}

//! Info command - summarize a map file

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use hexmap_core::{HexGrid, HexMapConfig};

use crate::map_file;

#[derive(Args)]
pub struct InfoArgs {
    /// Map file to inspect
    #[arg(long, value_name = "FILE")]
    pub map: PathBuf,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct MapSummary {
    width: i32,
    height: i32,
    cells: usize,
    units: usize,
    underwater: usize,
    walled: usize,
    explored: usize,
    roads: usize,
    rivers: usize,
    min_elevation: i32,
    max_elevation: i32,
}

pub fn run(args: InfoArgs, config: &HexMapConfig) -> Result<()> {
    let map = map_file::load_map(&args.map, config)?;
    let summary = summarize(map.grid());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_text_summary(&summary);
    }
    Ok(())
}

fn summarize(grid: &HexGrid) -> MapSummary {
    let cells = || grid.cells().map(|(_, cell)| cell);
    // Each road is stored on both of its cells
    let road_ends: usize = cells().map(|cell| cell.road_flags().count_ones() as usize).sum();

    MapSummary {
        width: grid.cell_count_x(),
        height: grid.cell_count_z(),
        cells: grid.len(),
        units: grid.unit_count(),
        underwater: cells().filter(|cell| cell.is_underwater()).count(),
        walled: cells().filter(|cell| cell.walled()).count(),
        explored: cells().filter(|cell| cell.is_explored()).count(),
        roads: road_ends / 2,
        rivers: cells().filter(|cell| cell.outgoing_river().is_some()).count(),
        min_elevation: cells().map(|cell| cell.elevation()).min().unwrap_or(0),
        max_elevation: cells().map(|cell| cell.elevation()).max().unwrap_or(0),
    }
}

fn print_text_summary(summary: &MapSummary) {
    println!("\n=== HEXMAP Map Info ===");
    println!("Size:        {}x{} ({} cells)", summary.width, summary.height, summary.cells);
    println!("Elevation:   {} to {}", summary.min_elevation, summary.max_elevation);
    println!("Underwater:  {}", summary.underwater);
    println!("Walled:      {}", summary.walled);
    println!("Explored:    {}", summary.explored);
    println!("Roads:       {}", summary.roads);
    println!("River edges: {}", summary.rivers);
    println!("Units:       {}", summary.units);
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexmap_core::{CellIndex, HexDirection};

    #[test]
    fn test_summarize_blank_map() {
        let grid = HexGrid::new(10, 5).unwrap();
        let summary = summarize(&grid);
        assert_eq!(summary.cells, 50);
        assert_eq!(summary.underwater, 0);
        assert_eq!(summary.roads, 0);
        assert_eq!((summary.min_elevation, summary.max_elevation), (0, 0));
    }

    #[test]
    fn test_summarize_counts_features() {
        let mut grid = HexGrid::new(5, 5).unwrap();
        let center = grid.cell_at_offset(2, 2).unwrap();
        grid.set_water_level(CellIndex(0), 1).unwrap();
        grid.set_elevation(CellIndex(24), 3).unwrap();
        grid.set_walled(center, true).unwrap();
        assert!(grid.add_road(center, HexDirection::E).unwrap());
        assert!(grid.add_road(center, HexDirection::W).unwrap());
        assert!(grid.set_outgoing_river(center, HexDirection::NE).unwrap());
        grid.increase_visibility(center).unwrap();
        grid.add_unit(center, 0.0).unwrap();

        let summary = summarize(&grid);
        assert_eq!(summary.underwater, 1);
        assert_eq!(summary.walled, 1);
        assert_eq!(summary.roads, 2);
        assert_eq!(summary.rivers, 1);
        assert_eq!(summary.explored, 1);
        assert_eq!(summary.units, 1);
        assert_eq!(summary.max_elevation, 3);
    }
}

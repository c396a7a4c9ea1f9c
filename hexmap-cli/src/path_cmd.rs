//! Path command - find a path between two cells of a map file
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: resolve_endpoints(), build_report()
//! - Level 3: print_json_report(), print_text_report()

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use hexmap_core::{CellIndex, HexCoordinates, HexMap, HexMapConfig, Path};

use crate::map_file;

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct PathArgs {
    /// Map file to search
    #[arg(long, value_name = "FILE")]
    pub map: PathBuf,

    /// Source cell as COL,ROW
    #[arg(long, value_parser = map_file::parse_offset)]
    pub from: (i32, i32),

    /// Target cell as COL,ROW
    #[arg(long, value_parser = map_file::parse_offset)]
    pub to: (i32, i32),

    /// Movement points per turn (defaults to the configured speed)
    #[arg(long)]
    pub speed: Option<u32>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, Serialize)]
struct StepReport {
    col: i32,
    row: i32,
    coordinates: HexCoordinates,
    distance: i32,
    turn: i32,
}

#[derive(Clone, Debug, Serialize)]
struct PathReport {
    found: bool,
    speed: u32,
    cost: Option<i32>,
    turns: Option<i32>,
    steps: Vec<StepReport>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: PathArgs, config: &HexMapConfig) -> Result<()> {
    let mut map = map_file::load_map(&args.map, config)?;
    let (from, to) = resolve_endpoints(&map, &args)?;
    let speed = args.speed.unwrap_or(map.default_speed());

    map.find_path(from, to, speed).context("Path search failed")?;
    let report = build_report(&map, map.path().as_ref(), speed);

    if args.json {
        print_json_report(&report)?;
    } else {
        print_text_report(&report);
    }
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn resolve_endpoints(map: &HexMap, args: &PathArgs) -> Result<(CellIndex, CellIndex)> {
    let lookup = |(col, row): (i32, i32)| {
        map.cell_at_offset(col, row).with_context(|| {
            format!(
                "Cell {},{} is outside the {}x{} map",
                col,
                row,
                map.grid().cell_count_x(),
                map.grid().cell_count_z()
            )
        })
    };
    Ok((lookup(args.from)?, lookup(args.to)?))
}

fn build_report(map: &HexMap, path: Option<&Path>, speed: u32) -> PathReport {
    let Some(path) = path else {
        return PathReport {
            found: false,
            speed,
            cost: None,
            turns: None,
            steps: Vec::new(),
        };
    };

    let steps = path
        .steps()
        .iter()
        .map(|step| {
            let coordinates = map.cell(step.cell).coordinates();
            let (col, row) = coordinates.to_offset();
            StepReport {
                col,
                row,
                coordinates,
                distance: step.distance,
                turn: step.turn,
            }
        })
        .collect();

    PathReport {
        found: true,
        speed,
        cost: Some(path.cost()),
        turns: Some(path.turns()),
        steps,
    }
}

// ============================================================================
// LEVEL 3 - OUTPUT
// ============================================================================

fn print_json_report(report: &PathReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn print_text_report(report: &PathReport) {
    if !report.found {
        println!("no path");
        return;
    }

    println!("{:>4} {:>5} {:>14} {:>9} {:>5}", "Col", "Row", "Cube", "Distance", "Turn");
    println!("{}", "-".repeat(42));
    for step in &report.steps {
        println!(
            "{:>4} {:>5} {:>14} {:>9} {:>5}",
            step.col,
            step.row,
            step.coordinates.to_string(),
            step.distance,
            step.turn
        );
    }
    if let (Some(cost), Some(turns)) = (report.cost, report.turns) {
        println!("\nCost {} over {} turns at speed {}", cost, turns, report.speed);
    }
}

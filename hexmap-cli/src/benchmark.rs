//! Benchmark command - time repeated path searches
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: prepare_map(), run_searches(), report_results()
//! - Level 4: timing utilities, formatting

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Args;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use hexmap_core::{CellIndex, HexMap, HexMapConfig};

use crate::map_file;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BenchmarkArgs {
    /// Map file to search (a flat map is built when omitted)
    #[arg(long, value_name = "FILE")]
    pub map: Option<PathBuf>,

    /// Width of the generated map
    #[arg(long)]
    pub width: Option<i32>,

    /// Height of the generated map
    #[arg(long)]
    pub height: Option<i32>,

    /// Number of searches to run
    #[arg(long, default_value = "1000")]
    pub searches: usize,

    /// Movement points per turn (defaults to the configured speed)
    #[arg(long)]
    pub speed: Option<u32>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Results of one benchmark run
#[derive(Clone, Debug, serde::Serialize)]
struct BenchmarkResult {
    width: i32,
    height: i32,
    speed: u32,
    searches: usize,
    found: usize,
    total_cost: i64,
    #[serde(skip)]
    total_time: Duration,
    total_time_ms: f64,
    avg_time_us: f64,
    searches_per_second: f64,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run benchmark command
///
/// 1. Load or build the map
/// 2. Run searches between random endpoints
/// 3. Report timing
pub fn run(args: BenchmarkArgs, config: &HexMapConfig, seed: Option<u64>) -> Result<()> {
    let mut map = prepare_map(&args, config)?;
    let speed = args.speed.unwrap_or(map.default_speed());

    tracing::info!(
        "Starting benchmark: {} searches on {}x{} map, speed {}",
        args.searches,
        map.grid().cell_count_x(),
        map.grid().cell_count_z(),
        speed
    );

    let mut rng = map_file::create_rng(seed);
    let result = run_searches(&mut map, &mut rng, args.searches, speed)?;

    report_results(&result, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn prepare_map(args: &BenchmarkArgs, config: &HexMapConfig) -> Result<HexMap> {
    if let Some(path) = &args.map {
        return map_file::load_map(path, config);
    }
    let config = config.clone().with_map_size(
        args.width.unwrap_or(config.map_width),
        args.height.unwrap_or(config.map_height),
    );
    Ok(HexMap::new(&config)?)
}

fn run_searches(map: &mut HexMap, rng: &mut ChaCha8Rng, searches: usize, speed: u32) -> Result<BenchmarkResult> {
    let cell_count = map.grid().len();
    let mut found = 0;
    let mut total_cost = 0i64;

    let start = Instant::now();
    for _ in 0..searches {
        let from = CellIndex(rng.gen_range(0..cell_count));
        let to = CellIndex(rng.gen_range(0..cell_count));
        if map.find_path(from, to, speed)? {
            found += 1;
            total_cost += map.path().map_or(0, |path| path.cost() as i64);
        }
    }
    let total_time = start.elapsed();

    let seconds = total_time.as_secs_f64();
    Ok(BenchmarkResult {
        width: map.grid().cell_count_x(),
        height: map.grid().cell_count_z(),
        speed,
        searches,
        found,
        total_cost,
        total_time,
        total_time_ms: seconds * 1000.0,
        avg_time_us: if searches > 0 { seconds * 1_000_000.0 / searches as f64 } else { 0.0 },
        searches_per_second: if seconds > 0.0 { searches as f64 / seconds } else { 0.0 },
    })
}

fn report_results(result: &BenchmarkResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("\n=== HEXMAP Search Benchmark ===");
    println!("Map:        {}x{}", result.width, result.height);
    println!("Speed:      {}", result.speed);
    println!("Searches:   {} ({} found)", result.searches, result.found);
    println!("Total time: {}", format_duration(result.total_time));
    println!(
        "Per search: {}",
        format_duration(Duration::from_secs_f64(result.avg_time_us / 1_000_000.0))
    );
    println!("Searches/s: {:.0}", result.searches_per_second);
    Ok(())
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Render a duration in the largest unit it reaches, e.g. `3.20ms`
fn format_duration(d: Duration) -> String {
    const UNITS: [(f64, &str); 3] = [(1.0, "s"), (1e-3, "ms"), (1e-6, "us")];
    let secs = d.as_secs_f64();
    let (scale, unit) = UNITS
        .into_iter()
        .find(|&(scale, _)| secs >= scale)
        .unwrap_or((1e-9, "ns"));
    format!("{:.2}{}", secs / scale, unit)
}

//! HEXMAP CLI - Command-line interface
//!
//! Commands:
//! - new: Write a blank map file
//! - info: Summarize a map file
//! - path: Find a path between two cells
//! - bench: Time repeated path searches

mod benchmark;
mod info;
mod map_file;
mod new_cmd;
mod path_cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hexmap_core::HexMapConfig;

#[derive(Parser)]
#[command(name = "hexmap")]
#[command(about = "HEXMAP hex terrain and pathfinding tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file with map and search defaults
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a blank map file
    New(new_cmd::NewArgs),
    /// Summarize a map file
    Info(info::InfoArgs),
    /// Find a path between two cells
    Path(path_cmd::PathArgs),
    /// Time repeated path searches
    Bench(benchmark::BenchmarkArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => HexMapConfig::load(path)?,
        None => HexMapConfig::default(),
    };

    match cli.command {
        Commands::New(args) => new_cmd::run(args, &config),
        Commands::Info(args) => info::run(args, &config),
        Commands::Path(args) => path_cmd::run(args, &config),
        Commands::Bench(args) => benchmark::run(args, &config, cli.seed),
    }
}

/// Logs go to stderr so JSON output on stdout stays clean
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

//! New command - write a blank map file

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use hexmap_core::{HexMap, HexMapConfig};

use crate::map_file;

#[derive(Args)]
pub struct NewArgs {
    /// Map width in cells (defaults to the configured width)
    #[arg(long)]
    pub width: Option<i32>,

    /// Map height in cells (defaults to the configured height)
    #[arg(long)]
    pub height: Option<i32>,

    /// Output map file
    #[arg(long, value_name = "FILE")]
    pub output: PathBuf,
}

pub fn run(args: NewArgs, config: &HexMapConfig) -> Result<()> {
    let config = config.clone().with_map_size(
        args.width.unwrap_or(config.map_width),
        args.height.unwrap_or(config.map_height),
    );
    let map = HexMap::new(&config)?;
    map_file::save_map(&map, &args.output)?;

    println!(
        "Wrote {}x{} map to {}",
        config.map_width,
        config.map_height,
        args.output.display()
    );
    Ok(())
}

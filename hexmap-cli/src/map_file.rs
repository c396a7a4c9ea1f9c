//! Reading and writing map files, plus argument helpers shared by commands

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use hexmap_core::{persistence, HexMap, HexMapConfig};

/// Load a map file into a facade configured by `config`
pub fn load_map(path: &Path, config: &HexMapConfig) -> Result<HexMap> {
    let file = File::open(path).with_context(|| format!("Failed to open map {}", path.display()))?;
    let grid = persistence::load(&mut BufReader::new(file))
        .with_context(|| format!("Failed to read map {}", path.display()))?;
    tracing::info!(
        "Loaded {} ({}x{}, {} units)",
        path.display(),
        grid.cell_count_x(),
        grid.cell_count_z(),
        grid.unit_count()
    );
    Ok(HexMap::from_grid(grid, config))
}

pub fn save_map(map: &HexMap, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create map {}", path.display()))?;
    map.save(&mut BufWriter::new(file))
        .with_context(|| format!("Failed to write map {}", path.display()))?;
    Ok(())
}

/// Parse an offset cell given as `COL,ROW`
pub fn parse_offset(s: &str) -> Result<(i32, i32), String> {
    let (col, row) = s
        .split_once(',')
        .ok_or_else(|| format!("expected COL,ROW but got '{}'", s))?;
    let col = col.trim().parse().map_err(|_| format!("invalid column '{}'", col))?;
    let row = row.trim().parse().map_err(|_| format!("invalid row '{}'", row))?;
    Ok((col, row))
}

/// Create RNG from seed or random
pub fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

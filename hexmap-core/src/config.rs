//! Map defaults loadable from JSON

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::frontier::DEFAULT_FRONTIER_CAPACITY;
use crate::grid::{DEFAULT_CELL_COUNT_X, DEFAULT_CELL_COUNT_Z};
use crate::metrics;

/// Speed used when a query does not name one
pub const DEFAULT_SPEED: u32 = 24;

/// Defaults for building maps and running searches
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HexMapConfig {
    /// Map width in cells (multiple of the chunk width)
    pub map_width: i32,
    /// Map height in cells (multiple of the chunk height)
    pub map_height: i32,
    /// Movement points per turn
    pub default_speed: u32,
    /// Initial bucket count of the search frontier
    pub frontier_capacity: usize,
}

impl Default for HexMapConfig {
    fn default() -> Self {
        Self {
            map_width: DEFAULT_CELL_COUNT_X,
            map_height: DEFAULT_CELL_COUNT_Z,
            default_speed: DEFAULT_SPEED,
            frontier_capacity: DEFAULT_FRONTIER_CAPACITY,
        }
    }
}

impl HexMapConfig {
    pub fn with_map_size(mut self, width: i32, height: i32) -> Self {
        self.map_width = width;
        self.map_height = height;
        self
    }

    pub fn with_speed(mut self, speed: u32) -> Self {
        self.default_speed = speed;
        self
    }

    pub fn with_frontier_capacity(mut self, capacity: usize) -> Self {
        self.frontier_capacity = capacity;
        self
    }

    /// Load from a JSON file; missing fields keep their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: HexMapConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !metrics::is_valid_map_size(self.map_width, self.map_height) {
            anyhow::bail!(
                "Map size {}x{} is not a positive multiple of {}x{} within {} cells",
                self.map_width,
                self.map_height,
                metrics::CHUNK_SIZE_X,
                metrics::CHUNK_SIZE_Z,
                metrics::MAX_CELL_COUNT
            );
        }
        if self.default_speed == 0 {
            anyhow::bail!("Default speed must be positive");
        }
        Ok(())
    }
}

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Largest accepted `upscale_factor`
pub const MAX_UPSCALE_FACTOR: u32 = 16;

/// `adaptive_c` beyond this turns every pixel the same color
pub const MAX_ADAPTIVE_C: i16 = 255;

/// How the global binarization level is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalThreshold {
    /// Histogram-based optimal level (Otsu's method)
    Otsu,
    /// Fixed level; pixels above it become white
    Fixed(u8),
}

/// Parameters of the preprocessing strategies.
///
/// Every field has a documented default, and a JSON file only needs to
/// name the fields it overrides:
///
/// | field                 | default | valid range       |
/// |-----------------------|---------|-------------------|
/// | `global_threshold`    | `otsu`  |                   |
/// | `adaptive_block_size` | `11`    | odd, at least 3   |
/// | `adaptive_c`          | `2`     | -255..=255        |
/// | `clahe_clip_limit`    | `2.0`   | positive          |
/// | `clahe_tile_grid`     | `[8, 8]`| non-zero          |
/// | `upscale_factor`      | `4`     | 1..=16            |
/// | `time_budget_ms`      | none    |                   |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    pub global_threshold: GlobalThreshold,
    /// Neighborhood size of the adaptive threshold (odd, pixels)
    pub adaptive_block_size: u32,
    /// Bias subtracted from the local mean
    pub adaptive_c: i16,
    pub clahe_clip_limit: f32,
    /// Tile grid as (columns, rows)
    pub clahe_tile_grid: (u32, u32),
    pub upscale_factor: u32,
    /// Upper bound for a whole recognition call; checked before each attempt
    pub time_budget_ms: Option<u64>,
}

impl RecognitionConfig {
    pub fn new() -> Self {
        Self {
            global_threshold: GlobalThreshold::Otsu,
            adaptive_block_size: 11,
            adaptive_c: 2,
            clahe_clip_limit: 2.0,
            clahe_tile_grid: (8, 8),
            upscale_factor: 4,
            time_budget_ms: None,
        }
    }

    /// Load a config from a JSON file and validate it
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_global_threshold(mut self, method: GlobalThreshold) -> Self {
        self.global_threshold = method;
        self
    }

    pub fn with_adaptive(mut self, block_size: u32, c: i16) -> Self {
        self.adaptive_block_size = block_size;
        self.adaptive_c = c;
        self
    }

    pub fn with_clahe(mut self, clip_limit: f32, tile_grid: (u32, u32)) -> Self {
        self.clahe_clip_limit = clip_limit;
        self.clahe_tile_grid = tile_grid;
        self
    }

    pub fn with_upscale_factor(mut self, factor: u32) -> Self {
        self.upscale_factor = factor;
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget_ms = Some(budget.as_millis() as u64);
        self
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }

    /// Check that every parameter is usable by the transforms
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.adaptive_block_size < 3 || self.adaptive_block_size % 2 == 0 {
            return Err(ConfigError::InvalidBlockSize(self.adaptive_block_size));
        }
        if !(-MAX_ADAPTIVE_C..=MAX_ADAPTIVE_C).contains(&self.adaptive_c) {
            return Err(ConfigError::InvalidAdaptiveC(self.adaptive_c));
        }
        if self.upscale_factor == 0 {
            return Err(ConfigError::ZeroUpscaleFactor);
        }
        if self.upscale_factor > MAX_UPSCALE_FACTOR {
            return Err(ConfigError::UpscaleFactorTooLarge(self.upscale_factor));
        }
        let (cols, rows) = self.clahe_tile_grid;
        if cols == 0 || rows == 0 {
            return Err(ConfigError::ZeroTileGrid(cols, rows));
        }
        if !(self.clahe_clip_limit > 0.0) {
            return Err(ConfigError::InvalidClipLimit(self.clahe_clip_limit));
        }
        Ok(())
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self::new()
    }
}

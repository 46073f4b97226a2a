use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors of a recognition call.
///
/// "Nothing recognized" is not an error; it is returned as
/// [`Outcome::NotFound`](crate::models::Outcome::NotFound).
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("Image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("Failed to read image {}: {source}", path.display())]
    ImageUnreadable {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write debug output {}: {source}", path.display())]
    DebugOutput {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Debug directory is not empty: {}", .0.display())]
    DebugDirNotEmpty(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Invalid or unreadable recognition configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("adaptive_block_size must be odd and at least 3, got {0}")]
    InvalidBlockSize(u32),

    #[error("adaptive_c must be within -255..=255, got {0}")]
    InvalidAdaptiveC(i16),

    #[error("upscale_factor must be at least 1")]
    ZeroUpscaleFactor,

    #[error("upscale_factor must be at most 16, got {0}")]
    UpscaleFactorTooLarge(u32),

    #[error("clahe_tile_grid must be non-zero in both directions, got {0}x{1}")]
    ZeroTileGrid(u32, u32),

    #[error("clahe_clip_limit must be positive, got {0}")]
    InvalidClipLimit(f32),

    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, RecognitionError>;

pub mod annotate;
pub mod cascade;
pub mod checksum;
pub mod decoder;
pub mod ean13;
pub mod preprocessing;
#[cfg(feature = "rxing")]
pub mod rxing_decoder;
pub mod scanline;
pub mod steps;

use image::{DynamicImage, ImageReader};
use std::path::Path;
use std::sync::Arc;

use crate::config::RecognitionConfig;
use crate::error::{RecognitionError, Result};
use crate::models::Symbology;
use crate::pipeline::Pipeline;

/// Read an image file into memory.
///
/// A missing file is reported as [`RecognitionError::ImageNotFound`]; a
/// file that exists but cannot be decoded as
/// [`RecognitionError::ImageUnreadable`].
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(RecognitionError::ImageNotFound(path.to_path_buf()));
    }

    let unreadable = |source: image::ImageError| RecognitionError::ImageUnreadable {
        path: path.to_path_buf(),
        source,
    };

    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| unreadable(image::ImageError::IoError(e)))?
        .decode()
        .map_err(unreadable)
}

/// The EAN-13 strategy set: original, thresh, adaptive, clahe
pub fn build_ean13_pipeline(config: &RecognitionConfig) -> Pipeline {
    use steps::*;

    Pipeline::new()
        .accepting(vec![Symbology::Ean13])
        .with_time_budget(config.time_budget())
        .add_step(Arc::new(GrayscaleStep))
        .add_step(Arc::new(GlobalThresholdStep {
            method: config.global_threshold,
        }))
        .add_step(Arc::new(AdaptiveThresholdStep {
            block_size: config.adaptive_block_size,
            c: config.adaptive_c,
        }))
        .add_step(Arc::new(ClaheStep {
            clip_limit: config.clahe_clip_limit,
            tile_grid: config.clahe_tile_grid,
        }))
}

/// The Data Matrix cascade stages: direct, thresh, upscale.
/// Every stage decodes against all symbologies.
pub fn build_datamatrix_pipeline(config: &RecognitionConfig) -> Pipeline {
    use steps::*;

    Pipeline::new()
        .with_time_budget(config.time_budget())
        .add_step(Arc::new(DirectStep))
        .add_step(Arc::new(GlobalThresholdStep {
            method: config.global_threshold,
        }))
        .add_step(Arc::new(UpscaleThresholdStep {
            factor: config.upscale_factor,
            method: config.global_threshold,
        }))
}

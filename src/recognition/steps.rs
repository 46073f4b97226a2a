use image::DynamicImage;

use crate::config::{GlobalThreshold, MAX_UPSCALE_FACTOR};
use crate::pipeline::PipelineStep;
use crate::recognition::preprocessing;

/// Hand the loaded image to the decoder untouched
pub struct DirectStep;

impl PipelineStep for DirectStep {
    fn apply(&self, source: &DynamicImage) -> DynamicImage {
        source.clone()
    }

    fn name(&self) -> &str {
        "direct"
    }
}

/// Grayscale conversion only
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn apply(&self, source: &DynamicImage) -> DynamicImage {
        DynamicImage::ImageLuma8(preprocessing::to_grayscale(source))
    }

    fn name(&self) -> &str {
        "original"
    }
}

/// Grayscale, then one global binarization level
pub struct GlobalThresholdStep {
    pub method: GlobalThreshold,
}

impl PipelineStep for GlobalThresholdStep {
    fn apply(&self, source: &DynamicImage) -> DynamicImage {
        let gray = preprocessing::to_grayscale(source);
        DynamicImage::ImageLuma8(preprocessing::global_threshold(&gray, self.method))
    }

    fn name(&self) -> &str {
        "thresh"
    }
}

/// Grayscale, then binarization against the Gaussian local mean
pub struct AdaptiveThresholdStep {
    pub block_size: u32,
    pub c: i16,
}

impl PipelineStep for AdaptiveThresholdStep {
    fn apply(&self, source: &DynamicImage) -> DynamicImage {
        let gray = preprocessing::to_grayscale(source);
        DynamicImage::ImageLuma8(preprocessing::adaptive_threshold_gaussian(
            &gray,
            self.block_size,
            self.c,
        ))
    }

    fn name(&self) -> &str {
        "adaptive"
    }
}

/// Grayscale, then contrast-limited tile equalization
pub struct ClaheStep {
    pub clip_limit: f32,
    pub tile_grid: (u32, u32),
}

impl PipelineStep for ClaheStep {
    fn apply(&self, source: &DynamicImage) -> DynamicImage {
        let gray = preprocessing::to_grayscale(source);
        DynamicImage::ImageLuma8(preprocessing::clahe(&gray, self.clip_limit, self.tile_grid))
    }

    fn name(&self) -> &str {
        "clahe"
    }
}

/// Grayscale, cubic upscale by an integer factor, then global binarization.
/// The factor is clamped to `1..=MAX_UPSCALE_FACTOR`.
pub struct UpscaleThresholdStep {
    pub factor: u32,
    pub method: GlobalThreshold,
}

impl UpscaleThresholdStep {
    fn effective_factor(&self) -> u32 {
        self.factor.clamp(1, MAX_UPSCALE_FACTOR)
    }
}

impl PipelineStep for UpscaleThresholdStep {
    fn apply(&self, source: &DynamicImage) -> DynamicImage {
        let gray = preprocessing::to_grayscale(source);
        let upscaled = preprocessing::upscale(&gray, self.effective_factor());
        DynamicImage::ImageLuma8(preprocessing::global_threshold(&upscaled, self.method))
    }

    fn name(&self) -> &str {
        "upscale"
    }

    fn scale_factor(&self) -> u32 {
        self.effective_factor()
    }
}

use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

use crate::models::{BoundingBox, RecognitionResult};

const OVERLAY_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const OVERLAY_THICKNESS: u32 = 2;
const LABEL_SCALE: f32 = 16.0;
/// Pixels between the label and the box
const LABEL_GAP: i32 = 2;

/// Callback invoked once per successful recognition.
///
/// Hooks run synchronously on the recognizing thread, and `&mut self`
/// keeps them serialized per recognizer.
pub trait ResultHook {
    fn on_success(&mut self, source: &DynamicImage, result: &RecognitionResult) -> anyhow::Result<()>;
}

impl<F> ResultHook for F
where
    F: FnMut(&DynamicImage, &RecognitionResult) -> anyhow::Result<()>,
{
    fn on_success(&mut self, source: &DynamicImage, result: &RecognitionResult) -> anyhow::Result<()> {
        self(source, result)
    }
}

/// Copy of `source` with the result's bounding box outlined in green.
///
/// With a font, the payload is written above the box (below it when the
/// box touches the top edge).
pub fn annotate(source: &DynamicImage, result: &RecognitionResult, font: Option<&FontVec>) -> RgbImage {
    let mut canvas = source.to_rgb8();
    draw_box(&mut canvas, &result.bbox);
    if let Some(font) = font {
        draw_label(&mut canvas, &result.bbox, &result.payload, font);
    }
    canvas
}

fn draw_box(canvas: &mut RgbImage, bbox: &BoundingBox) {
    for inset in 0..OVERLAY_THICKNESS {
        let width = bbox.width.saturating_sub(2 * inset);
        let height = bbox.height.saturating_sub(2 * inset);
        if width == 0 || height == 0 {
            break;
        }
        let rect = Rect::at((bbox.x + inset) as i32, (bbox.y + inset) as i32).of_size(width, height);
        draw_hollow_rect_mut(canvas, rect, OVERLAY_COLOR);
    }
}

fn draw_label(canvas: &mut RgbImage, bbox: &BoundingBox, text: &str, font: &FontVec) {
    let scale = PxScale::from(LABEL_SCALE);
    let (_, text_height) = text_size(scale, font, text);

    let above = bbox.y as i32 - text_height as i32 - LABEL_GAP;
    let y = if above >= 0 {
        above
    } else {
        (bbox.y + bbox.height) as i32 + LABEL_GAP
    };

    draw_text_mut(canvas, OVERLAY_COLOR, bbox.x as i32, y, scale, font, text);
}

/// Writes the annotated image to a file instead of showing it
pub struct AnnotateToFile {
    pub path: PathBuf,
    font: Option<FontVec>,
}

impl AnnotateToFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            font: None,
        }
    }

    /// Also write the payload next to the box using a TrueType/OpenType font file
    pub fn with_label_font(mut self, font_path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read(font_path)
            .map_err(|e| anyhow::anyhow!("Failed to read font {}: {}", font_path.display(), e))?;
        let font = FontVec::try_from_vec(data)
            .map_err(|_| anyhow::anyhow!("Failed to parse font file: {}", font_path.display()))?;
        tracing::debug!("Loaded label font: {}", font_path.display());
        self.font = Some(font);
        Ok(self)
    }
}

impl ResultHook for AnnotateToFile {
    fn on_success(&mut self, source: &DynamicImage, result: &RecognitionResult) -> anyhow::Result<()> {
        annotate(source, result, self.font.as_ref())
            .save(&self.path)
            .map_err(|e| anyhow::anyhow!("Failed to save annotated image: {}", e))
    }
}

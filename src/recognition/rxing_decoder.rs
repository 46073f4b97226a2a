use image::DynamicImage;
use rxing::{BarcodeFormat, RXingResult};

use crate::models::{BoundingBox, DetectedSymbol, Symbology};
use crate::recognition::decoder::{accepts, SymbolDecoder};

/// Adapter over the `rxing` multi-format engine (EAN-13 and Data Matrix)
#[derive(Debug, Clone, Default)]
pub struct RxingDecoder;

impl SymbolDecoder for RxingDecoder {
    fn decode(&self, image: &DynamicImage, accepted: &[Symbology]) -> Vec<DetectedSymbol> {
        let luma = image.to_luma8();
        let (width, height) = luma.dimensions();

        match rxing::helpers::detect_multiple_in_luma(luma.into_raw(), width, height) {
            Ok(results) => results
                .iter()
                .map(to_symbol)
                .filter(|s| accepts(accepted, &s.symbology))
                .collect(),
            Err(e) => {
                // rxing reports "nothing found" as an error too
                tracing::debug!("rxing found no symbols: {}", e);
                Vec::new()
            }
        }
    }
}

fn to_symbol(result: &RXingResult) -> DetectedSymbol {
    let symbology = match result.getBarcodeFormat() {
        BarcodeFormat::EAN_13 => Symbology::Ean13,
        BarcodeFormat::DATA_MATRIX => Symbology::DataMatrix,
        other => Symbology::Other(format!("{:?}", other)),
    };

    let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
    let (mut max_x, mut max_y) = (0f32, 0f32);
    for point in result.getPoints().iter() {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }
    let bbox = if min_x <= max_x && min_y <= max_y {
        BoundingBox::new(
            min_x.max(0.0) as u32,
            min_y.max(0.0) as u32,
            (max_x - min_x).ceil() as u32,
            (max_y - min_y).ceil() as u32,
        )
    } else {
        BoundingBox::new(0, 0, 0, 0)
    };

    DetectedSymbol::new(result.getText().as_bytes().to_vec(), symbology, bbox)
}

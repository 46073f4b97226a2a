use image::DynamicImage;

use crate::models::{DetectedSymbol, Symbology};

/// A symbol detection engine.
///
/// Given a processed image and the symbologies the caller accepts, return
/// every symbol found, in a stable order. An empty `accepted` slice means
/// every symbology the engine supports. Symbologies the engine cannot read
/// simply never show up in the result.
pub trait SymbolDecoder {
    fn decode(&self, image: &DynamicImage, accepted: &[Symbology]) -> Vec<DetectedSymbol>;
}

impl<F> SymbolDecoder for F
where
    F: Fn(&DynamicImage, &[Symbology]) -> Vec<DetectedSymbol>,
{
    fn decode(&self, image: &DynamicImage, accepted: &[Symbology]) -> Vec<DetectedSymbol> {
        self(image, accepted)
    }
}

/// Whether `symbology` passes an accepted-set filter (empty set accepts all)
pub fn accepts(accepted: &[Symbology], symbology: &Symbology) -> bool {
    accepted.is_empty() || accepted.contains(symbology)
}

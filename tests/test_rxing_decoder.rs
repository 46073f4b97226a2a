//! Tests for the rxing engine adapter.
#![cfg(feature = "rxing")]

mod common;

use image::{DynamicImage, GrayImage, Luma};
use symscan::{Ean13Recognizer, RxingDecoder, SymbolDecoder, Symbology};

use common::*;

/// Unit 3 with a 10-module quiet zone: the guards start at x=30 and the
/// symbol ends at x=315.
fn wide_render() -> DynamicImage {
    DynamicImage::ImageLuma8(render_ean13(SAMPLE_EAN13, 3, 80, 0, 255))
}

#[test]
fn test_decodes_rendered_ean13() {
    let symbols = RxingDecoder.decode(&wide_render(), &[Symbology::Ean13]);

    let symbol = symbols
        .iter()
        .find(|s| s.text() == Some(SAMPLE_EAN13))
        .unwrap_or_else(|| panic!("EAN-13 not read, got {:?}", symbols));
    assert_eq!(symbol.symbology, Symbology::Ean13);
    assert!(symbols.iter().all(|s| s.symbology == Symbology::Ean13));

    // Result points sit on the guard patterns, so the box spans the bars
    // in source pixels
    let bbox = symbol.bbox;
    assert!((25..45).contains(&bbox.x), "unexpected left edge in {:?}", bbox);
    assert!((300..=320).contains(&(bbox.x + bbox.width)), "unexpected right edge in {:?}", bbox);
    assert!(bbox.y < 80);
}

#[test]
fn test_accepted_set_filters_results() {
    assert!(RxingDecoder.decode(&wide_render(), &[Symbology::DataMatrix]).is_empty());
}

#[test]
fn test_blank_image_yields_nothing() {
    let blank = DynamicImage::ImageLuma8(GrayImage::from_pixel(200, 120, Luma([255u8])));
    assert!(RxingDecoder.decode(&blank, &[]).is_empty());
}

#[test]
fn test_recognizer_with_rxing_engine() {
    let mut recognizer = Ean13Recognizer::new(RxingDecoder);
    let outcome = recognizer.recognize(&wide_render()).unwrap();

    let result = outcome.result().expect("expected a recognized barcode");
    assert_eq!(result.payload, SAMPLE_EAN13);
    assert_eq!(result.symbology, Symbology::Ean13);
    assert_eq!(result.strategy, "original");
}

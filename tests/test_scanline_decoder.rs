//! Tests for the built-in scanline EAN-13 engine.

mod common;

use image::{DynamicImage, GrayImage, Luma};
use symscan::{BoundingBox, ScanlineDecoder, SymbolDecoder, Symbology};

use common::*;

fn decode_texts(image: &DynamicImage, accepted: &[Symbology]) -> Vec<String> {
    ScanlineDecoder::new()
        .decode(image, accepted)
        .iter()
        .map(|s| s.text().unwrap().to_string())
        .collect()
}

#[test]
fn test_decode_clean_render() {
    let symbols = ScanlineDecoder::new().decode(&clean_ean13_image(SAMPLE_EAN13), &[Symbology::Ean13]);

    assert_eq!(symbols.len(), 1);
    assert_eq!(symbols[0].text(), Some(SAMPLE_EAN13));
    assert_eq!(symbols[0].symbology, Symbology::Ean13);
    assert_eq!(symbols[0].bbox, BoundingBox::new(20, 0, 190, 60));
}

#[test]
fn test_decode_every_leading_digit_parity() {
    for code in ["0012345678905", "4006381333931", "5901234123457", "9780306406157"] {
        let texts = decode_texts(&clean_ean13_image(code), &[Symbology::Ean13]);
        assert_eq!(texts, vec![code.to_string()], "failed to read {}", code);
    }
}

#[test]
fn test_decode_upside_down() {
    let image = clean_ean13_image(SAMPLE_EAN13).rotate180();
    let symbols = ScanlineDecoder::new().decode(&image, &[]);

    assert_eq!(symbols.len(), 1);
    assert_eq!(symbols[0].text(), Some(SAMPLE_EAN13));
    assert_eq!(symbols[0].bbox.x, 20);
    assert_eq!(symbols[0].bbox.width, 190);
}

#[test]
fn test_decode_wider_modules() {
    let image = DynamicImage::ImageLuma8(render_ean13(SAMPLE_EAN13, 3, 40, 20, 230));
    assert_eq!(decode_texts(&image, &[]), vec![SAMPLE_EAN13.to_string()]);
}

#[test]
fn test_check_digit_not_filtered() {
    let image = clean_ean13_image("4006381333932");
    assert_eq!(decode_texts(&image, &[]), vec!["4006381333932".to_string()]);
}

#[test]
fn test_other_accepted_set_returns_nothing() {
    let image = clean_ean13_image(SAMPLE_EAN13);
    assert!(decode_texts(&image, &[Symbology::DataMatrix]).is_empty());
}

#[test]
fn test_low_contrast_rows_skipped() {
    let image = low_contrast_ean13_image(SAMPLE_EAN13);
    assert!(decode_texts(&image, &[]).is_empty());
}

#[test]
fn test_blank_and_tiny_images() {
    let blank = DynamicImage::ImageLuma8(GrayImage::from_pixel(300, 50, Luma([255u8])));
    assert!(decode_texts(&blank, &[]).is_empty());

    let tiny = DynamicImage::ImageLuma8(GrayImage::from_pixel(1, 1, Luma([0u8])));
    assert!(decode_texts(&tiny, &[]).is_empty());
}

#[test]
fn test_truncated_symbol_not_read() {
    // Crop away the end guard and quiet zone
    let full = render_ean13(SAMPLE_EAN13, 2, 30, 0, 255);
    let cropped = image::imageops::crop_imm(&full, 0, 0, 200, 30).to_image();
    assert!(decode_texts(&DynamicImage::ImageLuma8(cropped), &[]).is_empty());
}

#[test]
fn test_sparse_scan_lines() {
    let decoder = ScanlineDecoder::new().with_scan_lines(4);
    let symbols = decoder.decode(&clean_ean13_image(SAMPLE_EAN13), &[]);

    assert_eq!(symbols.len(), 1);
    assert_eq!(symbols[0].text(), Some(SAMPLE_EAN13));
    // Rows 0, 15, 30, 45
    assert_eq!(symbols[0].bbox, BoundingBox::new(20, 0, 190, 46));
}

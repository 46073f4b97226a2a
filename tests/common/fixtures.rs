use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb};
use tempfile::NamedTempFile;

/// Quiet zone on each side of a rendered symbol, in modules
pub const QUIET_MODULES: u32 = 10;

/// Valid EAN-13 used throughout the tests
pub const SAMPLE_EAN13: &str = "4006381333931";

const L_WIDTHS: [[u32; 4]; 10] = [
    [3, 2, 1, 1],
    [2, 2, 2, 1],
    [2, 1, 2, 2],
    [1, 4, 1, 1],
    [1, 1, 3, 2],
    [1, 2, 3, 1],
    [1, 1, 1, 4],
    [1, 3, 1, 2],
    [1, 2, 1, 3],
    [3, 1, 1, 2],
];

const PARITY: [&str; 10] = [
    "LLLLLL", "LLGLGG", "LLGGLG", "LLGGGL", "LGLLGG",
    "LGGLLG", "LGGGLL", "LGLGLG", "LGLGGL", "LGGLGL",
];

/// Bar/space runs of an EAN-13 symbol including quiet zones,
/// as (is_bar, width in modules). The check digit is drawn as given.
pub fn ean13_runs(code: &str) -> Vec<(bool, u32)> {
    let digits: Vec<usize> = code.bytes().map(|b| (b - b'0') as usize).collect();
    assert_eq!(digits.len(), 13, "EAN-13 fixtures need 13 digits");
    let parity = PARITY[digits[0]].as_bytes();

    let mut runs = vec![(false, QUIET_MODULES)];
    runs.extend([(true, 1), (false, 1), (true, 1)]);
    for i in 0..6 {
        let w = L_WIDTHS[digits[i + 1]];
        let w = if parity[i] == b'G' { [w[3], w[2], w[1], w[0]] } else { w };
        runs.extend([(false, w[0]), (true, w[1]), (false, w[2]), (true, w[3])]);
    }
    runs.extend([(false, 1), (true, 1), (false, 1), (true, 1), (false, 1)]);
    for &digit in &digits[7..13] {
        let w = L_WIDTHS[digit];
        runs.extend([(true, w[0]), (false, w[1]), (true, w[2]), (false, w[3])]);
    }
    runs.extend([(true, 1), (false, 1), (true, 1)]);
    runs.push((false, QUIET_MODULES));
    runs
}

/// Render an EAN-13 symbol filling the whole image height.
/// `unit` is the module width in pixels.
pub fn render_ean13(code: &str, unit: u32, height: u32, bar: u8, space: u8) -> GrayImage {
    let mut columns: Vec<u8> = Vec::new();
    for (is_bar, modules) in ean13_runs(code) {
        let value = if is_bar { bar } else { space };
        columns.extend(std::iter::repeat(value).take((modules * unit) as usize));
    }

    GrayImage::from_fn(columns.len() as u32, height, |x, _| Luma([columns[x as usize]]))
}

/// Black-on-white render as a color image, like a photo loaded from disk
pub fn clean_ean13_image(code: &str) -> DynamicImage {
    let gray = render_ean13(code, 2, 60, 0, 255);
    DynamicImage::ImageRgb8(DynamicImage::ImageLuma8(gray).to_rgb8())
}

/// Bars and spaces only 30 levels apart
pub fn low_contrast_ean13_image(code: &str) -> DynamicImage {
    DynamicImage::ImageLuma8(render_ean13(code, 2, 60, 110, 140))
}

/// Black-on-white render lit from the right: brightness ramps from 30% at
/// the left edge to 100% at the right, and bars reflect 5% of the light.
/// Spaces on the dark side end up darker than bars on the bright side.
pub fn shaded_ean13_image(code: &str) -> DynamicImage {
    let flat = render_ean13(code, 2, 60, 0, 255);
    let last = (flat.width() - 1) as f32;
    let shaded = GrayImage::from_fn(flat.width(), flat.height(), |x, y| {
        let light = 255.0 * (0.3 + 0.7 * x as f32 / last);
        let value = if flat.get_pixel(x, y)[0] == 0 { light * 0.05 } else { light };
        Luma([value.round() as u8])
    });
    DynamicImage::ImageLuma8(shaded)
}

/// Deterministic salt-and-pepper noise
pub fn noise_image(width: u32, height: u32) -> DynamicImage {
    let mut state = 0x2545_f491u32;
    let gray = GrayImage::from_fn(width, height, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        Luma([if state & 1 == 0 { 0 } else { 255 }])
    });
    DynamicImage::ImageLuma8(gray)
}

/// Saves an image as PNG to a temp file.
/// The file will be automatically cleaned up when dropped.
pub fn create_test_image_file(img: &DynamicImage) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

/// A `.png` file whose contents are not an image
pub fn create_corrupt_image_file() -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    std::fs::write(file.path(), b"definitely not a png").expect("Failed to write corrupt image");
    file
}

/// Creates a 100x100 red test image
pub fn red_image() -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_fn(100, 100, |_, _| Rgb([255u8, 0u8, 0u8])))
}

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::filter::gaussian_blur_f32;

use crate::config::GlobalThreshold;

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Binarize with a single level for the whole image.
/// Pixels above the level become white, everything else black.
pub fn global_threshold(gray: &GrayImage, method: GlobalThreshold) -> GrayImage {
    let level = match method {
        GlobalThreshold::Otsu => otsu_level(gray),
        GlobalThreshold::Fixed(level) => level,
    };
    threshold(gray, level, ThresholdType::Binary)
}

/// Binarize against a Gaussian-weighted local mean.
///
/// The blur sigma is derived from `block_size` the same way a Gaussian
/// kernel of that size would pick it, so `block_size` acts as the
/// neighborhood diameter. A pixel becomes white iff it is brighter than
/// `local_mean - c`.
pub fn adaptive_threshold_gaussian(gray: &GrayImage, block_size: u32, c: i16) -> GrayImage {
    let sigma = 0.3 * ((block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let local_mean = gaussian_blur_f32(gray, sigma.max(0.1));

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let value = gray.get_pixel(x, y)[0] as i32;
        let mean = local_mean.get_pixel(x, y)[0] as i32;
        if value > mean - c as i32 {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Contrast-limited adaptive histogram equalization.
///
/// The image is split into `tile_grid` (columns, rows) tiles. Each tile's
/// histogram is clipped at `clip_limit * tile_pixels / 256`, the excess is
/// spread evenly over all bins, and the resulting CDF becomes the tile's
/// mapping. Pixels are mapped by bilinear blending of the four nearest
/// tile mappings.
pub fn clahe(gray: &GrayImage, clip_limit: f32, tile_grid: (u32, u32)) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray.clone();
    }

    // Never more tiles than pixels along an axis
    let tiles_x = tile_grid.0.clamp(1, width) as usize;
    let tiles_y = tile_grid.1.clamp(1, height) as usize;
    let tile_w = width as usize / tiles_x;
    let tile_h = height as usize / tiles_y;

    let mut maps = vec![[0u8; 256]; tiles_x * tiles_y];

    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            // Last tile in each direction absorbs the remainder
            let x1 = if tx == tiles_x - 1 { width as usize } else { x0 + tile_w };
            let y1 = if ty == tiles_y - 1 { height as usize } else { y0 + tile_h };

            let mut hist = [0u32; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    hist[gray.get_pixel(x as u32, y as u32)[0] as usize] += 1;
                }
            }

            let tile_pixels = ((x1 - x0) * (y1 - y0)) as u32;
            clip_histogram(&mut hist, clip_limit, tile_pixels);
            maps[ty * tiles_x + tx] = cdf_mapping(&hist);
        }
    }

    let tw = tile_w as f32;
    let th = tile_h as f32;
    let last_x = tiles_x as i32 - 1;
    let last_y = tiles_y as i32 - 1;

    GrayImage::from_fn(width, height, |x, y| {
        let value = gray.get_pixel(x, y)[0] as usize;

        // Position relative to tile centres
        let fx = (x as f32 + 0.5) / tw - 0.5;
        let fy = (y as f32 + 0.5) / th - 0.5;

        let tx0 = (fx.floor() as i32).clamp(0, last_x) as usize;
        let tx1 = (fx.floor() as i32 + 1).clamp(0, last_x) as usize;
        let ty0 = (fy.floor() as i32).clamp(0, last_y) as usize;
        let ty1 = (fy.floor() as i32 + 1).clamp(0, last_y) as usize;

        let ax = (fx - fx.floor()).clamp(0.0, 1.0);
        let ay = (fy - fy.floor()).clamp(0.0, 1.0);

        let v00 = maps[ty0 * tiles_x + tx0][value] as f32;
        let v10 = maps[ty0 * tiles_x + tx1][value] as f32;
        let v01 = maps[ty1 * tiles_x + tx0][value] as f32;
        let v11 = maps[ty1 * tiles_x + tx1][value] as f32;

        let top = v00 * (1.0 - ax) + v10 * ax;
        let bottom = v01 * (1.0 - ax) + v11 * ax;
        let blended = top * (1.0 - ay) + bottom * ay;

        Luma([blended.round().clamp(0.0, 255.0) as u8])
    })
}

/// Clip every bin at the contrast limit and redistribute the excess
fn clip_histogram(hist: &mut [u32; 256], clip_limit: f32, tile_pixels: u32) {
    let clip = ((clip_limit * tile_pixels as f32 / 256.0) as u32).max(1);

    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > clip {
            excess += *bin - clip;
            *bin = clip;
        }
    }

    let per_bin = excess / 256;
    let remainder = (excess % 256) as usize;
    for (i, bin) in hist.iter_mut().enumerate() {
        *bin += per_bin;
        if i < remainder {
            *bin += 1;
        }
    }
}

/// Equalization lookup table from a (clipped) histogram
fn cdf_mapping(hist: &[u32; 256]) -> [u8; 256] {
    let mut cdf = [0u32; 256];
    let mut running = 0u32;
    for (i, &count) in hist.iter().enumerate() {
        running += count;
        cdf[i] = running;
    }

    let cdf_min = cdf.iter().copied().find(|&v| v > 0).unwrap_or(0);
    let denom = cdf[255].saturating_sub(cdf_min);

    let mut map = [0u8; 256];
    for (i, slot) in map.iter_mut().enumerate() {
        *slot = if denom == 0 {
            i as u8
        } else {
            let scaled = cdf[i].saturating_sub(cdf_min) as f32 / denom as f32 * 255.0;
            scaled.round().min(255.0) as u8
        };
    }
    map
}

/// Enlarge by an integer factor with cubic (Catmull-Rom) interpolation.
/// Returns the image unchanged if the enlarged size would not fit in `u32`.
pub fn upscale(gray: &GrayImage, factor: u32) -> GrayImage {
    if factor <= 1 {
        return gray.clone();
    }
    let (width, height) = gray.dimensions();
    let (Some(new_width), Some(new_height)) = (width.checked_mul(factor), height.checked_mul(factor)) else {
        tracing::warn!(width, height, factor, "upscaled size overflows, keeping original size");
        return gray.clone();
    };
    image::imageops::resize(gray, new_width, new_height, FilterType::CatmullRom)
}

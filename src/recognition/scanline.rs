//! Built-in EAN-13 engine reading horizontal scanlines.
//!
//! Each scanned row is binarized at the midpoint of its own intensity
//! range and turned into bar/space runs. A symbol is 59 runs framed by
//! quiet zones: start guard (3), six left digits (4 each), centre guard
//! (5), six right digits (4 each), end guard (3). Digit widths are matched
//! against the L/G/R tables and the leading digit comes from the L/G
//! parity of the left half. Rows are read in both directions so upside
//! down symbols are found too.
//!
//! The engine does not filter by check digit; that is left to the caller's
//! acceptance policy.

use image::DynamicImage;

use crate::models::{BoundingBox, DetectedSymbol, Symbology};
use crate::recognition::decoder::{accepts, SymbolDecoder};

const SYMBOL_MODULES: f32 = 95.0;
const SYMBOL_RUNS: usize = 59;
const MIN_CONTRAST: u8 = 48;
const MIN_QUIET_MODULES: f32 = 5.0;
const MAX_DIGIT_DISTANCE: f32 = 1.5;

/// L-code widths (space, bar, space, bar). R-codes share them with colors
/// swapped; G-codes are the same widths read backwards.
const L_WIDTHS: [[u8; 4]; 10] = [
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

/// Left-half parity for each leading digit
const PARITY: [&str; 10] = [
    "LLLLLL", "LLGLGG", "LLGGLG", "LLGGGL", "LGLLGG",
    "LGGLLG", "LGGGLL", "LGLGLG", "LGLGGL", "LGGLGL",
];

#[derive(Debug, Clone, Copy)]
struct Run {
    dark: bool,
    start: usize,
    len: usize,
}

/// One successful read of one row, with its horizontal extent in pixels
struct RowRead {
    digits: String,
    start: usize,
    end: usize,
}

/// Rows agreeing on the same digits
struct Tally {
    digits: String,
    votes: u32,
    bbox: BoundingBox,
}

/// Scanline EAN-13 decoder
#[derive(Debug, Clone)]
pub struct ScanlineDecoder {
    /// Approximate number of rows sampled over the image height
    pub scan_lines: u32,
}

impl ScanlineDecoder {
    pub fn new() -> Self {
        Self { scan_lines: 48 }
    }

    pub fn with_scan_lines(mut self, scan_lines: u32) -> Self {
        self.scan_lines = scan_lines.max(1);
        self
    }
}

impl Default for ScanlineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolDecoder for ScanlineDecoder {
    fn decode(&self, image: &DynamicImage, accepted: &[Symbology]) -> Vec<DetectedSymbol> {
        if !accepts(accepted, &Symbology::Ean13) {
            return Vec::new();
        }

        let gray = image.to_luma8();
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return Vec::new();
        }

        let step = (height / self.scan_lines.max(1)).max(1);
        let raw = gray.as_raw();
        let mut tallies: Vec<Tally> = Vec::new();

        for y in (0..height).step_by(step as usize) {
            let offset = y as usize * width as usize;
            let row = &raw[offset..offset + width as usize];
            let Some(read) = read_row(row) else {
                continue;
            };

            let bbox = BoundingBox::new(read.start as u32, y, (read.end - read.start) as u32, 1);
            match tallies.iter_mut().find(|t| t.digits == read.digits) {
                Some(tally) => {
                    tally.votes += 1;
                    tally.bbox = tally.bbox.union(&bbox);
                }
                None => tallies.push(Tally {
                    digits: read.digits,
                    votes: 1,
                    bbox,
                }),
            }
        }

        // Most agreed-upon read first; ties keep top-to-bottom order
        tallies.sort_by(|a, b| b.votes.cmp(&a.votes));
        tracing::trace!(candidates = tallies.len(), "scanline decode");

        tallies
            .into_iter()
            .map(|t| DetectedSymbol::new(t.digits.into_bytes(), Symbology::Ean13, t.bbox))
            .collect()
    }
}

fn read_row(row: &[u8]) -> Option<RowRead> {
    if let Some(read) = scan(row) {
        return Some(read);
    }

    let reversed: Vec<u8> = row.iter().rev().copied().collect();
    let read = scan(&reversed)?;
    Some(RowRead {
        digits: read.digits,
        start: row.len() - read.end,
        end: row.len() - read.start,
    })
}

fn scan(row: &[u8]) -> Option<RowRead> {
    let (lo, hi) = row
        .iter()
        .fold((u8::MAX, u8::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if hi.saturating_sub(lo) < MIN_CONTRAST {
        return None;
    }

    let level = ((lo as u16 + hi as u16) / 2) as u8;
    let runs = runs(row, level);
    // Symbol plus a quiet zone run on each side
    if runs.len() < SYMBOL_RUNS + 2 {
        return None;
    }

    for start in 1..=runs.len() - SYMBOL_RUNS - 1 {
        if !runs[start].dark {
            continue;
        }
        let symbol = &runs[start..start + SYMBOL_RUNS];
        if let Some(digits) = decode_symbol(symbol, &runs[start - 1], &runs[start + SYMBOL_RUNS]) {
            let last = symbol[SYMBOL_RUNS - 1];
            return Some(RowRead {
                digits,
                start: symbol[0].start,
                end: last.start + last.len,
            });
        }
    }

    None
}

fn runs(row: &[u8], level: u8) -> Vec<Run> {
    let mut out: Vec<Run> = Vec::new();
    for (i, &value) in row.iter().enumerate() {
        let dark = value < level;
        match out.last_mut() {
            Some(run) if run.dark == dark => run.len += 1,
            _ => out.push(Run { dark, start: i, len: 1 }),
        }
    }
    out
}

fn decode_symbol(symbol: &[Run], before: &Run, after: &Run) -> Option<String> {
    let total: usize = symbol.iter().map(|r| r.len).sum();
    let module = total as f32 / SYMBOL_MODULES;
    if module < 1.0 {
        return None;
    }

    let quiet = MIN_QUIET_MODULES * module;
    if (before.len as f32) < quiet || (after.len as f32) < quiet {
        return None;
    }

    if !is_guard(&symbol[0..3], module)
        || !is_guard(&symbol[27..32], module)
        || !is_guard(&symbol[56..59], module)
    {
        return None;
    }

    let mut digits = [0u8; 13];
    let mut parity = String::with_capacity(6);

    for (i, chunk) in symbol[3..27].chunks(4).enumerate() {
        let widths = normalize(chunk, module)?;
        let (l_digit, l_dist) = best_match(&widths, false);
        let (g_digit, g_dist) = best_match(&widths, true);
        if l_dist.min(g_dist) > MAX_DIGIT_DISTANCE {
            return None;
        }
        if l_dist <= g_dist {
            digits[i + 1] = l_digit;
            parity.push('L');
        } else {
            digits[i + 1] = g_digit;
            parity.push('G');
        }
    }

    for (i, chunk) in symbol[32..56].chunks(4).enumerate() {
        let widths = normalize(chunk, module)?;
        let (digit, dist) = best_match(&widths, false);
        if dist > MAX_DIGIT_DISTANCE {
            return None;
        }
        digits[i + 7] = digit;
    }

    digits[0] = PARITY.iter().position(|p| *p == parity)? as u8;

    Some(digits.iter().map(|d| char::from(b'0' + d)).collect())
}

fn is_guard(runs: &[Run], module: f32) -> bool {
    runs.iter()
        .all(|r| (0.5..=1.6).contains(&(r.len as f32 / module)))
}

/// Four run widths scaled to sum to 7 modules
fn normalize(chunk: &[Run], module: f32) -> Option<[f32; 4]> {
    let sum: usize = chunk.iter().map(|r| r.len).sum();
    if !(5.0..=9.0).contains(&(sum as f32 / module)) {
        return None;
    }

    let mut widths = [0f32; 4];
    for (width, run) in widths.iter_mut().zip(chunk) {
        *width = run.len as f32 * 7.0 / sum as f32;
    }
    Some(widths)
}

/// Closest digit by summed width difference; `reversed` matches G-codes
fn best_match(widths: &[f32; 4], reversed: bool) -> (u8, f32) {
    let mut best = (0u8, f32::MAX);
    for (digit, pattern) in L_WIDTHS.iter().enumerate() {
        let dist: f32 = (0..4)
            .map(|k| {
                let expected = if reversed { pattern[3 - k] } else { pattern[k] };
                (widths[k] - expected as f32).abs()
            })
            .sum();
        if dist < best.1 {
            best = (digit as u8, dist);
        }
    }
    best
}

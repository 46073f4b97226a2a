use serde::Serialize;
use std::fmt;

/// Bounding box of a symbol in the image it was detected in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Map a box found in an image `factor` times larger back to the original
    pub fn downscale(&self, factor: u32) -> BoundingBox {
        let factor = factor.max(1);
        BoundingBox::new(
            self.x / factor,
            self.y / factor,
            self.width.div_ceil(factor),
            self.height.div_ceil(factor),
        )
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = (self.x + self.width).max(other.x + other.width);
        let max_y = (self.y + self.height).max(other.y + other.height);
        BoundingBox::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x={}, y={}, w={}, h={})", self.x, self.y, self.width, self.height)
    }
}

/// Encoding standard of a detected symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Symbology {
    Ean13,
    DataMatrix,
    /// Any other tag reported by a decoding engine
    Other(String),
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbology::Ean13 => write!(f, "EAN13"),
            Symbology::DataMatrix => write!(f, "DATAMATRIX"),
            Symbology::Other(tag) => write!(f, "{}", tag),
        }
    }
}

/// A symbol as reported by a decoding engine, before any validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedSymbol {
    pub payload: Vec<u8>,
    pub symbology: Symbology,
    pub bbox: BoundingBox,
}

impl DetectedSymbol {
    pub fn new(payload: impl Into<Vec<u8>>, symbology: Symbology, bbox: BoundingBox) -> Self {
        Self {
            payload: payload.into(),
            symbology,
            bbox,
        }
    }

    /// Payload as text, if it is valid UTF-8
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}

/// Validated output of one recognition call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecognitionResult {
    pub payload: String,
    pub symbology: Symbology,
    /// Name of the preprocessing strategy that produced the accepted read
    pub strategy: String,
    pub bbox: BoundingBox,
}

/// Why a single decode attempt did not produce a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accepted,
    /// The engine returned nothing
    NoSymbols,
    /// Symbols were found but none had the accepted symbology
    WrongType(Vec<Symbology>),
    /// The symbol failed format or checksum validation
    Invalid(String),
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accepted => write!(f, "accepted"),
            Verdict::NoSymbols => write!(f, "no symbol found"),
            Verdict::WrongType(found) => {
                let names: Vec<String> = found.iter().map(|s| s.to_string()).collect();
                write!(f, "found symbol but not the wanted type: {}", names.join(", "))
            }
            Verdict::Invalid(reason) => write!(f, "rejected ({})", reason),
        }
    }
}

/// Record of one strategy attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub strategy: String,
    pub verdict: Verdict,
}

/// Everything that was tried before giving up
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    pub attempts: Vec<Attempt>,
    /// The time budget ran out before every strategy was tried
    pub timed_out: bool,
}

/// Result of a recognition call that did not fail fatally
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Found(RecognitionResult),
    NotFound(Diagnosis),
}

impl Outcome {
    pub fn result(&self) -> Option<&RecognitionResult> {
        match self {
            Outcome::Found(result) => Some(result),
            Outcome::NotFound(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Outcome::Found(_))
    }
}

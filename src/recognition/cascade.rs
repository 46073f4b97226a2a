use image::DynamicImage;
use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::config::RecognitionConfig;
use crate::error::Result;
use crate::models::{Attempt, DetectedSymbol, RecognitionResult, Symbology, Verdict};
use crate::pipeline::{Decision, Pipeline};
use crate::recognition::decoder::SymbolDecoder;
use crate::recognition::{build_datamatrix_pipeline, load_image};

/// Shorter side below which a Data Matrix is likely too small to read
pub const MIN_RELIABLE_SIDE: u32 = 100;

/// Likely reason a Data Matrix could not be read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LikelyCause {
    LowResolution { width: u32, height: u32 },
    NoisyImage,
    MissingFinderPattern,
    /// Symbols of another symbology were found instead
    OtherSymbologies(Vec<Symbology>),
    /// The time budget ran out before the last stage
    TimedOut,
}

impl fmt::Display for LikelyCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LikelyCause::LowResolution { width, height } => write!(
                f,
                "Too low resolution ({}x{} px; needs {}+ px)",
                width, height, MIN_RELIABLE_SIDE
            ),
            LikelyCause::NoisyImage => write!(f, "Pixelated/noisy (no clear black/white squares)"),
            LikelyCause::MissingFinderPattern => write!(f, "Missing finder pattern (L-shaped border)"),
            LikelyCause::OtherSymbologies(found) => {
                let names: Vec<String> = found.iter().map(|s| s.to_string()).collect();
                write!(f, "Found other symbols instead: {}", names.join(", "))
            }
            LikelyCause::TimedOut => write!(f, "Ran out of time before all stages were tried"),
        }
    }
}

/// User-facing explanation of a cascade that found nothing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureDiagnosis {
    pub causes: Vec<LikelyCause>,
}

impl fmt::Display for FailureDiagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FAILED: No valid Data Matrix detected.")?;
        writeln!(f, "Likely causes:")?;
        for cause in &self.causes {
            writeln!(f, "  - {}", cause)?;
        }
        write!(f, "Try a clearer, larger image of the symbol.")
    }
}

/// Terminal state of the cascade
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CascadeOutcome {
    Decoded(RecognitionResult),
    Failed(FailureDiagnosis),
}

/// Every stage attempted, in order, plus how the cascade ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub stages: Vec<Attempt>,
    pub timed_out: bool,
    pub outcome: CascadeOutcome,
}

impl CascadeReport {
    pub fn result(&self) -> Option<&RecognitionResult> {
        match &self.outcome {
            CascadeOutcome::Decoded(result) => Some(result),
            CascadeOutcome::Failed(_) => None,
        }
    }
}

/// Data Matrix recognition escalating through direct decode, global
/// threshold and upscale-then-threshold, stopping at the first stage that
/// yields a Data Matrix symbol.
pub struct DataMatrixCascade<D> {
    decoder: D,
    pipeline: Pipeline,
}

impl<D: SymbolDecoder> DataMatrixCascade<D> {
    pub fn new(decoder: D) -> Self {
        Self::from_pipeline(decoder, build_datamatrix_pipeline(&RecognitionConfig::default()))
    }

    /// Invalid parameters are reported as [`RecognitionError::Config`](crate::error::RecognitionError::Config)
    pub fn with_config(decoder: D, config: &RecognitionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_pipeline(decoder, build_datamatrix_pipeline(config)))
    }

    pub fn from_pipeline(decoder: D, pipeline: Pipeline) -> Self {
        Self { decoder, pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn run_path<P: AsRef<Path>>(&self, path: P) -> Result<CascadeReport> {
        let image = load_image(path)?;
        self.run(&image)
    }

    pub fn run(&self, image: &DynamicImage) -> Result<CascadeReport> {
        let run = self
            .pipeline
            .first_accepted(image, &self.decoder, accept_datamatrix)?;

        let stages = run.diagnosis.attempts;
        let timed_out = run.diagnosis.timed_out;

        let outcome = match run.accepted {
            Some(accepted) => {
                let symbol = accepted.value;
                CascadeOutcome::Decoded(RecognitionResult {
                    payload: String::from_utf8_lossy(&symbol.payload).into_owned(),
                    symbology: Symbology::DataMatrix,
                    strategy: accepted.step,
                    bbox: symbol.bbox,
                })
            }
            None => CascadeOutcome::Failed(diagnose(image, &stages, timed_out)),
        };

        Ok(CascadeReport {
            stages,
            timed_out,
            outcome,
        })
    }
}

/// Acceptance policy: any Data Matrix symbol; everything else is reported
/// as found-but-wrong-type
fn accept_datamatrix(symbols: &[DetectedSymbol]) -> Decision<DetectedSymbol> {
    match symbols.iter().find(|s| s.symbology == Symbology::DataMatrix) {
        Some(symbol) => Decision::Accept(symbol.clone()),
        None => Decision::Reject(Verdict::WrongType(
            symbols.iter().map(|s| s.symbology.clone()).collect(),
        )),
    }
}

fn diagnose(image: &DynamicImage, stages: &[Attempt], timed_out: bool) -> FailureDiagnosis {
    let mut causes = Vec::new();

    let (width, height) = (image.width(), image.height());
    if width.min(height) < MIN_RELIABLE_SIDE {
        causes.push(LikelyCause::LowResolution { width, height });
    }
    causes.push(LikelyCause::NoisyImage);
    causes.push(LikelyCause::MissingFinderPattern);

    let mut others: Vec<Symbology> = Vec::new();
    for stage in stages {
        if let Verdict::WrongType(found) = &stage.verdict {
            for symbology in found {
                if !others.contains(symbology) {
                    others.push(symbology.clone());
                }
            }
        }
    }
    if !others.is_empty() {
        causes.push(LikelyCause::OtherSymbologies(others));
    }

    if timed_out {
        causes.push(LikelyCause::TimedOut);
    }

    FailureDiagnosis { causes }
}

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod recognition;

pub use config::{GlobalThreshold, RecognitionConfig};
pub use error::{ConfigError, RecognitionError};
pub use models::{
    Attempt, BoundingBox, DetectedSymbol, Diagnosis, Outcome, RecognitionResult, Symbology, Verdict,
};
pub use pipeline::{Decision, Pipeline, PipelineContext, PipelineRun, PipelineStep};
pub use recognition::annotate::{AnnotateToFile, ResultHook};
pub use recognition::cascade::{CascadeOutcome, CascadeReport, DataMatrixCascade, FailureDiagnosis, LikelyCause};
pub use recognition::checksum::{ean13_check_digit, verify_ean13};
pub use recognition::decoder::SymbolDecoder;
pub use recognition::ean13::Ean13Recognizer;
pub use recognition::scanline::ScanlineDecoder;
pub use recognition::{build_datamatrix_pipeline, build_ean13_pipeline, load_image};

#[cfg(feature = "rxing")]
pub use recognition::rxing_decoder::RxingDecoder;

/// Initializes the tracing subscriber for logging.
///
/// Filtering follows `RUST_LOG`; without it only errors are shown.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

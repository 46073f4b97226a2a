use image::DynamicImage;
use std::path::Path;

use crate::config::RecognitionConfig;
use crate::error::Result;
use crate::models::{BoundingBox, DetectedSymbol, Outcome, RecognitionResult, Symbology, Verdict};
use crate::pipeline::{Decision, Pipeline};
use crate::recognition::annotate::ResultHook;
use crate::recognition::checksum::verify_ean13;
use crate::recognition::decoder::SymbolDecoder;
use crate::recognition::{build_ean13_pipeline, load_image};

/// EAN-13 recognizer trying each preprocessing strategy in turn.
///
/// Only the first symbol the engine reports for a strategy is considered.
/// It is accepted if it is 13 digits with a valid check digit; otherwise
/// the next strategy is tried.
pub struct Ean13Recognizer<D> {
    decoder: D,
    pipeline: Pipeline,
    hook: Option<Box<dyn ResultHook>>,
}

impl<D: SymbolDecoder> Ean13Recognizer<D> {
    /// Recognizer with the default strategy parameters
    pub fn new(decoder: D) -> Self {
        Self::from_pipeline(decoder, build_ean13_pipeline(&RecognitionConfig::default()))
    }

    /// Invalid parameters are reported as [`RecognitionError::Config`](crate::error::RecognitionError::Config)
    pub fn with_config(decoder: D, config: &RecognitionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_pipeline(decoder, build_ean13_pipeline(config)))
    }

    /// Recognizer over a custom strategy pipeline
    pub fn from_pipeline(decoder: D, pipeline: Pipeline) -> Self {
        Self {
            decoder,
            pipeline,
            hook: None,
        }
    }

    /// Call `hook` with the source image after every successful recognition
    pub fn with_hook(mut self, hook: impl ResultHook + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Load `path` and recognize it.
    /// A missing or unreadable file is the only error this returns besides
    /// debug output failures.
    pub fn recognize_path<P: AsRef<Path>>(&mut self, path: P) -> Result<Outcome> {
        let image = load_image(path)?;
        self.recognize(&image)
    }

    pub fn recognize(&mut self, image: &DynamicImage) -> Result<Outcome> {
        let run = self
            .pipeline
            .first_accepted(image, &self.decoder, accept_ean13)?;

        let Some(accepted) = run.accepted else {
            return Ok(Outcome::NotFound(run.diagnosis));
        };

        let (payload, bbox) = accepted.value;
        let result = RecognitionResult {
            payload,
            symbology: Symbology::Ean13,
            strategy: accepted.step,
            bbox,
        };

        if let Some(hook) = self.hook.as_mut() {
            if let Err(e) = hook.on_success(image, &result) {
                tracing::error!("result hook failed: {:#}", e);
            }
        }

        Ok(Outcome::Found(result))
    }
}

/// Acceptance policy: first symbol, EAN-13, 13 characters, valid checksum
fn accept_ean13(symbols: &[DetectedSymbol]) -> Decision<(String, BoundingBox)> {
    let Some(symbol) = symbols.first() else {
        return Decision::Reject(Verdict::NoSymbols);
    };

    if symbol.symbology != Symbology::Ean13 {
        return Decision::Reject(Verdict::WrongType(vec![symbol.symbology.clone()]));
    }

    let Some(text) = symbol.text() else {
        return Decision::Reject(Verdict::Invalid("payload is not valid UTF-8".to_string()));
    };

    if text.len() != 13 {
        return Decision::Reject(Verdict::Invalid(format!(
            "expected 13 characters, got {}",
            text.len()
        )));
    }

    if !verify_ean13(text) {
        return Decision::Reject(Verdict::Invalid(format!("checksum mismatch in {}", text)));
    }

    Decision::Accept((text.to_string(), symbol.bbox))
}

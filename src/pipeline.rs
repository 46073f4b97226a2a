use image::DynamicImage;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{RecognitionError, Result};
use crate::models::{Attempt, DetectedSymbol, Diagnosis, Symbology, Verdict};
use crate::recognition::decoder::SymbolDecoder;

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
    /// Whether debug mode is enabled
    pub enabled: bool,
}

/// Context available to every pipeline run
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
    /// Checked before each attempt; remaining steps are abandoned once exceeded
    pub time_budget: Option<Duration>,
}

/// A named preprocessing strategy.
///
/// Every step reads the immutable source image and produces its own
/// processed image; steps never see each other's output.
pub trait PipelineStep: Send + Sync {
    /// Produce the processed image for one decode attempt
    fn apply(&self, source: &DynamicImage) -> DynamicImage;

    /// Name reported as provenance of an accepted result
    fn name(&self) -> &str;

    /// How much larger the processed image is than the source.
    /// Detected bounding boxes are divided by this to land in source
    /// coordinates.
    fn scale_factor(&self) -> u32 {
        1
    }
}

/// What an acceptance policy made of the symbols returned for one attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Decision<T> {
    Accept(T),
    Reject(Verdict),
}

/// The first accepted value together with the step that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Accepted<T> {
    pub step: String,
    pub value: T,
}

/// Result of running a pipeline to its first acceptance (or to exhaustion)
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun<T> {
    pub accepted: Option<Accepted<T>>,
    pub diagnosis: Diagnosis,
}

/// Ordered fallback over preprocessing strategies.
///
/// Steps run in the order they were added; the first one whose decoded
/// symbols pass the acceptance policy wins and the rest are skipped.
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    symbologies: Vec<Symbology>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline that accepts every symbology
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            symbologies: Vec::new(),
            context: PipelineContext::default(),
        }
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        let io_err = |source: std::io::Error| RecognitionError::DebugOutput {
            path: output_dir.clone(),
            source: image::ImageError::IoError(source),
        };

        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir).map_err(io_err)?;
            if entries.count() > 0 {
                return Err(RecognitionError::DebugDirNotEmpty(output_dir));
            }
        } else {
            std::fs::create_dir_all(&output_dir).map_err(io_err)?;
        }

        self.context.debug = Some(DebugConfig {
            output_dir,
            enabled: true,
        });

        Ok(self)
    }

    pub fn with_time_budget(mut self, budget: Option<Duration>) -> Self {
        self.context.time_budget = budget;
        self
    }

    /// Restrict the decoder to these symbologies (empty means all)
    pub fn accepting(mut self, symbologies: Vec<Symbology>) -> Self {
        self.symbologies = symbologies;
        self
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Helper method to add a step from a Box (for convenience)
    pub fn add_step_boxed(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    /// Step names in evaluation order
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// Run steps in order and return the first value `accept` takes.
    ///
    /// `accept` only sees non-empty symbol lists; an empty decode is
    /// recorded as [`Verdict::NoSymbols`] and the run moves on.
    pub fn first_accepted<T, D, F>(
        &self,
        source: &DynamicImage,
        decoder: &D,
        mut accept: F,
    ) -> Result<PipelineRun<T>>
    where
        D: SymbolDecoder + ?Sized,
        F: FnMut(&[DetectedSymbol]) -> Decision<T>,
    {
        let started = Instant::now();
        let mut diagnosis = Diagnosis::default();

        for (step_idx, step) in self.steps.iter().enumerate() {
            if let Some(budget) = self.context.time_budget {
                if started.elapsed() >= budget {
                    tracing::warn!(
                        remaining = self.steps.len() - step_idx,
                        "time budget exhausted, abandoning remaining strategies"
                    );
                    diagnosis.timed_out = true;
                    break;
                }
            }

            let step_name = step.name();
            if self.context.verbose {
                println!("Running step: {}", step_name);
            }

            let processed = step.apply(source);
            self.save_debug_output(step_idx, step_name, &processed)?;

            let mut symbols = decoder.decode(&processed, &self.symbologies);
            let scale = step.scale_factor();
            if scale > 1 {
                for symbol in &mut symbols {
                    symbol.bbox = symbol.bbox.downscale(scale);
                }
            }
            tracing::debug!(strategy = step_name, found = symbols.len(), "decode attempt");

            let verdict = if symbols.is_empty() {
                Verdict::NoSymbols
            } else {
                match accept(&symbols) {
                    Decision::Accept(value) => {
                        tracing::info!(strategy = step_name, "accepted");
                        if self.context.verbose {
                            println!("  → accepted");
                        }
                        diagnosis.attempts.push(Attempt {
                            strategy: step_name.to_string(),
                            verdict: Verdict::Accepted,
                        });
                        return Ok(PipelineRun {
                            accepted: Some(Accepted {
                                step: step_name.to_string(),
                                value,
                            }),
                            diagnosis,
                        });
                    }
                    Decision::Reject(verdict) => verdict,
                }
            };

            if self.context.verbose {
                println!("  → {}", verdict);
            }
            diagnosis.attempts.push(Attempt {
                strategy: step_name.to_string(),
                verdict,
            });
        }

        Ok(PipelineRun {
            accepted: None,
            diagnosis,
        })
    }

    /// Save a processed image if debug mode is enabled
    fn save_debug_output(&self, step_idx: usize, step_name: &str, image: &DynamicImage) -> Result<()> {
        let Some(debug_config) = &self.context.debug else {
            return Ok(());
        };
        if !debug_config.enabled {
            return Ok(());
        }

        let filename = format!("{:02}_{}.png", step_idx + 1,
            step_name.to_lowercase().replace(' ', "_"));
        let output_path = debug_config.output_dir.join(&filename);

        image.save(&output_path).map_err(|source| RecognitionError::DebugOutput {
            path: output_path.clone(),
            source,
        })?;

        if self.context.verbose {
            println!("  Debug: saved {}", filename);
        }

        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

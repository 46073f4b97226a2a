use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use symscan::pipeline::Pipeline;
use symscan::{
    build_datamatrix_pipeline, build_ean13_pipeline, AnnotateToFile, CascadeOutcome,
    DataMatrixCascade, Ean13Recognizer, Outcome, RecognitionConfig,
};

#[derive(Parser)]
#[command(name = "symscan")]
#[command(about = "Recognize EAN-13 barcodes and Data Matrix codes in images")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file overriding strategy parameters
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Save every processed image to directory (must be empty)
    #[arg(long, value_name = "DIR", global = true)]
    debug_out: Option<PathBuf>,

    /// Print the outcome as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Read an EAN-13 barcode, trying several preprocessing strategies
    Ean13 {
        /// Path to input image file
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// Save a copy of the image with the barcode outlined
        #[arg(long, value_name = "FILE")]
        annotate_out: Option<PathBuf>,

        /// Font file used to write the payload on the annotated image
        #[arg(long, value_name = "FILE", requires = "annotate_out")]
        label_font: Option<PathBuf>,
    },
    /// Read a Data Matrix code (direct, then threshold, then upscale)
    Datamatrix {
        /// Path to input image file
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,
    },
}

#[cfg(feature = "rxing")]
fn engine() -> symscan::RxingDecoder {
    symscan::RxingDecoder
}

#[cfg(not(feature = "rxing"))]
fn engine() -> symscan::ScanlineDecoder {
    symscan::ScanlineDecoder::new()
}

fn main() -> anyhow::Result<ExitCode> {
    symscan::init_tracing();
    let args = Cli::parse();

    let config = match &args.config {
        Some(path) => RecognitionConfig::from_json_file(path)?,
        None => RecognitionConfig::default(),
    };

    match &args.command {
        Command::Ean13 { image_path, annotate_out, label_font } => {
            let pipeline = configure(build_ean13_pipeline(&config), &args)?;
            let mut recognizer = Ean13Recognizer::from_pipeline(engine(), pipeline);
            if let Some(path) = annotate_out {
                let mut hook = AnnotateToFile::new(path.clone());
                if let Some(font) = label_font {
                    hook = hook.with_label_font(font)?;
                }
                recognizer = recognizer.with_hook(hook);
            }

            if args.verbose {
                println!("Loading image: {:?}", image_path);
            }
            let outcome = recognizer.recognize_path(image_path)?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_ean13(&outcome, args.verbose);
            }

            Ok(exit_code(outcome.is_found()))
        }
        Command::Datamatrix { image_path } => {
            let pipeline = configure(build_datamatrix_pipeline(&config), &args)?;
            let cascade = DataMatrixCascade::from_pipeline(engine(), pipeline);

            if !cfg!(feature = "rxing") && args.verbose {
                println!("Note: built without the `rxing` feature, only EAN-13 can be detected");
            }

            if !args.json {
                println!("Loading image...");
            }
            let report = cascade.run_path(image_path)?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for (idx, stage) in report.stages.iter().enumerate() {
                    println!("Stage {} ({}): {}", idx + 1, stage.strategy, stage.verdict);
                }
                match &report.outcome {
                    CascadeOutcome::Decoded(result) => {
                        println!("SUCCESS (stage {})! Decoded Data Matrix: {}", result.strategy, result.payload);
                        println!("Type: {}", result.symbology);
                        println!("Rect: {}", result.bbox);
                    }
                    CascadeOutcome::Failed(diagnosis) => println!("{}", diagnosis),
                }
            }

            Ok(exit_code(report.result().is_some()))
        }
    }
}

/// Apply the global CLI flags to a pipeline
fn configure(pipeline: Pipeline, args: &Cli) -> anyhow::Result<Pipeline> {
    let mut pipeline = pipeline.with_verbose(args.verbose);
    if let Some(debug_dir) = &args.debug_out {
        pipeline = pipeline.with_debug(debug_dir.clone())?;
    }
    Ok(pipeline)
}

fn print_ean13(outcome: &Outcome, verbose: bool) {
    match outcome {
        Outcome::Found(result) => {
            println!("Correct EAN-13: {} (strategy: {})", result.payload, result.strategy);
            if verbose {
                println!("Rect: {}", result.bbox);
            }
        }
        Outcome::NotFound(diagnosis) => {
            println!("Failed to decode reliably.");
            if verbose {
                for attempt in &diagnosis.attempts {
                    println!("  {}: {}", attempt.strategy, attempt.verdict);
                }
                if diagnosis.timed_out {
                    println!("  (time budget exhausted)");
                }
            }
        }
    }
}

fn exit_code(found: bool) -> ExitCode {
    if found { ExitCode::SUCCESS } else { ExitCode::from(1) }
}

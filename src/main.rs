// SPDX-License-Identifier: MPL-2.0
//! Command-line front end.
//!
//! This binary is the caller-facing validation boundary: input existence
//! and extension, effect name, and adjustment bounds are all rejected here,
//! before the core pipeline is invoked.

use framefx::effect::Effect;
use framefx::error::{Error, Result};
use framefx::landmarks::{self, FaceMeshConfig, FaceMeshDetector};
use framefx::media::extensions;
use framefx::processor::FrameProcessor;
use framefx::{adjust, config, pipeline};
use std::path::PathBuf;

const HELP: &str = "\
framefx - per-frame visual effects pipeline

USAGE:
    framefx [OPTIONS] <INPUT> <OUTPUT>

ARGS:
    <INPUT>     Input file (.png .jpg .jpeg .mp4 .avi .mov)
    <OUTPUT>    Output video path (always MP4-muxed)

OPTIONS:
    --effect <NAME>        Effect to apply: original, grayscale, edge, blur,
                           face_mesh [default: original]
    --brightness <N>       Brightness offset, -100 to 100 [default: 0]
    --contrast <X>         Contrast multiplier, 0.0 to 3.0 [default: 1.0]
    --model <PATH>         Face-mesh ONNX model (face_mesh effect only)
    -h, --help             Print help
";

struct Args {
    input: PathBuf,
    output: PathBuf,
    effect: Effect,
    brightness: i32,
    contrast: f32,
    model: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => return,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Parses and validates the command line. Returns `Ok(None)` when help was
/// requested.
fn parse_args() -> Result<Option<Args>> {
    let mut args = pico_args::Arguments::from_env();

    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(None);
    }

    let effect_name: String = args
        .opt_value_from_str("--effect")
        .map_err(|e| Error::InvalidParameter(e.to_string()))?
        .unwrap_or_else(|| "original".to_string());
    let brightness: i32 = args
        .opt_value_from_str("--brightness")
        .map_err(|e| Error::InvalidParameter(e.to_string()))?
        .unwrap_or(0);
    let contrast: f32 = args
        .opt_value_from_str("--contrast")
        .map_err(|e| Error::InvalidParameter(e.to_string()))?
        .unwrap_or(1.0);
    let model: Option<PathBuf> = args
        .opt_value_from_str("--model")
        .map_err(|e| Error::InvalidParameter(e.to_string()))?;

    let mut rest = args.finish().into_iter();
    let input = rest
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| Error::InvalidParameter("missing <INPUT> argument".to_string()))?;
    let output = rest
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| Error::InvalidParameter("missing <OUTPUT> argument".to_string()))?;
    if let Some(extra) = rest.next() {
        return Err(Error::InvalidParameter(format!(
            "unexpected argument: {}",
            extra.to_string_lossy()
        )));
    }

    // Boundary validation: everything below must fail before the core runs.
    if !input.exists() {
        return Err(Error::Io(format!(
            "input file {} does not exist",
            input.display()
        )));
    }
    if !extensions::is_allowed(&input) {
        return Err(Error::InvalidParameter(format!(
            "unsupported input type {}; supported: .png .jpg .jpeg .mp4 .avi .mov",
            input.display()
        )));
    }
    let effect = Effect::parse(&effect_name)?;
    adjust::validate(brightness, contrast)?;

    Ok(Some(Args {
        input,
        output,
        effect,
        brightness,
        contrast,
        model,
    }))
}

fn run(args: Args) -> Result<()> {
    let model_path = match args.model {
        Some(path) => path,
        None => {
            let config = config::load().unwrap_or_default();
            config
                .model_path
                .unwrap_or_else(landmarks::default_model_path)
        }
    };

    let mut processor = FrameProcessor::new(FaceMeshDetector::new(
        model_path,
        FaceMeshConfig::default(),
    ));

    // The face-mesh model is loaded once, before the run; other effects
    // never touch it.
    if args.effect == Effect::FaceMesh {
        processor.detector_mut().load()?;
    }

    let result = pipeline::run(
        &mut processor,
        &args.input,
        &args.output,
        args.effect,
        args.brightness,
        args.contrast,
    );

    if let Err(e) = processor.release() {
        log::warn!("detector release reported: {e}");
    }

    let summary = result?;
    println!(
        "Wrote {} ({} frames)",
        args.output.display(),
        summary.frames_written
    );
    Ok(())
}

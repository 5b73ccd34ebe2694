// SPDX-License-Identifier: MPL-2.0
//! The media pipeline: input classification, per-frame processing, MP4
//! synthesis.
//!
//! [`run`] is the single entry point shared by every front end. It owns the
//! decode and encode lifetimes, calls the frame processor once per output
//! frame, and always emits an MP4-muxed MPEG-4 video:
//!
//! - Still images become a 3-second clip (the processed frame replicated 90
//!   times at 30 fps).
//! - Videos are streamed frame by frame at the source's integer frame rate.
//!
//! One pipeline run is strictly single-threaded and blocking. Runs abort on
//! the first failure; a partially written output is not guaranteed valid.

use crate::config::defaults::{STILL_IMAGE_FPS, STILL_IMAGE_FRAME_COUNT};
use crate::effect::Effect;
use crate::error::{Error, Result};
use crate::media::{self, MediaType, VideoReader, VideoWriter};
use crate::processor::FrameProcessor;
use std::path::Path;

/// Geometry and timing governing one pipeline run, computed once at start.
///
/// Still images synthesize the fixed clip rate and length.
#[derive(Debug, Clone, Copy)]
pub struct MediaDescriptor {
    pub kind: MediaType,
    pub width: u32,
    pub height: u32,
    pub fps: i32,
    pub frame_count: i64,
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// How the input was classified.
    pub kind: MediaType,
    /// Frames written to the output container.
    pub frames_written: u64,
}

/// Renders `input` to an MP4 file at `output`, applying the adjustment and
/// the selected effect to every frame.
///
/// The caller is the validation boundary: effect names and adjustment
/// bounds are checked before this function, and an unsupported input
/// extension reaching it is reported as a decode failure.
///
/// # Errors
/// - [`Error::Decode`] if the input cannot be classified, opened, or
///   decoded.
/// - [`Error::Encode`] if the output cannot be created or written.
/// - [`Error::Inference`] if the face-mesh effect runs without a usable
///   model.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    processor: &mut FrameProcessor,
    input: P,
    output: Q,
    effect: Effect,
    brightness: i32,
    contrast: f32,
) -> Result<RunSummary> {
    let input = input.as_ref();
    let output = output.as_ref();

    log::info!(
        "processing {} -> {} (effect: {effect}, brightness: {brightness}, contrast: {contrast})",
        input.display(),
        output.display()
    );

    let kind = media::detect_media_type(input).ok_or_else(|| {
        Error::Decode(format!(
            "unsupported input extension: {}",
            input.display()
        ))
    })?;

    let summary = match kind {
        MediaType::Image => run_image(processor, input, output, effect, brightness, contrast)?,
        MediaType::Video => run_video(processor, input, output, effect, brightness, contrast)?,
    };

    log::info!(
        "finished {}: {} frames written",
        output.display(),
        summary.frames_written
    );
    Ok(summary)
}

/// Image branch: decode one frame, process it once, replicate it for the
/// fixed clip duration.
fn run_image(
    processor: &mut FrameProcessor,
    input: &Path,
    output: &Path,
    effect: Effect,
    brightness: i32,
    contrast: f32,
) -> Result<RunSummary> {
    let frame = media::load_image(input)?;
    let (width, height) = frame.dimensions();

    let descriptor = MediaDescriptor {
        kind: MediaType::Image,
        width,
        height,
        fps: STILL_IMAGE_FPS,
        frame_count: STILL_IMAGE_FRAME_COUNT as i64,
    };
    log::debug!("input descriptor: {descriptor:?}");

    let processed = processor.process(&frame, effect, brightness, contrast)?;

    let mut writer = VideoWriter::create(output, width, height, STILL_IMAGE_FPS)?;
    for _ in 0..STILL_IMAGE_FRAME_COUNT {
        writer.write_frame(&processed)?;
    }
    let frames_written = writer.frames_written();
    finish_writer(writer)?;

    Ok(RunSummary {
        kind: MediaType::Image,
        frames_written,
    })
}

/// Video branch: stream frames through the processor at the source's
/// integer frame rate until end-of-stream.
fn run_video(
    processor: &mut FrameProcessor,
    input: &Path,
    output: &Path,
    effect: Effect,
    brightness: i32,
    contrast: f32,
) -> Result<RunSummary> {
    let mut reader = VideoReader::open(input)?;
    let info = reader.info();

    let descriptor = MediaDescriptor {
        kind: MediaType::Video,
        width: info.width,
        height: info.height,
        fps: info.fps,
        frame_count: info.frame_count,
    };
    log::debug!("input descriptor: {descriptor:?}");

    let mut writer = VideoWriter::create(output, info.width, info.height, info.fps)?;

    // A source that yields fewer frames than the container reported (or
    // none at all) still ends the run normally.
    while let Some(frame) = reader.read_frame()? {
        let processed = processor.process(&frame, effect, brightness, contrast)?;
        writer.write_frame(&processed)?;
    }

    let frames_written = writer.frames_written();
    finish_writer(writer)?;

    Ok(RunSummary {
        kind: MediaType::Video,
        frames_written,
    })
}

/// Closes the output container. A release failure after all frames were
/// written is logged and does not fail the run.
fn finish_writer(writer: VideoWriter) -> Result<()> {
    match writer.finish() {
        Ok(()) => Ok(()),
        Err(Error::ResourceRelease(msg)) => {
            log::warn!("output close reported: {msg}");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

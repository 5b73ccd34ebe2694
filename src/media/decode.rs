// SPDX-License-Identifier: MPL-2.0
//! `FFmpeg`-based video decoding.
//!
//! [`VideoReader`] provides a synchronous, frame-by-frame decode interface:
//! open a container, read source geometry and timing, then pull RGB frames
//! until end-of-stream. It maintains internal decoder state; create separate
//! instances for independent runs.

use crate::config::defaults::FALLBACK_VIDEO_FPS;
use crate::error::{Error, Result};
use image_rs::RgbImage;
use std::path::Path;
use std::sync::Once;

/// Static flag to ensure FFmpeg is initialized only once.
static FFMPEG_INIT: Once = Once::new();

/// Initialize FFmpeg with appropriate log level.
///
/// This function is safe to call multiple times - initialization will only
/// happen once thanks to `std::sync::Once`. It sets the FFmpeg log level
/// to ERROR to suppress noisy container warnings.
pub fn init_ffmpeg() -> Result<()> {
    let mut init_result: Result<()> = Ok(());

    FFMPEG_INIT.call_once(|| {
        if let Err(e) = ffmpeg_next::init() {
            init_result = Err(Error::Io(format!("FFmpeg initialization failed: {e}")));
            return;
        }

        // SAFETY: av_log_set_level is thread-safe and only affects logging
        unsafe {
            ffmpeg_next::ffi::av_log_set_level(ffmpeg_next::ffi::AV_LOG_ERROR);
        }
    });

    init_result
}

/// Geometry and timing metadata read from a source video.
///
/// Computed once when the reader opens and immutable for the run.
#[derive(Debug, Clone, Copy)]
pub struct SourceInfo {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second, truncated to an integer. Fractional source rates
    /// lose their fraction (29.97 becomes 29); downstream consumers depend
    /// on the exact integer rate.
    pub fps: i32,
    /// Frame count reported by the container. May be 0 for streams that do
    /// not declare one; the read loop stops on end-of-stream regardless.
    pub frame_count: i64,
}

/// Synchronous video reader that decodes frames to RGB.
pub struct VideoReader {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    info: SourceInfo,
    eof_sent: bool,
}

impl VideoReader {
    /// Opens a video file and prepares a decoder for its best video stream.
    ///
    /// # Errors
    /// Returns [`Error::Decode`] if the container cannot be opened, holds no
    /// video stream, or reports invalid geometry.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        init_ffmpeg()?;

        let path_ref = path.as_ref();
        let ictx = ffmpeg_next::format::input(&path_ref)
            .map_err(|e| Error::Decode(format!("could not open video {}: {e}", path_ref.display())))?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| Error::Decode("no video stream found".to_string()))?;
        let stream_index = stream.index();
        let frame_count = stream.frames();

        // Truncate the average frame rate to an integer; degenerate rates
        // fall back to the default.
        let rate = stream.avg_frame_rate();
        let fps = if rate.denominator() != 0 {
            let value = f64::from(rate.numerator()) / f64::from(rate.denominator());
            if value >= 1.0 {
                value as i32
            } else {
                FALLBACK_VIDEO_FPS
            }
        } else {
            FALLBACK_VIDEO_FPS
        };

        let context_decoder =
            ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
                .map_err(|e| Error::Decode(format!("failed to create codec context: {e}")))?;
        let decoder = context_decoder
            .decoder()
            .video()
            .map_err(|e| Error::Decode(format!("failed to create video decoder: {e}")))?;

        let width = decoder.width();
        let height = decoder.height();
        if width == 0 || height == 0 {
            return Err(Error::Decode(format!(
                "invalid video dimensions: {width}x{height}"
            )));
        }

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .map_err(|e| Error::Decode(format!("failed to create scaler: {e}")))?;

        Ok(Self {
            ictx,
            decoder,
            scaler,
            stream_index,
            info: SourceInfo {
                width,
                height,
                fps,
                frame_count,
            },
            eof_sent: false,
        })
    }

    /// Source metadata computed at open time.
    #[must_use]
    pub fn info(&self) -> SourceInfo {
        self.info
    }

    /// Decodes the next frame, or returns `Ok(None)` at end-of-stream.
    ///
    /// Exhausting the container is a normal outcome even when fewer frames
    /// were read than the container reported. A decoder-reported error is
    /// fatal and surfaces as [`Error::Decode`].
    pub fn read_frame(&mut self) -> Result<Option<RgbImage>> {
        let mut decoded = ffmpeg_next::frame::Video::empty();

        loop {
            // Drain any buffered frame first.
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                return self.convert_frame(&decoded).map(Some);
            }

            if self.eof_sent {
                return Ok(None);
            }

            // Pull the next packet belonging to our stream; the packet owns
            // its data, so the iterator borrow ends here.
            let stream_index = self.stream_index;
            let next_packet = self
                .ictx
                .packets()
                .find(|(stream, _)| stream.index() == stream_index)
                .map(|(_, packet)| packet);

            match next_packet {
                Some(packet) => {
                    self.decoder
                        .send_packet(&packet)
                        .map_err(|e| Error::Decode(format!("packet send failed: {e}")))?;
                }
                None => {
                    // End of container: flush the decoder before reporting
                    // end-of-stream.
                    self.decoder
                        .send_eof()
                        .map_err(|e| Error::Decode(format!("decoder flush failed: {e}")))?;
                    self.eof_sent = true;
                }
            }
        }
    }

    /// Scales a decoded frame to RGB24 and copies it out row by row,
    /// dropping any stride padding.
    fn convert_frame(&mut self, decoded: &ffmpeg_next::frame::Video) -> Result<RgbImage> {
        let mut rgb_frame = ffmpeg_next::frame::Video::empty();
        self.scaler
            .run(decoded, &mut rgb_frame)
            .map_err(|e| Error::Decode(format!("scaling failed: {e}")))?;

        let width = rgb_frame.width();
        let height = rgb_frame.height();
        let data = rgb_frame.data(0);
        let stride = rgb_frame.stride(0);

        let row_len = (width * 3) as usize;
        let mut rgb_bytes = Vec::with_capacity(row_len * height as usize);
        for y in 0..height as usize {
            let row_start = y * stride;
            rgb_bytes.extend_from_slice(&data[row_start..row_start + row_len]);
        }

        RgbImage::from_raw(width, height, rgb_bytes)
            .ok_or_else(|| Error::Decode("decoded frame has unexpected size".to_string()))
    }
}

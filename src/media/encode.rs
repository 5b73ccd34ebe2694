// SPDX-License-Identifier: MPL-2.0
//! `FFmpeg`-based MP4 video encoding.
//!
//! [`VideoWriter`] writes RGB frames into an MP4 container with the MPEG-4
//! video codec (the `mp4v` four-character tag), regardless of the output
//! path's extension. Frames are written monotonically with sequential
//! timestamps and are never rewritten once flushed.

use crate::error::{Error, Result};
use image_rs::RgbImage;
use std::path::Path;

use super::decode::init_ffmpeg;

/// Synchronous MP4 writer encoding frames at a fixed size and rate.
///
/// The writer must be closed with [`VideoWriter::finish`]; dropping it
/// without finishing leaves the container without a trailer.
pub struct VideoWriter {
    octx: ffmpeg_next::format::context::Output,
    encoder: ffmpeg_next::encoder::video::Encoder,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    enc_time_base: ffmpeg_next::Rational,
    width: u32,
    height: u32,
    frame_index: i64,
}

impl VideoWriter {
    /// Creates an MP4 container at `path` with a single MPEG-4 video stream.
    ///
    /// # Errors
    /// Returns [`Error::Encode`] if the container cannot be created, the
    /// encoder is unavailable, or the header cannot be written.
    pub fn create<P: AsRef<Path>>(path: P, width: u32, height: u32, fps: i32) -> Result<Self> {
        init_ffmpeg()?;

        if width == 0 || height == 0 {
            return Err(Error::Encode(format!(
                "invalid output dimensions: {width}x{height}"
            )));
        }
        if fps <= 0 {
            return Err(Error::Encode(format!("invalid output frame rate: {fps}")));
        }

        let path_ref = path.as_ref();
        // Output is always MP4-muxed; the caller's extension does not change
        // the container format.
        let mut octx = ffmpeg_next::format::output_as(&path_ref, "mp4").map_err(|e| {
            Error::Encode(format!(
                "could not create output {}: {e}",
                path_ref.display()
            ))
        })?;

        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4)
            .ok_or_else(|| Error::Encode("MPEG-4 encoder not available".to_string()))?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let mut stream = octx
            .add_stream(codec)
            .map_err(|e| Error::Encode(format!("failed to add video stream: {e}")))?;
        let stream_index = stream.index();

        let mut encoder = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .map_err(|e| Error::Encode(format!("failed to create encoder context: {e}")))?;

        let enc_time_base = ffmpeg_next::Rational::new(1, fps);
        encoder.set_width(width);
        encoder.set_height(height);
        encoder.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder.set_time_base(enc_time_base);
        encoder.set_frame_rate(Some(ffmpeg_next::Rational::new(fps, 1)));
        if global_header {
            encoder.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder
            .open_as(codec)
            .map_err(|e| Error::Encode(format!("failed to open MPEG-4 encoder: {e}")))?;
        stream.set_parameters(&encoder);

        octx.write_header()
            .map_err(|e| Error::Encode(format!("failed to write container header: {e}")))?;

        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::format::Pixel::YUV420P,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .map_err(|e| Error::Encode(format!("failed to create encoder scaler: {e}")))?;

        Ok(Self {
            octx,
            encoder,
            scaler,
            stream_index,
            enc_time_base,
            width,
            height,
            frame_index: 0,
        })
    }

    /// Output frame width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Output frame height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of frames submitted so far.
    #[must_use]
    pub fn frames_written(&self) -> u64 {
        self.frame_index as u64
    }

    /// Encodes one RGB frame at the next sequential timestamp.
    ///
    /// # Errors
    /// Returns [`Error::Encode`] if the frame geometry does not match the
    /// writer or the encoder rejects the frame.
    pub fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        let (fw, fh) = frame.dimensions();
        if fw != self.width || fh != self.height {
            return Err(Error::Encode(format!(
                "frame size {fw}x{fh} does not match output {}x{}",
                self.width, self.height
            )));
        }

        // Copy the RGB pixels into an FFmpeg frame, honoring its row stride.
        let mut src = ffmpeg_next::frame::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            self.width,
            self.height,
        );
        let stride = src.stride(0);
        let row_len = (self.width * 3) as usize;
        let pixels = frame.as_raw();
        let data = src.data_mut(0);
        for y in 0..self.height as usize {
            let dst_start = y * stride;
            let src_start = y * row_len;
            data[dst_start..dst_start + row_len]
                .copy_from_slice(&pixels[src_start..src_start + row_len]);
        }

        let mut yuv = ffmpeg_next::frame::Video::empty();
        self.scaler
            .run(&src, &mut yuv)
            .map_err(|e| Error::Encode(format!("pixel format conversion failed: {e}")))?;
        yuv.set_pts(Some(self.frame_index));

        self.encoder
            .send_frame(&yuv)
            .map_err(|e| Error::Encode(format!("encoder rejected frame: {e}")))?;
        self.frame_index += 1;

        self.drain_packets()
    }

    /// Flushes the encoder and closes the container.
    ///
    /// A writer finished with zero frames still produces a valid,
    /// header-only file.
    ///
    /// # Errors
    /// Returns [`Error::Encode`] if flushing the encoder fails, or
    /// [`Error::ResourceRelease`] if only the trailer write fails.
    pub fn finish(mut self) -> Result<()> {
        self.encoder
            .send_eof()
            .map_err(|e| Error::Encode(format!("encoder flush failed: {e}")))?;
        self.drain_packets()?;

        self.octx
            .write_trailer()
            .map_err(|e| Error::ResourceRelease(format!("failed to write trailer: {e}")))?;
        Ok(())
    }

    /// Writes every packet the encoder currently has, rescaled into the
    /// output stream's time base and interleaved into the container.
    fn drain_packets(&mut self) -> Result<()> {
        let mut packet = ffmpeg_next::Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.stream_index);
            let ost_time_base = self
                .octx
                .stream(self.stream_index)
                .ok_or_else(|| Error::Encode("output stream disappeared".to_string()))?
                .time_base();
            packet.rescale_ts(self.enc_time_base, ost_time_base);
            packet
                .write_interleaved(&mut self.octx)
                .map_err(|e| Error::Encode(format!("packet write failed: {e}")))?;
        }
        Ok(())
    }
}

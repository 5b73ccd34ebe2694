// SPDX-License-Identifier: MPL-2.0
//! The closed set of per-frame visual effects and their pure transforms.
//!
//! Effect names form a case-sensitive string surface (`original`,
//! `grayscale`, `edge`, `blur`, `face_mesh`); anything else is rejected at
//! parse time. The set is fixed at compile time and dispatched by `match`
//! in the frame processor, never through a mutable registry.

use crate::config::defaults::{
    BLUR_KERNEL_SIZE, EDGE_HIGH_THRESHOLD, EDGE_LOW_THRESHOLD,
};
use crate::error::{Error, Result};
use image_rs::{GrayImage, Rgb, RgbImage};
use std::fmt;
use std::str::FromStr;

/// A named, deterministic per-frame visual transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Identity passthrough.
    Original,
    /// Luma conversion, rendered back as three equal channels.
    Grayscale,
    /// Canny edge detection with fixed thresholds; single-channel output.
    Edge,
    /// Gaussian smoothing with a fixed kernel.
    Blur,
    /// Facial-landmark dot overlay.
    FaceMesh,
}

impl Effect {
    /// Every effect, in wire-name order. Front ends use this to enumerate
    /// the selectable effects.
    pub const ALL: &'static [Effect] = &[
        Effect::Original,
        Effect::Grayscale,
        Effect::Edge,
        Effect::Blur,
        Effect::FaceMesh,
    ];

    /// The effect's wire name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Effect::Original => "original",
            Effect::Grayscale => "grayscale",
            Effect::Edge => "edge",
            Effect::Blur => "blur",
            Effect::FaceMesh => "face_mesh",
        }
    }

    /// Parses a wire name. Matching is case-sensitive and exact.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedEffect`] for any name outside the set.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "original" => Ok(Effect::Original),
            "grayscale" => Ok(Effect::Grayscale),
            "edge" => Ok(Effect::Edge),
            "blur" => Ok(Effect::Blur),
            "face_mesh" => Ok(Effect::FaceMesh),
            other => Err(Error::UnsupportedEffect(other.to_string())),
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Effect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Effect::parse(s)
    }
}

/// Output of a transform, tagged by channel shape. `Mono` outputs are
/// broadcast to three channels by the frame processor before encoding.
#[derive(Debug, Clone)]
pub enum EffectOutput {
    Color(RgbImage),
    Mono(GrayImage),
}

/// Converts to luma and back, producing a visually gray three-channel frame.
#[must_use]
pub fn grayscale(frame: &RgbImage) -> RgbImage {
    let luma = image_rs::imageops::grayscale(frame);
    mono_to_rgb(&luma)
}

/// Canny edge detection on the frame's luma. Single-channel output with
/// edges at 255 and background at 0.
#[must_use]
pub fn edge(frame: &RgbImage) -> GrayImage {
    let luma = image_rs::imageops::grayscale(frame);
    imageproc::edges::canny(&luma, EDGE_LOW_THRESHOLD, EDGE_HIGH_THRESHOLD)
}

/// Gaussian smoothing with the sigma the auto rule assigns to the fixed
/// kernel size: `0.3 * ((k - 1) * 0.5 - 1) + 0.8`.
#[must_use]
pub fn blur(frame: &RgbImage) -> RgbImage {
    let k = BLUR_KERNEL_SIZE as f32;
    let sigma = 0.3 * ((k - 1.0) * 0.5 - 1.0) + 0.8;
    imageproc::filter::gaussian_blur_f32(frame, sigma)
}

/// Broadcasts a single-channel frame to three identical channels.
#[must_use]
pub fn mono_to_rgb(mono: &GrayImage) -> RgbImage {
    RgbImage::from_fn(mono.width(), mono.height(), |x, y| {
        let l = mono.get_pixel(x, y).0[0];
        Rgb([l, l, l])
    })
}

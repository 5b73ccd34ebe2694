// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all pipeline constants.
//!
//! This module serves as the single source of truth for fixed values used
//! across the crate. Constants are organized by category.
//!
//! # Categories
//!
//! - **Adjustment**: brightness/contrast bounds
//! - **Still images**: synthesized frame rate and clip length
//! - **Effects**: edge thresholds, blur kernel, landmark overlay
//! - **Landmark detection**: model geometry and confidence thresholds

// ==========================================================================
// Adjustment Bounds
// ==========================================================================

/// Minimum accepted brightness offset.
pub const MIN_BRIGHTNESS: i32 = -100;

/// Maximum accepted brightness offset.
pub const MAX_BRIGHTNESS: i32 = 100;

/// Minimum accepted contrast multiplier.
pub const MIN_CONTRAST: f32 = 0.0;

/// Maximum accepted contrast multiplier.
pub const MAX_CONTRAST: f32 = 3.0;

// ==========================================================================
// Still-Image Synthesis
// ==========================================================================

/// Frame rate assigned to outputs synthesized from a single still image.
pub const STILL_IMAGE_FPS: i32 = 30;

/// Number of times the processed still frame is replicated (3 seconds at
/// [`STILL_IMAGE_FPS`]). Fixed, not configurable.
pub const STILL_IMAGE_FRAME_COUNT: u64 = 90;

/// Fallback frame rate when a source video reports a degenerate rate.
pub const FALLBACK_VIDEO_FPS: i32 = 30;

// ==========================================================================
// Effect Parameters
// ==========================================================================

/// Lower hysteresis threshold for Canny edge detection.
pub const EDGE_LOW_THRESHOLD: f32 = 100.0;

/// Upper hysteresis threshold for Canny edge detection.
pub const EDGE_HIGH_THRESHOLD: f32 = 200.0;

/// Side length of the square Gaussian blur kernel.
pub const BLUR_KERNEL_SIZE: u32 = 15;

/// Color of the filled dots drawn at each detected landmark (RGB green).
pub const LANDMARK_COLOR: [u8; 3] = [0, 255, 0];

/// Radius in pixels of each landmark dot.
pub const LANDMARK_RADIUS: i32 = 1;

// ==========================================================================
// Landmark Detection
// ==========================================================================

/// Square input resolution expected by the face-mesh model.
pub const FACE_MESH_INPUT_SIZE: u32 = 192;

/// Maximum number of faces returned per frame.
pub const MAX_FACES: usize = 1;

/// Minimum face score for a fresh detection to be accepted.
pub const MIN_DETECTION_CONFIDENCE: f32 = 0.5;

/// Minimum face score to keep tracking a face seen on the previous frame.
pub const MIN_TRACKING_CONFIDENCE: f32 = 0.5;

/// Filename of the face-mesh model inside the application data directory.
pub const FACE_MESH_MODEL_FILENAME: &str = "face_mesh.onnx";

// SPDX-License-Identifier: MPL-2.0
//! Unified media handling for image and video inputs.
//!
//! Input classification is by file extension alone; no magic-byte sniffing
//! is performed. The extension tables are the system's input allow-list.

pub mod decode;
pub mod encode;
pub mod image;

use std::path::Path;

// Re-export commonly used types
pub use decode::{SourceInfo, VideoReader};
pub use encode::VideoWriter;
pub use image::load_image;

/// Represents different types of media inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Video,
}

/// Supported media extensions
pub mod extensions {
    /// Image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

    /// Video file extensions
    pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov"];

    /// All supported extensions (images + videos)
    #[must_use]
    pub fn all_supported_extensions() -> Vec<&'static str> {
        IMAGE_EXTENSIONS
            .iter()
            .chain(VIDEO_EXTENSIONS.iter())
            .copied()
            .collect()
    }

    /// Checks whether a path carries an allow-listed extension.
    #[must_use]
    pub fn is_allowed<P: AsRef<std::path::Path>>(path: P) -> bool {
        super::detect_media_type(path).is_some()
    }
}

/// Detects the media type from the file extension (case-insensitive).
///
/// Returns `None` for anything outside the allow-list; callers reject such
/// inputs before the pipeline runs.
pub fn detect_media_type<P: AsRef<Path>>(path: P) -> Option<MediaType> {
    let extension = path
        .as_ref()
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_lowercase)?;

    if extensions::IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        Some(MediaType::Image)
    } else if extensions::VIDEO_EXTENSIONS.contains(&extension.as_str()) {
        Some(MediaType::Video)
    } else {
        None
    }
}

// SPDX-License-Identifier: MPL-2.0
//! Still-image decoding (PNG, JPEG).

use crate::error::{Error, Result};
use image_rs::RgbImage;
use std::path::Path;

/// Load a still image from the given path as an RGB frame.
///
/// # Errors
/// Returns [`Error::Decode`] if the file cannot be opened or is not a valid
/// image of its declared format.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
    let path_ref = path.as_ref();
    let img = image_rs::open(path_ref)
        .map_err(|e| Error::Decode(format!("could not read image {}: {e}", path_ref.display())))?;
    Ok(img.to_rgb8())
}

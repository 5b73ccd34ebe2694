// SPDX-License-Identifier: MPL-2.0
//! Brightness/contrast intensity adjustment.

use crate::config::defaults::{MAX_BRIGHTNESS, MAX_CONTRAST, MIN_BRIGHTNESS, MIN_CONTRAST};
use crate::error::{Error, Result};
use image_rs::RgbImage;

/// Applies the affine intensity transform to every sample of the frame.
///
/// Each channel value becomes `clamp(round(p * contrast + brightness), 0, 255)`:
/// contrast multiplies, brightness offsets. `brightness = 0` with
/// `contrast = 1.0` is an exact no-op.
///
/// The transform does not validate its inputs; out-of-range values still
/// produce clamped samples. Boundary layers reject them with [`validate`]
/// before a run starts.
#[must_use]
pub fn apply(frame: &RgbImage, brightness: i32, contrast: f32) -> RgbImage {
    let brightness = brightness as f32;
    let mut out = frame.clone();
    for pixel in out.pixels_mut() {
        for channel in &mut pixel.0 {
            let value = f32::from(*channel) * contrast + brightness;
            *channel = value.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Validates adjustment parameters against the documented bounds:
/// brightness in [-100, 100], contrast in [0.0, 3.0], both inclusive.
///
/// # Errors
/// Returns [`Error::InvalidParameter`] naming the offending value.
pub fn validate(brightness: i32, contrast: f32) -> Result<()> {
    if !(MIN_BRIGHTNESS..=MAX_BRIGHTNESS).contains(&brightness) {
        return Err(Error::InvalidParameter(format!(
            "brightness {brightness} out of range [{MIN_BRIGHTNESS}, {MAX_BRIGHTNESS}]"
        )));
    }
    if !(MIN_CONTRAST..=MAX_CONTRAST).contains(&contrast) || contrast.is_nan() {
        return Err(Error::InvalidParameter(format!(
            "contrast {contrast} out of range [{MIN_CONTRAST}, {MAX_CONTRAST}]"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_rs::Rgb;

    fn gradient_frame() -> RgbImage {
        RgbImage::from_fn(8, 8, |x, y| {
            let v = (x * 8 + y * 3) as u8;
            Rgb([v, v.wrapping_add(40), v.wrapping_add(90)])
        })
    }

    #[test]
    fn identity_parameters_change_nothing() {
        let frame = gradient_frame();
        let adjusted = apply(&frame, 0, 1.0);
        assert_eq!(frame, adjusted);
    }

    #[test]
    fn out_of_range_parameters_clamp_without_panicking() {
        // The core does not re-validate bounds; wild values saturate.
        let frame = gradient_frame();

        let white = apply(&frame, 1000, 1.0);
        assert!(white.pixels().all(|p| p.0 == [255, 255, 255]));

        let black = apply(&frame, 0, -3.0);
        assert!(black.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn minimum_brightness_zero_contrast_produces_black() {
        let frame = gradient_frame();
        let adjusted = apply(&frame, -100, 0.0);
        for pixel in adjusted.pixels() {
            assert_eq!(pixel.0, [0, 0, 0]);
        }
    }

    #[test]
    fn maximum_parameters_saturate_to_white() {
        let frame = RgbImage::from_pixel(4, 4, Rgb([60, 120, 200]));
        let adjusted = apply(&frame, 100, 3.0);
        // 60 * 3 + 100 = 280 -> 255; brighter channels saturate as well
        for pixel in adjusted.pixels() {
            assert_eq!(pixel.0, [255, 255, 255]);
        }
    }

    #[test]
    fn rounding_is_to_nearest_integer() {
        let frame = RgbImage::from_pixel(1, 1, Rgb([3, 5, 7]));
        // 3 * 1.5 = 4.5 -> 5 (round half away from zero), 5 * 1.5 = 7.5 -> 8,
        // 7 * 1.5 = 10.5 -> 11
        let adjusted = apply(&frame, 0, 1.5);
        assert_eq!(adjusted.get_pixel(0, 0).0, [5, 8, 11]);
    }

    #[test]
    fn brightness_offsets_uniformly() {
        let frame = RgbImage::from_pixel(2, 2, Rgb([10, 20, 30]));
        let adjusted = apply(&frame, 25, 1.0);
        assert_eq!(adjusted.get_pixel(0, 0).0, [35, 45, 55]);
    }

    #[test]
    fn validate_accepts_bounds_inclusive() {
        assert!(validate(-100, 0.0).is_ok());
        assert!(validate(100, 3.0).is_ok());
        assert!(validate(0, 1.0).is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        assert!(validate(-101, 1.0).is_err());
        assert!(validate(101, 1.0).is_err());
        assert!(validate(0, -0.01).is_err());
        assert!(validate(0, 3.01).is_err());
        assert!(validate(0, f32::NAN).is_err());
    }
}

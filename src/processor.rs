// SPDX-License-Identifier: MPL-2.0
//! Per-frame processing: intensity adjustment, effect dispatch, channel
//! normalization.

use crate::adjust;
use crate::config::defaults::{LANDMARK_COLOR, LANDMARK_RADIUS};
use crate::effect::{self, Effect, EffectOutput};
use crate::error::Result;
use crate::landmarks::FaceMeshDetector;
use image_rs::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;

/// Applies the adjustment step and the selected effect to single frames.
///
/// The processor owns the landmark detector so that tracking state carries
/// across consecutive frames of a run. One processor serves one run at a
/// time; concurrent runs must use independent processors, each with its own
/// detector.
pub struct FrameProcessor {
    detector: FaceMeshDetector,
}

impl FrameProcessor {
    /// Creates a processor owning `detector`.
    ///
    /// The detector may be loaded lazily by the caller; only the
    /// [`Effect::FaceMesh`] path touches it.
    #[must_use]
    pub fn new(detector: FaceMeshDetector) -> Self {
        Self { detector }
    }

    /// The owned landmark detector.
    #[must_use]
    pub fn detector(&self) -> &FaceMeshDetector {
        &self.detector
    }

    /// Mutable access to the owned landmark detector, e.g. to load the
    /// model before a face-mesh run.
    pub fn detector_mut(&mut self) -> &mut FaceMeshDetector {
        &mut self.detector
    }

    /// Processes one frame:
    ///
    /// 1. Applies the affine intensity adjustment.
    /// 2. Dispatches to the selected effect.
    /// 3. Broadcasts single-channel outputs to three identical channels so
    ///    downstream encoding always sees color frames.
    ///
    /// The only side effect is the detector's tracking-state update on the
    /// face-mesh path.
    ///
    /// # Errors
    /// Returns [`crate::error::Error::Inference`] when the face-mesh effect
    /// runs without a loaded detector or the model fails.
    pub fn process(
        &mut self,
        frame: &RgbImage,
        effect: Effect,
        brightness: i32,
        contrast: f32,
    ) -> Result<RgbImage> {
        let adjusted = adjust::apply(frame, brightness, contrast);

        let output = match effect {
            Effect::Original => EffectOutput::Color(adjusted),
            Effect::Grayscale => EffectOutput::Color(effect::grayscale(&adjusted)),
            Effect::Edge => EffectOutput::Mono(effect::edge(&adjusted)),
            Effect::Blur => EffectOutput::Color(effect::blur(&adjusted)),
            Effect::FaceMesh => EffectOutput::Color(self.apply_face_mesh(adjusted)?),
        };

        Ok(match output {
            EffectOutput::Color(frame) => frame,
            EffectOutput::Mono(mono) => effect::mono_to_rgb(&mono),
        })
    }

    /// Draws one filled dot per detected landmark over the frame. A frame
    /// with no detectable face is returned unchanged.
    fn apply_face_mesh(&mut self, mut frame: RgbImage) -> Result<RgbImage> {
        let faces = self.detector.detect(&frame)?;
        if faces.is_empty() {
            return Ok(frame);
        }

        let (width, height) = frame.dimensions();
        for face in &faces {
            for point in &face.points {
                let cx = (point.x * width as f32).round() as i32;
                let cy = (point.y * height as f32).round() as i32;
                draw_filled_circle_mut(&mut frame, (cx, cy), LANDMARK_RADIUS, Rgb(LANDMARK_COLOR));
            }
        }

        Ok(frame)
    }

    /// Releases the landmark detector's resources.
    ///
    /// # Errors
    /// Returns [`crate::error::Error::ResourceRelease`] if teardown fails;
    /// callers log this rather than discarding completed work.
    pub fn release(&mut self) -> Result<()> {
        self.detector.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::FaceMeshConfig;
    use image_rs::Rgb;

    fn test_processor() -> FrameProcessor {
        FrameProcessor::new(FaceMeshDetector::new(
            "/nonexistent/face_mesh.onnx",
            FaceMeshConfig::default(),
        ))
    }

    fn gradient_frame() -> RgbImage {
        RgbImage::from_fn(20, 20, |x, y| {
            Rgb([x as u8 * 12, y as u8 * 12, (x + y) as u8 * 6])
        })
    }

    #[test]
    fn original_with_neutral_adjustment_is_identity() {
        let mut processor = test_processor();
        let frame = gradient_frame();
        let result = processor
            .process(&frame, Effect::Original, 0, 1.0)
            .expect("process frame");
        assert_eq!(result, frame);
    }

    #[test]
    fn adjustment_runs_before_effect_dispatch() {
        let mut processor = test_processor();
        let frame = gradient_frame();
        let result = processor
            .process(&frame, Effect::Original, 30, 1.0)
            .expect("process frame");
        assert_eq!(result, crate::adjust::apply(&frame, 30, 1.0));
    }

    #[test]
    fn neutral_adjustment_matches_bare_transform() {
        let mut processor = test_processor();
        let frame = gradient_frame();
        let result = processor
            .process(&frame, Effect::Grayscale, 0, 1.0)
            .expect("process frame");
        assert_eq!(result, crate::effect::grayscale(&frame));
    }

    #[test]
    fn edge_output_is_broadcast_to_three_equal_channels() {
        let mut processor = test_processor();
        let frame = RgbImage::from_fn(32, 32, |x, _| {
            if x < 16 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let result = processor
            .process(&frame, Effect::Edge, 0, 1.0)
            .expect("process frame");
        assert_eq!(result.dimensions(), frame.dimensions());
        for pixel in result.pixels() {
            assert_eq!(pixel.0[0], pixel.0[1]);
            assert_eq!(pixel.0[1], pixel.0[2]);
        }
    }

    #[test]
    fn every_output_sample_is_clamped_for_extreme_adjustment() {
        let mut processor = test_processor();
        let frame = gradient_frame();
        for effect in [Effect::Original, Effect::Grayscale, Effect::Blur] {
            let result = processor
                .process(&frame, effect, 100, 3.0)
                .expect("process frame");
            assert_eq!(result.dimensions(), frame.dimensions());
        }
    }

    #[test]
    fn face_mesh_without_loaded_detector_is_an_inference_error() {
        let mut processor = test_processor();
        let frame = gradient_frame();
        let result = processor.process(&frame, Effect::FaceMesh, 0, 1.0);
        assert!(matches!(
            result,
            Err(crate::error::Error::Inference(_))
        ));
    }

    #[test]
    fn release_is_ok_without_loaded_detector() {
        let mut processor = test_processor();
        assert!(processor.release().is_ok());
    }

    // Exercises a real model when one is installed; returns early otherwise.
    #[test]
    fn face_mesh_with_real_model_leaves_faceless_frame_unmodified() {
        let mut processor = FrameProcessor::new(FaceMeshDetector::with_default_model());
        if !processor.detector().is_model_present() {
            return;
        }
        processor.detector_mut().load().expect("load model");

        let frame = RgbImage::from_pixel(128, 128, Rgb([8, 8, 8]));
        let result = processor
            .process(&frame, Effect::FaceMesh, 0, 1.0)
            .expect("process frame");
        assert_eq!(result, frame);
        processor.release().expect("release detector");
    }
}

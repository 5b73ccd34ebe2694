// SPDX-License-Identifier: MPL-2.0
//! Facial-landmark estimation backed by an ONNX face-mesh model.
//!
//! This module provides functionality for:
//! - Resolving and verifying the face-mesh model file (BLAKE3 checksum)
//! - Managing the inference session lifecycle (load, reuse, explicit release)
//! - Running per-frame landmark detection with temporal tracking continuity

use crate::config::defaults::{
    FACE_MESH_INPUT_SIZE, FACE_MESH_MODEL_FILENAME, MAX_FACES, MIN_DETECTION_CONFIDENCE,
    MIN_TRACKING_CONFIDENCE,
};
use crate::error::{Error, Result};
use image_rs::RgbImage;
use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::{Path, PathBuf};

/// Detector tuning, mirroring the estimator's runtime options.
#[derive(Debug, Clone, Copy)]
pub struct FaceMeshConfig {
    /// Maximum number of faces returned per frame.
    pub max_faces: usize,
    /// Minimum face score for a fresh detection to be accepted.
    pub min_detection_confidence: f32,
    /// Minimum face score to keep tracking a face seen on the previous
    /// frame. Tracking mode is implied: consecutive calls share state.
    pub min_tracking_confidence: f32,
}

impl Default for FaceMeshConfig {
    fn default() -> Self {
        Self {
            max_faces: MAX_FACES,
            min_detection_confidence: MIN_DETECTION_CONFIDENCE,
            min_tracking_confidence: MIN_TRACKING_CONFIDENCE,
        }
    }
}

/// A single landmark position, normalized to [0, 1] in both axes.
///
/// Scale by the frame's width/height before drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedLandmark {
    pub x: f32,
    pub y: f32,
}

/// All landmarks of one detected face.
#[derive(Debug, Clone)]
pub struct FaceLandmarks {
    pub points: Vec<NormalizedLandmark>,
}

/// Stateful facial-landmark estimator.
///
/// The session is loaded once with [`FaceMeshDetector::load`], reused across
/// frames and runs, and released explicitly with
/// [`FaceMeshDetector::close`]. Instances are not meant to be shared across
/// concurrent runs; give each run its own detector.
pub struct FaceMeshDetector {
    model_path: PathBuf,
    config: FaceMeshConfig,
    session: Option<Session>,
    /// Whether a face was present on the previous call; selects the
    /// tracking threshold over the detection threshold.
    tracking: bool,
}

impl FaceMeshDetector {
    /// Creates an unloaded detector for the model at `model_path`.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(model_path: P, config: FaceMeshConfig) -> Self {
        Self {
            model_path: model_path.into(),
            config,
            session: None,
            tracking: false,
        }
    }

    /// Creates an unloaded detector pointing at the default model location.
    #[must_use]
    pub fn with_default_model() -> Self {
        Self::new(default_model_path(), FaceMeshConfig::default())
    }

    /// The path this detector loads its model from.
    #[must_use]
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Checks if the model file exists on disk.
    #[must_use]
    pub fn is_model_present(&self) -> bool {
        self.model_path.exists()
    }

    /// Loads the inference session from the model file.
    ///
    /// # Errors
    /// Returns [`Error::Inference`] if the file is absent or the session
    /// cannot be built.
    pub fn load(&mut self) -> Result<()> {
        if !self.model_path.exists() {
            return Err(Error::Inference(format!(
                "face-mesh model not found at {}",
                self.model_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| Error::Inference(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::Inference(e.to_string()))?
            .commit_from_file(&self.model_path)
            .map_err(|e| Error::Inference(e.to_string()))?;

        self.session = Some(session);
        log::info!("face-mesh session loaded from {}", self.model_path.display());
        Ok(())
    }

    /// Checks if the inference session is loaded and ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.session.is_some()
    }

    /// Runs landmark detection on one frame.
    ///
    /// Returns zero or one faces (bounded by the configured maximum), each
    /// with landmarks normalized to [0, 1]. An empty result means no face
    /// scored above the active confidence threshold; that is a normal
    /// outcome, not an error.
    ///
    /// # Errors
    /// Returns [`Error::Inference`] if the session is not loaded or the
    /// model run fails.
    pub fn detect(&mut self, frame: &RgbImage) -> Result<Vec<FaceLandmarks>> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| Error::Inference("face-mesh session not loaded".to_string()))?;

        // Frames arrive in the pipeline's native RGB order; the model input
        // is the same order as a normalized float NCHW tensor.
        let input_tensor = preprocess(frame);
        let input_tensor = input_tensor.as_standard_layout().into_owned();

        let input_name = session
            .inputs
            .first()
            .map_or_else(|| "input".to_string(), |i| i.name.clone());

        let input_ref = ort::value::TensorRef::from_array_view(&input_tensor)
            .map_err(|e| Error::Inference(e.to_string()))?;

        let outputs = session
            .run(ort::inputs![input_name.as_str() => input_ref])
            .map_err(|e| Error::Inference(e.to_string()))?;

        let (score, points) = parse_outputs(&outputs)?;

        let threshold = if self.tracking {
            self.config.min_tracking_confidence
        } else {
            self.config.min_detection_confidence
        };

        if score < threshold {
            self.tracking = false;
            return Ok(Vec::new());
        }
        self.tracking = true;

        let mut faces = vec![FaceLandmarks { points }];
        faces.truncate(self.config.max_faces);
        Ok(faces)
    }

    /// Releases the inference session and resets tracking state.
    ///
    /// Safe to call more than once. Failing to call this before discarding
    /// the owning processor leaks the model resources until process exit.
    ///
    /// # Errors
    /// Returns [`Error::ResourceRelease`] if teardown fails.
    pub fn close(&mut self) -> Result<()> {
        if let Some(session) = self.session.take() {
            drop(session);
            log::debug!("face-mesh session released");
        }
        self.tracking = false;
        Ok(())
    }

    /// Verifies the model file integrity using a BLAKE3 hash.
    ///
    /// # Errors
    /// Returns [`Error::Inference`] if the file is absent or the hash does
    /// not match.
    pub fn verify_model(&self, expected_hash: &str) -> Result<()> {
        if !self.model_path.exists() {
            return Err(Error::Inference(format!(
                "face-mesh model not found at {}",
                self.model_path.display()
            )));
        }

        let file_data = std::fs::read(&self.model_path).map_err(|e| Error::Io(e.to_string()))?;
        let actual_hash = blake3::hash(&file_data).to_hex().to_string();

        if actual_hash != expected_hash {
            return Err(Error::Inference(format!(
                "model checksum mismatch: expected {expected_hash}, got {actual_hash}"
            )));
        }

        Ok(())
    }
}

/// Returns the default face-mesh model location in the platform data
/// directory.
#[must_use]
pub fn default_model_path() -> PathBuf {
    dirs::data_dir().map_or_else(
        || PathBuf::from(FACE_MESH_MODEL_FILENAME),
        |mut p| {
            p.push("framefx");
            p.push(FACE_MESH_MODEL_FILENAME);
            p
        },
    )
}

/// Preprocesses a frame for face-mesh inference.
///
/// Resizes to the model's square input and converts to NCHW format
/// (batch=1, channels=3, height, width), RGB order, normalized to 0-1.
fn preprocess(frame: &RgbImage) -> Array4<f32> {
    let size = FACE_MESH_INPUT_SIZE;
    let resized = image_rs::imageops::resize(
        frame,
        size,
        size,
        image_rs::imageops::FilterType::Triangle,
    );

    let mut tensor = Array4::<f32>::zeros((1, 3, size as usize, size as usize));
    for (x, y, pixel) in resized.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        tensor[[0, 0, y as usize, x as usize]] = f32::from(r) / 255.0;
        tensor[[0, 1, y as usize, x as usize]] = f32::from(g) / 255.0;
        tensor[[0, 2, y as usize, x as usize]] = f32::from(b) / 255.0;
    }

    tensor
}

/// Splits the model outputs into the face score and the landmark list.
///
/// The model emits a per-face score tensor (one element) and a flat
/// landmark tensor (x, y, z triples in input-pixel coordinates); outputs
/// are matched by element count rather than by name, which varies between
/// exports.
fn parse_outputs(outputs: &ort::session::SessionOutputs<'_>) -> Result<(f32, Vec<NormalizedLandmark>)> {
    let mut score: Option<f32> = None;
    let mut points: Option<Vec<NormalizedLandmark>> = None;

    for (_, output) in outputs.iter() {
        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e: ort::Error| Error::Inference(e.to_string()))?;

        if data.len() == 1 {
            score = Some(confidence_from_score(data[0]));
        } else if data.len() >= 3 && data.len() % 3 == 0 {
            let scale = FACE_MESH_INPUT_SIZE as f32;
            let landmarks = data
                .chunks_exact(3)
                .map(|triple| NormalizedLandmark {
                    x: (triple[0] / scale).clamp(0.0, 1.0),
                    y: (triple[1] / scale).clamp(0.0, 1.0),
                })
                .collect();
            points = Some(landmarks);
        }
    }

    match (score, points) {
        (Some(score), Some(points)) => Ok((score, points)),
        _ => Err(Error::Inference(
            "model outputs missing score or landmark tensor".to_string(),
        )),
    }
}

/// Some model exports emit a probability, others a logit; logits are mapped
/// through the sigmoid so the configured thresholds apply to both.
fn confidence_from_score(raw: f32) -> f32 {
    if (0.0..=1.0).contains(&raw) {
        raw
    } else {
        1.0 / (1.0 + (-raw).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_rs::Rgb;

    #[test]
    fn default_config_matches_estimator_settings() {
        let config = FaceMeshConfig::default();
        assert_eq!(config.max_faces, 1);
        assert_eq!(config.min_detection_confidence, 0.5);
        assert_eq!(config.min_tracking_confidence, 0.5);
    }

    #[test]
    fn default_model_path_ends_with_model_filename() {
        let path = default_model_path();
        assert!(path.to_string_lossy().contains(FACE_MESH_MODEL_FILENAME));
    }

    #[test]
    fn new_detector_is_not_ready() {
        let detector = FaceMeshDetector::with_default_model();
        assert!(!detector.is_ready());
    }

    #[test]
    fn detect_fails_when_not_loaded() {
        let mut detector =
            FaceMeshDetector::new("/nonexistent/face_mesh.onnx", FaceMeshConfig::default());
        let frame = RgbImage::from_pixel(32, 32, Rgb([128, 128, 128]));
        assert!(matches!(
            detector.detect(&frame),
            Err(Error::Inference(_))
        ));
    }

    #[test]
    fn load_fails_on_missing_model() {
        let mut detector =
            FaceMeshDetector::new("/nonexistent/face_mesh.onnx", FaceMeshConfig::default());
        assert!(matches!(detector.load(), Err(Error::Inference(_))));
    }

    #[test]
    fn close_is_idempotent() {
        let mut detector = FaceMeshDetector::with_default_model();
        assert!(detector.close().is_ok());
        assert!(detector.close().is_ok());
        assert!(!detector.is_ready());
    }

    #[test]
    fn verify_model_fails_on_missing_file() {
        let detector =
            FaceMeshDetector::new("/nonexistent/face_mesh.onnx", FaceMeshConfig::default());
        assert!(detector.verify_model("abc123").is_err());
    }

    #[test]
    fn verify_model_detects_checksum_mismatch() {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let path = temp_dir.path().join("face_mesh.onnx");
        std::fs::write(&path, b"model bytes").expect("write model stub");

        let detector = FaceMeshDetector::new(&path, FaceMeshConfig::default());
        assert!(detector.verify_model("0000").is_err());

        let expected = blake3::hash(b"model bytes").to_hex().to_string();
        assert!(detector.verify_model(&expected).is_ok());
    }

    #[test]
    fn preprocess_produces_normalized_nchw_tensor() {
        let frame = RgbImage::from_pixel(64, 48, Rgb([255, 128, 0]));
        let tensor = preprocess(&frame);
        let size = FACE_MESH_INPUT_SIZE as usize;
        assert_eq!(tensor.shape(), &[1, 3, size, size]);

        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 0.01);
        assert!((tensor[[0, 1, 0, 0]] - 0.502).abs() < 0.01);
        assert!(tensor[[0, 2, 0, 0]].abs() < 0.01);
    }

    #[test]
    fn confidence_passes_probabilities_through() {
        assert_eq!(confidence_from_score(0.7), 0.7);
        assert_eq!(confidence_from_score(0.0), 0.0);
        assert_eq!(confidence_from_score(1.0), 1.0);
    }

    #[test]
    fn confidence_maps_logits_through_sigmoid() {
        assert!(confidence_from_score(4.0) > 0.9);
        assert!(confidence_from_score(-4.0) < 0.1);
    }

    // Exercises a real model when one is installed; returns early otherwise.
    #[test]
    fn detect_with_real_model_handles_faceless_frame() {
        let mut detector = FaceMeshDetector::with_default_model();
        if !detector.is_model_present() {
            return;
        }

        detector.load().expect("load model");
        let frame = RgbImage::from_pixel(256, 256, Rgb([0, 0, 0]));
        let faces = detector.detect(&frame).expect("run detection");
        assert!(faces.len() <= 1);
        detector.close().expect("release session");
    }
}

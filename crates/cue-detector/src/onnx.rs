//! ONNX-backed classifier
//!
//! Model contract: a single image input of shape `1 x C x S x S` normalized
//! to [-1, 1], and a first output holding rows of
//! `[x1, y1, x2, y2, score]` in normalized image coordinates. Raw anchor
//! outputs are grouped with the cascade neighbor rule; models that already
//! apply NMS should be configured with `min_neighbors = 0`.
//!
//! The model runs single-scale, so `ScanParams::scale_factor` is not used here.

use image::{imageops::FilterType, GrayImage};
use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use tracing::{debug, error, info};

use crate::classifier::{group_rectangles, Classifier, ScanParams, GROUP_EPS};
use crate::config::ModelConfig;
use crate::{BoundingBox, DetectorError};

/// Values per output row
const ROW_LEN: usize = 5;

/// Classifier running an ONNX detection model through onnxruntime
pub struct OnnxClassifier {
    name: String,
    session: Session,
    input_size: u32,
    channels: usize,
    score_threshold: f32,
}

impl OnnxClassifier {
    /// Load the model described by `config`
    pub fn load(name: &str, config: &ModelConfig) -> Result<Self, DetectorError> {
        let path = config
            .path
            .as_deref()
            .ok_or_else(|| DetectorError::Unavailable(format!("no {} model configured", name)))?;

        if config.input_size == 0 || !matches!(config.channels, 1 | 3) {
            return Err(DetectorError::ModelLoad(format!(
                "{} model: unsupported input {}x{} with {} channels",
                name, config.input_size, config.input_size, config.channels
            )));
        }

        info!("Loading {} model from {}", name, path);
        let session = Session::builder()
            .and_then(|builder| builder.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|builder| builder.commit_from_file(path))
            .map_err(|e| {
                error!("Failed to load {} model: {}", name, e);
                DetectorError::ModelLoad(e.to_string())
            })?;

        Ok(Self {
            name: name.to_string(),
            session,
            input_size: config.input_size,
            channels: config.channels,
            score_threshold: config.score_threshold,
        })
    }

    fn preprocess(&self, gray: &GrayImage) -> Array4<f32> {
        preprocess(gray, self.input_size, self.channels)
    }
}

impl Classifier for OnnxClassifier {
    fn detect(
        &self,
        gray: &GrayImage,
        params: &ScanParams,
    ) -> Result<Vec<BoundingBox>, DetectorError> {
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }

        let input = self.preprocess(gray);
        let outputs = self
            .session
            .run(ort::inputs![input].map_err(|e| DetectorError::Inference(e.to_string()))?)
            .map_err(|e| DetectorError::Inference(e.to_string()))?;

        let raw = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| DetectorError::Inference(e.to_string()))?;
        let values: Vec<f32> = raw.iter().copied().collect();

        let candidates =
            decode_candidates(&values, width, height, self.score_threshold, params.min_size);
        let boxes = group_rectangles(&candidates, params.min_neighbors, GROUP_EPS);
        debug!(
            "{}: {} candidates -> {} detections ({}x{})",
            self.name,
            candidates.len(),
            boxes.len(),
            width,
            height
        );
        Ok(boxes)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Resize to the model resolution and build a `1 x C x S x S` tensor in [-1, 1]
pub(crate) fn preprocess(gray: &GrayImage, size: u32, channels: usize) -> Array4<f32> {
    let resized = image::imageops::resize(gray, size, size, FilterType::Triangle);
    let mut input = Array4::<f32>::zeros((1, channels, size as usize, size as usize));
    for (x, y, pixel) in resized.enumerate_pixels() {
        let value = (pixel[0] as f32 / 127.5) - 1.0;
        for c in 0..channels {
            input[[0, c, y as usize, x as usize]] = value;
        }
    }
    input
}

/// Decode `[x1, y1, x2, y2, score]` rows into pixel boxes
pub(crate) fn decode_candidates(
    values: &[f32],
    width: u32,
    height: u32,
    score_threshold: f32,
    min_size: u32,
) -> Vec<BoundingBox> {
    values
        .chunks_exact(ROW_LEN)
        .filter(|row| row[4] >= score_threshold)
        .filter_map(|row| {
            let x1 = (row[0].clamp(0.0, 1.0) * width as f32).round() as u32;
            let y1 = (row[1].clamp(0.0, 1.0) * height as f32).round() as u32;
            let x2 = (row[2].clamp(0.0, 1.0) * width as f32).round() as u32;
            let y2 = (row[3].clamp(0.0, 1.0) * height as f32).round() as u32;
            (x2 > x1 && y2 > y1).then(|| BoundingBox::new(x1, y1, x2 - x1, y2 - y1))
        })
        .filter(|bbox| bbox.meets_min_size(min_size))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_missing_model_path_is_unavailable() {
        let result = OnnxClassifier::load("face", &ModelConfig::default());
        assert!(matches!(result, Err(DetectorError::Unavailable(_))));
    }

    #[test]
    fn test_unsupported_channels_rejected() {
        let config = ModelConfig {
            path: Some("face.onnx".into()),
            channels: 2,
            ..Default::default()
        };
        assert!(matches!(OnnxClassifier::load("face", &config), Err(DetectorError::ModelLoad(_))));
    }

    #[test]
    fn test_decode_candidates() {
        let values = [
            0.1, 0.1, 0.5, 0.5, 0.9, // kept: 40x40 at (10, 10)
            0.1, 0.1, 0.5, 0.5, 0.2, // low score
            0.6, 0.6, 0.65, 0.65, 0.9, // too small
            0.8, 0.8, 0.7, 0.9, 0.9, // inverted
        ];
        let boxes = decode_candidates(&values, 100, 100, 0.5, 40);
        assert_eq!(boxes, vec![BoundingBox::new(10, 10, 40, 40)]);
    }

    #[test]
    fn test_preprocess_shape_and_range() {
        let gray = GrayImage::from_pixel(10, 20, Luma([255]));
        let input = preprocess(&gray, 8, 3);
        assert_eq!(input.shape(), &[1, 3, 8, 8]);
        assert!(input.iter().all(|v| (*v - 1.0).abs() < 1e-6));
    }
}

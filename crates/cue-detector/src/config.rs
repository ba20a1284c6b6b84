//! Detector configuration

use serde::{Deserialize, Serialize};

use crate::classifier::ScanParams;

/// Classifier model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// ONNX model path
    pub path: Option<String>,

    /// Square input resolution expected by the model
    pub input_size: u32,

    /// Input channels (1 = grayscale, 3 = grayscale replicated)
    pub channels: usize,

    /// Minimum candidate score
    pub score_threshold: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: None,
            input_size: 128,
            channels: 3,
            score_threshold: 0.5,
        }
    }
}

/// Cue detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Face classifier model
    pub face_model: ModelConfig,

    /// Eye classifier model
    pub eye_model: ModelConfig,

    /// Face scan parameters
    pub face_scan: ScanParams,

    /// Eye scan parameters (inside each face region)
    pub eye_scan: ScanParams,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            face_model: ModelConfig::default(),
            eye_model: ModelConfig {
                input_size: 64,
                ..Default::default()
            },
            face_scan: ScanParams::FACE,
            eye_scan: ScanParams::EYE,
        }
    }
}

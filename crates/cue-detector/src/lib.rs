//! Cue Detector
//!
//! Locates faces and, within each face, eyes:
//! - Grayscale conversion of the incoming frame
//! - Face scan over the whole frame (minimum 40x40)
//! - Eye scan restricted to each face region (minimum 15x15)
//! - Per-face labelling (head down / distracted / engaged)
//! - Optional annotation overlays on a display copy of the frame
//!
//! The classifiers themselves are external models behind the
//! [`Classifier`] trait.

pub mod bbox;
pub mod classifier;
pub mod config;
pub mod detection;
pub mod detector;
pub mod onnx;
pub mod overlay;

pub use bbox::BoundingBox;
pub use classifier::{group_rectangles, Classifier, ScanParams};
pub use config::{DetectorConfig, ModelConfig};
pub use detection::{CueCounts, Detection, FaceCue, FaceLabel};
pub use detector::CueDetector;
pub use onnx::OnnxClassifier;

use thiserror::Error;
use video_frame::FrameError;

/// Detector error types
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Detector unavailable: {0}")]
    Unavailable(String),

    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Invalid frame: {0}")]
    InvalidFrame(#[from] FrameError),
}

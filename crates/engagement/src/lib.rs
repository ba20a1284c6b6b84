//! Engagement Analysis Engine
//!
//! Per-frame exam hall engagement analysis:
//! - Face/eye cue extraction (via `cue-detector`)
//! - Engagement scoring with head-down / distraction penalties
//! - Rolling history with trend and drop-event statistics
//! - Ranked invigilator interventions
//! - Whole-session reports for recorded video

pub mod aggregator;
pub mod config;
pub mod engine;
pub mod intervention;
pub mod overlay;
pub mod report;
pub mod result;
pub mod score;

pub use aggregator::{SummaryStats, TemporalAggregator, Trend};
pub use config::{EngagementConfig, HistoryConfig, Thresholds};
pub use engine::EngagementEngine;
pub use intervention::{Intervention, InterventionSelector, Priority, Tier};
pub use report::{DropRow, PhaseStatus, PhaseSummary, SessionRecord, SessionReport};
pub use result::{EngagementLevel, FrameResult};
pub use score::{Alert, ScoreCalculator, ScoreOutcome};

use cue_detector::DetectorError;
use thiserror::Error;
use video_frame::FrameError;

/// Engagement engine error types
#[derive(Error, Debug)]
pub enum EngagementError {
    #[error("Detector unavailable: {0}")]
    DetectorUnavailable(String),

    #[error("Invalid frame: {0}")]
    InvalidFrame(#[from] FrameError),

    #[error("Detection failed: {0}")]
    Detection(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<DetectorError> for EngagementError {
    fn from(err: DetectorError) -> Self {
        match err {
            DetectorError::Unavailable(msg) | DetectorError::ModelLoad(msg) => {
                EngagementError::DetectorUnavailable(msg)
            }
            DetectorError::Inference(msg) => EngagementError::Detection(msg),
            DetectorError::InvalidFrame(e) => EngagementError::InvalidFrame(e),
        }
    }
}

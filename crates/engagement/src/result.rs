//! Per-frame analysis results

use cue_detector::Detection;
use serde::{Deserialize, Serialize};

use crate::score::Alert;

/// Engagement level classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementLevel {
    /// Score >= 70
    High,
    /// 50 <= score < 70
    Medium,
    /// Score < 50
    Low,
    /// No faces detected; the score is not meaningful
    NoFace,
}

impl EngagementLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            EngagementLevel::High
        } else if score >= 50.0 {
            EngagementLevel::Medium
        } else {
            EngagementLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EngagementLevel::High => "high",
            EngagementLevel::Medium => "medium",
            EngagementLevel::Low => "low",
            EngagementLevel::NoFace => "no_face",
        }
    }
}

/// Complete analysis of one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    /// Frames analysed by the engine so far, including this one
    pub frame_index: u64,

    /// Frame arrival timestamp (nanoseconds)
    pub timestamp_ns: u64,

    pub faces_detected: usize,
    pub eyes_detected: usize,

    /// Faces with zero eyes found
    pub head_down_count: usize,

    /// Faces with exactly one eye found
    pub distracted_count: usize,

    /// Engagement score in [0, 100]
    pub engagement_score: f64,

    /// Alerts in the order they were raised
    pub alerts: Vec<Alert>,

    /// Boxes behind the counts (for overlays)
    pub detection: Detection,
}

impl FrameResult {
    pub fn level(&self) -> EngagementLevel {
        if self.faces_detected == 0 {
            EngagementLevel::NoFace
        } else {
            EngagementLevel::from_score(self.engagement_score)
        }
    }

    /// No alerts raised: all students appear on-task
    pub fn is_on_task(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Alert texts, in order
    pub fn alert_messages(&self) -> Vec<String> {
        self.alerts.iter().map(ToString::to_string).collect()
    }

    /// Most severe alert: critical styling first, then raise order
    pub fn highest_severity_alert(&self) -> Option<&Alert> {
        self.alerts
            .iter()
            .find(|a| matches!(a, Alert::Critical { .. }))
            .or_else(|| self.alerts.iter().find(|a| a.is_critical()))
            .or_else(|| self.alerts.first())
    }
}

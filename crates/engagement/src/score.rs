//! Engagement score calculation

use std::fmt;

use cue_detector::CueCounts;
use serde::{Deserialize, Serialize};

use crate::config::Thresholds;

/// Penalty for the fraction of faces with head down
pub const HEAD_DOWN_PENALTY: f64 = 40.0;
/// Penalty for the fraction of distracted faces
pub const DISTRACTED_PENALTY: f64 = 20.0;
/// Weight of the eye-visibility bonus around a 0.5 ratio
pub const EYE_BONUS_WEIGHT: f64 = 10.0;
/// Keeps the eye ratio denominator non-zero
const EYE_RATIO_EPSILON: f64 = 0.001;

/// Frame-level engagement alerts, in the order they are raised
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Alert {
    /// Faces with no visible eyes
    HeadDown { count: usize },
    /// Faces with a single visible eye
    Distraction { count: usize },
    /// Score fell below the critical threshold
    Critical { threshold: f64 },
    /// Score fell below the warning threshold
    Warning,
}

impl Alert {
    /// Whether the alert should be rendered with critical styling
    pub fn is_critical(&self) -> bool {
        matches!(self, Alert::HeadDown { .. } | Alert::Critical { .. })
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alert::HeadDown { count } => write!(
                f,
                "{} student(s) appear to have head down / not looking at paper",
                count
            ),
            Alert::Distraction { count } => {
                write!(f, "{} student(s) showing signs of distraction", count)
            }
            Alert::Critical { threshold } => {
                // Scaled thresholds keep one decimal (52.5); whole ones print bare
                let shown = (threshold * 10.0).round() / 10.0;
                write!(f, "CRITICAL: Engagement dropped below {}%", shown)
            }
            Alert::Warning => write!(f, "WARNING: Moderate engagement drop detected"),
        }
    }
}

/// Score and alerts for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    pub score: f64,
    pub alerts: Vec<Alert>,
}

/// Maps per-frame cue counts to a bounded engagement score
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    critical_threshold: f64,
    warning_threshold: f64,
}

impl ScoreCalculator {
    pub fn new(thresholds: &Thresholds) -> Self {
        Self {
            critical_threshold: thresholds.critical,
            warning_threshold: thresholds.warning,
        }
    }

    /// Engagement score in [0, 100].
    ///
    /// A frame with no faces is scored as a single face with no eyes found
    /// but without the head-down penalty, which yields 95. The level reported
    /// for such frames is [`crate::EngagementLevel::NoFace`].
    pub fn raw_score(counts: &CueCounts) -> f64 {
        let n_faces = counts.faces.max(1) as f64;

        let mut score = 100.0;
        score -= (counts.head_down as f64 / n_faces) * HEAD_DOWN_PENALTY;
        score -= (counts.distracted as f64 / n_faces) * DISTRACTED_PENALTY;

        let eye_ratio = (counts.eyes as f64 / (n_faces * 2.0 + EYE_RATIO_EPSILON)).min(1.0);
        score += (eye_ratio - 0.5) * EYE_BONUS_WEIGHT;

        score.clamp(0.0, 100.0)
    }

    /// Score a frame and raise its alerts
    pub fn score(&self, counts: &CueCounts) -> ScoreOutcome {
        let score = Self::raw_score(counts);

        let mut alerts = Vec::new();
        if counts.head_down > 0 {
            alerts.push(Alert::HeadDown {
                count: counts.head_down,
            });
        }
        if counts.distracted > 0 {
            alerts.push(Alert::Distraction {
                count: counts.distracted,
            });
        }
        if score < self.critical_threshold {
            alerts.push(Alert::Critical {
                threshold: self.critical_threshold,
            });
        } else if score < self.warning_threshold {
            alerts.push(Alert::Warning);
        }

        ScoreOutcome { score, alerts }
    }
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new(&Thresholds::NOMINAL)
    }
}

//! Engagement engine configuration

use std::path::Path;

use cue_detector::DetectorConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::EngagementError;

/// Sensitivity at which thresholds take their nominal values
pub const BASELINE_SENSITIVITY: u8 = 6;

/// Threshold scaling per sensitivity step
const SENSITIVITY_STEP: f64 = 0.05;

/// Environment variable prefix (`PIVOT__SENSITIVITY=8`)
pub const ENV_PREFIX: &str = "PIVOT";

/// Engagement engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    /// Sensitivity to engagement drops (1-10, higher = more sensitive)
    pub sensitivity: u8,

    /// Process every Nth frame (1-5)
    pub frame_skip: u32,

    /// Rolling history and trend settings
    pub history: HistoryConfig,

    /// Face/eye detector settings
    pub detector: DetectorConfig,
}

/// Rolling history settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Scores kept in the rolling window
    pub capacity: usize,

    /// Samples needed for a trend (split into two halves)
    pub trend_window: usize,

    /// Mean difference between halves that counts as rising/falling
    pub trend_delta: f64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: ring_buffer::DEFAULT_CAPACITY,
            trend_window: 40,
            trend_delta: 3.0,
        }
    }
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            sensitivity: BASELINE_SENSITIVITY,
            frame_skip: 2,
            history: HistoryConfig::default(),
            detector: DetectorConfig::default(),
        }
    }
}

/// Score thresholds after sensitivity scaling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// A fall from at-or-above to below this is a drop event
    pub drop: f64,
    /// Scores below this raise a critical alert
    pub critical: f64,
    /// Scores below this (and not critical) raise a warning
    pub warning: f64,
}

impl Thresholds {
    pub const NOMINAL: Thresholds = Thresholds {
        drop: 60.0,
        critical: 50.0,
        warning: 70.0,
    };

    /// Scale every threshold by `factor`, capped to the score range
    pub fn scaled(factor: f64) -> Self {
        let scale = |v: f64| (v * factor).clamp(0.0, 100.0);
        Self {
            drop: scale(Self::NOMINAL.drop),
            critical: scale(Self::NOMINAL.critical),
            warning: scale(Self::NOMINAL.warning),
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::NOMINAL
    }
}

impl EngagementConfig {
    /// Create strict config (reacts to smaller drops)
    pub fn strict() -> Self {
        Self {
            sensitivity: 9,
            frame_skip: 1,
            ..Default::default()
        }
    }

    /// Create lenient config (only large drops register)
    pub fn lenient() -> Self {
        Self {
            sensitivity: 3,
            frame_skip: 3,
            ..Default::default()
        }
    }

    /// Load from an optional config file, then `PIVOT__*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, EngagementError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            debug!("Reading configuration from {}", path.display());
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let loaded: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| EngagementError::Config(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), EngagementError> {
        if !(1..=10).contains(&self.sensitivity) {
            return Err(EngagementError::Config(format!(
                "sensitivity must be within 1-10, got {}",
                self.sensitivity
            )));
        }
        if !(1..=5).contains(&self.frame_skip) {
            return Err(EngagementError::Config(format!(
                "frame_skip must be within 1-5, got {}",
                self.frame_skip
            )));
        }
        let history = &self.history;
        if history.trend_window < 2 || history.trend_window % 2 != 0 {
            return Err(EngagementError::Config(format!(
                "trend_window must be an even number >= 2, got {}",
                history.trend_window
            )));
        }
        if history.capacity < history.trend_window {
            return Err(EngagementError::Config(format!(
                "history capacity {} is smaller than trend_window {}",
                history.capacity, history.trend_window
            )));
        }
        if !history.trend_delta.is_finite() || history.trend_delta < 0.0 {
            return Err(EngagementError::Config("trend_delta must be a non-negative number".into()));
        }
        Ok(())
    }

    /// Threshold multiplier; 1.0 at the baseline sensitivity
    pub fn sensitivity_factor(&self) -> f64 {
        1.0 + (self.sensitivity as f64 - BASELINE_SENSITIVITY as f64) * SENSITIVITY_STEP
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds::scaled(self.sensitivity_factor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_are_nominal() {
        let config = EngagementConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sensitivity_factor(), 1.0);
        assert_eq!(config.thresholds(), Thresholds::NOMINAL);
    }

    #[test]
    fn test_sensitivity_scales_thresholds() {
        let strict = EngagementConfig::strict().thresholds();
        let lenient = EngagementConfig::lenient().thresholds();
        assert!(strict.drop > 60.0 && strict.critical > 50.0 && strict.warning > 70.0);
        assert!(lenient.drop < 60.0 && lenient.critical < 50.0);

        let max = EngagementConfig {
            sensitivity: 10,
            ..Default::default()
        };
        assert!((max.thresholds().drop - 72.0).abs() < 1e-9);
    }

    #[test]
    fn test_validation_ranges() {
        let bad_sensitivity = EngagementConfig {
            sensitivity: 0,
            ..Default::default()
        };
        assert!(matches!(bad_sensitivity.validate(), Err(EngagementError::Config(_))));

        let bad_skip = EngagementConfig {
            frame_skip: 6,
            ..Default::default()
        };
        assert!(bad_skip.validate().is_err());

        let bad_window = EngagementConfig {
            history: HistoryConfig {
                capacity: 30,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(bad_window.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engagement.toml");
        std::fs::write(
            &path,
            concat!(
                "sensitivity = 8\n",
                "frame_skip = 1\n\n",
                "[history]\n",
                "capacity = 200\n\n",
                "[detector.face_model]\n",
                "path = \"models/face.onnx\"\n",
            ),
        )
        .unwrap();

        let config = EngagementConfig::load(Some(&path)).unwrap();
        assert_eq!(config.sensitivity, 8);
        assert_eq!(config.frame_skip, 1);
        assert_eq!(config.history.capacity, 200);
        assert_eq!(config.history.trend_window, 40);
        assert_eq!(config.detector.face_model.path.as_deref(), Some("models/face.onnx"));
        assert_eq!(config.detector.eye_model.input_size, 64);
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engagement.toml");
        std::fs::write(&path, "sensitivity = 11\n").unwrap();
        assert!(matches!(EngagementConfig::load(Some(&path)), Err(EngagementError::Config(_))));
    }
}

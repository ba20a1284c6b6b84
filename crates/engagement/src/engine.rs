//! Session engagement engine: detect, score, aggregate, select

use cue_detector::{CueDetector, Detection};
use tracing::{debug, info, warn};
use video_frame::VideoFrame;

use crate::aggregator::{SummaryStats, TemporalAggregator};
use crate::config::EngagementConfig;
use crate::intervention::{Intervention, InterventionSelector};
use crate::result::FrameResult;
use crate::score::ScoreCalculator;
use crate::EngagementError;

/// Per-session engagement engine.
///
/// Owns the rolling score history. Frames must be fed from a single owner in
/// arrival order.
pub struct EngagementEngine {
    config: EngagementConfig,
    detector: Option<CueDetector>,
    scorer: ScoreCalculator,
    aggregator: TemporalAggregator,
    selector: InterventionSelector,
    frame_count: u64,
}

impl EngagementEngine {
    /// Create an engine around an already-built detector (or none).
    ///
    /// `config` is taken as already validated.
    pub fn new(config: EngagementConfig, detector: Option<CueDetector>) -> Self {
        let thresholds = config.thresholds();
        debug!(
            sensitivity = config.sensitivity,
            drop = thresholds.drop,
            critical = thresholds.critical,
            warning = thresholds.warning,
            "Engagement thresholds"
        );
        Self {
            scorer: ScoreCalculator::new(&thresholds),
            aggregator: TemporalAggregator::new(&config.history, &thresholds),
            selector: InterventionSelector::new(),
            detector,
            config,
            frame_count: 0,
        }
    }

    /// Validate the config and load the detector models.
    ///
    /// Fails with [`EngagementError::DetectorUnavailable`] when a model is
    /// missing or cannot be loaded.
    pub fn from_config(config: EngagementConfig) -> Result<Self, EngagementError> {
        config.validate()?;
        let detector = CueDetector::new(&config.detector)?;
        Ok(Self::new(config, Some(detector)))
    }

    /// Validate the config and build an engine that scores every frame as
    /// containing no faces
    pub fn without_detector(config: EngagementConfig) -> Result<Self, EngagementError> {
        config.validate()?;
        warn!("Cue detector unavailable; every frame will be scored as empty");
        Ok(Self::new(config, None))
    }

    pub fn detector_ready(&self) -> bool {
        self.detector.is_some()
    }

    /// Analyze one frame and append its score to the history.
    ///
    /// Invalid frames are rejected before anything is recorded.
    pub fn analyze_frame(&mut self, frame: &VideoFrame) -> Result<FrameResult, EngagementError> {
        frame.validate()?;

        let detection = match &self.detector {
            Some(detector) => detector.detect(frame)?,
            None => Detection::default(),
        };
        let counts = detection.counts();
        let outcome = self.scorer.score(&counts);

        let previous = self.aggregator.latest();
        self.aggregator.record(outcome.score);
        self.frame_count += 1;

        let drop_threshold = self.aggregator.drop_threshold();
        if previous.is_some_and(|p| p >= drop_threshold) && outcome.score < drop_threshold {
            info!(
                frame = self.frame_count,
                score = outcome.score,
                threshold = drop_threshold,
                "Engagement drop"
            );
        }

        debug!(
            frame = self.frame_count,
            faces = counts.faces,
            eyes = counts.eyes,
            head_down = counts.head_down,
            distracted = counts.distracted,
            score = outcome.score,
            "Frame scored"
        );

        Ok(FrameResult {
            frame_index: self.frame_count,
            timestamp_ns: frame.timestamp_ns,
            faces_detected: counts.faces,
            eyes_detected: counts.eyes,
            head_down_count: counts.head_down,
            distracted_count: counts.distracted,
            engagement_score: outcome.score,
            alerts: outcome.alerts,
            detection,
        })
    }

    /// Interventions for a frame's score and alerts
    pub fn interventions(&self, result: &FrameResult) -> Vec<Intervention> {
        self.selector.select(result.engagement_score, &result.alert_messages())
    }

    /// Interventions for an arbitrary score and alert texts
    pub fn select<S: AsRef<str>>(&self, score: f64, alerts: &[S]) -> Vec<Intervention> {
        self.selector.select(score, alerts)
    }

    pub fn summary_stats(&self) -> SummaryStats {
        self.aggregator.stats()
    }

    pub fn aggregator(&self) -> &TemporalAggregator {
        &self.aggregator
    }

    pub fn selector(&self) -> &InterventionSelector {
        &self.selector
    }

    /// Frames analysed since creation or the last reset
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn config(&self) -> &EngagementConfig {
        &self.config
    }

    /// Clear history (new session)
    pub fn reset(&mut self) {
        self.aggregator.clear();
        self.frame_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Trend;
    use crate::intervention::Priority;
    use crate::result::EngagementLevel;
    use crate::score::Alert;
    use cue_detector::{BoundingBox, Classifier, DetectorError, ScanParams};
    use image::GrayImage;

    /// Face classifier reporting fixed boxes
    struct Faces(Vec<BoundingBox>);

    impl Classifier for Faces {
        fn detect(
            &self,
            _gray: &GrayImage,
            _params: &ScanParams,
        ) -> Result<Vec<BoundingBox>, DetectorError> {
            Ok(self.0.clone())
        }
    }

    /// Eye classifier reporting the same boxes for every face region
    struct Eyes(Vec<BoundingBox>);

    impl Classifier for Eyes {
        fn detect(
            &self,
            _gray: &GrayImage,
            _params: &ScanParams,
        ) -> Result<Vec<BoundingBox>, DetectorError> {
            Ok(self.0.clone())
        }
    }

    fn engine(faces: usize, eyes_per_face: usize) -> EngagementEngine {
        let config = EngagementConfig::default();
        let face_boxes = (0..faces).map(|i| BoundingBox::new(i as u32 * 70, 10, 60, 60)).collect();
        let eye_boxes = (0..eyes_per_face)
            .map(|i| BoundingBox::new(5 + i as u32 * 25, 10, 20, 20))
            .collect();
        let detector = CueDetector::with_classifiers(
            Box::new(Faces(face_boxes)),
            Box::new(Eyes(eye_boxes)),
            &config.detector,
        );
        EngagementEngine::new(config, Some(detector))
    }

    fn frame(seq: u32) -> VideoFrame {
        VideoFrame::filled(320, 120, [120, 120, 120], seq as u64 * 40_000_000, seq)
    }

    #[test]
    fn test_all_engaged() {
        let mut engine = engine(4, 2);
        let result = engine.analyze_frame(&frame(1)).unwrap();
        assert_eq!(result.faces_detected, 4);
        assert_eq!(result.eyes_detected, 8);
        assert_eq!(result.engagement_score, 100.0);
        assert!(result.is_on_task());
        assert_eq!(result.level(), EngagementLevel::High);
        assert_eq!(result.frame_index, 1);
        assert_eq!(result.timestamp_ns, 40_000_000);
    }

    #[test]
    fn test_head_down_frame_drives_interventions() {
        let mut engine = engine(4, 0);
        let result = engine.analyze_frame(&frame(1)).unwrap();
        assert!((result.engagement_score - 55.0).abs() < 1e-9);
        assert_eq!(result.head_down_count, 4);
        assert_eq!(result.alerts[0], Alert::HeadDown { count: 4 });

        let interventions = engine.interventions(&result);
        assert_eq!(interventions.len(), 4);
        assert_eq!(
            interventions[0].action,
            "Check on student(s) with head down — possible distress"
        );
        assert_eq!(interventions[1].priority, Priority::High);
        assert_eq!(interventions[1].action, "Gently tap on desks as you patrol");
    }

    #[test]
    fn test_without_detector_rejects_invalid_config() {
        let mut config = EngagementConfig::default();
        config.history.capacity = 30;
        config.history.trend_window = 40;
        let result = EngagementEngine::without_detector(config);
        assert!(matches!(result, Err(EngagementError::Config(_))));

        let result = EngagementEngine::without_detector(EngagementConfig {
            sensitivity: 0,
            ..Default::default()
        });
        assert!(matches!(result, Err(EngagementError::Config(_))));
    }

    #[test]
    fn test_without_detector_records_empty_frames() {
        let mut engine = EngagementEngine::without_detector(EngagementConfig::default()).unwrap();
        assert!(!engine.detector_ready());

        let result = engine.analyze_frame(&frame(1)).unwrap();
        assert_eq!(result.faces_detected, 0);
        assert!((result.engagement_score - 95.0).abs() < 1e-9);
        assert_eq!(result.level(), EngagementLevel::NoFace);
        assert_eq!(engine.aggregator().len(), 1);
    }

    #[test]
    fn test_from_config_without_models_fails() {
        let result = EngagementEngine::from_config(EngagementConfig::default());
        assert!(matches!(result, Err(EngagementError::DetectorUnavailable(_))));
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let config = EngagementConfig {
            sensitivity: 42,
            ..Default::default()
        };
        assert!(matches!(EngagementEngine::from_config(config), Err(EngagementError::Config(_))));
    }

    #[test]
    fn test_invalid_frame_leaves_history_untouched() {
        let mut engine = engine(1, 2);
        engine.analyze_frame(&frame(1)).unwrap();

        let bad = VideoFrame::new(vec![0; 3], 4, 4, 0, 2);
        assert!(matches!(engine.analyze_frame(&bad), Err(EngagementError::InvalidFrame(_))));
        assert_eq!(engine.aggregator().len(), 1);
        assert_eq!(engine.frame_count(), 1);
    }

    #[test]
    fn test_summary_tracks_history() {
        let mut engine = engine(2, 2);
        for seq in 1..=40 {
            engine.analyze_frame(&frame(seq)).unwrap();
        }
        let stats = engine.summary_stats();
        assert_eq!(stats.avg, 100.0);
        assert_eq!(stats.min, 100.0);
        assert_eq!(stats.trend, Trend::Stable);
        assert_eq!(stats.drop_events, 0);

        engine.reset();
        assert_eq!(engine.frame_count(), 0);
        assert_eq!(engine.summary_stats().trend, Trend::InsufficientData);
    }

    #[test]
    fn test_select_passthrough() {
        let engine = EngagementEngine::without_detector(EngagementConfig::default()).unwrap();
        let list = engine.select(90.0, &["WARNING: Moderate engagement drop detected"]);
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|i| i.priority == Priority::Low));
    }
}

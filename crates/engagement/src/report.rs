//! Whole-session report for recorded video

use serde::{Deserialize, Serialize};

use crate::intervention::{Intervention, InterventionSelector};
use crate::result::FrameResult;

/// Frame rate assumed when the source does not report one
pub const DEFAULT_FPS: f64 = 25.0;

/// Score below which a frame is listed as a drop
const DROP_SCORE: f64 = 60.0;
/// Score below which a frame counts as critical
const CRITICAL_SCORE: f64 = 40.0;
/// Pull toward the session minimum when choosing the intervention tier
const MIN_SCORE_PULL: f64 = 0.4;

const PHASES: [(&str, f64, f64); 4] = [
    ("Opening Phase", 0.0, 0.25),
    ("Early Phase", 0.25, 0.5),
    ("Mid Phase", 0.5, 0.75),
    ("Final Phase", 0.75, 1.01),
];

/// One analysed frame of a recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// 1-based index of the frame in the source stream
    pub frame: u64,
    pub time_s: f64,
    pub score: f64,
    pub faces: usize,
    /// Number of frame alerts
    pub alerts: usize,
}

impl SessionRecord {
    /// Build a record for source frame `frame`; `fps <= 0` falls back to 25
    pub fn from_result(frame: u64, fps: f64, result: &FrameResult) -> Self {
        let fps = if fps > 0.0 && fps.is_finite() { fps } else { DEFAULT_FPS };
        Self {
            frame,
            time_s: frame as f64 / fps,
            score: result.engagement_score,
            faces: result.faces_detected,
            alerts: result.alerts.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Good,
    Watch,
    Critical,
}

impl PhaseStatus {
    pub fn from_avg(avg: f64) -> Self {
        if avg >= 70.0 {
            PhaseStatus::Good
        } else if avg >= 50.0 {
            PhaseStatus::Watch
        } else {
            PhaseStatus::Critical
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub name: String,
    pub avg_score: f64,
    pub min_score: f64,
    pub alerts: usize,
    pub status: PhaseStatus,
}

/// Frame that scored below the drop line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropRow {
    /// `mm:ss`
    pub time: String,
    pub score: f64,
    pub faces: usize,
    pub alerts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub frames_analyzed: usize,
    pub avg_score: f64,
    pub min_score: f64,
    pub max_score: f64,
    /// Time of the first lowest-scoring frame
    pub min_time_s: f64,
    pub min_time: String,
    pub total_alerts: usize,
    pub drop_frames: usize,
    pub critical_frames: usize,
    /// Frames with no faces found (heads down or away)
    pub head_down_frames: usize,
    pub alerts: Vec<String>,
    pub intervention_score: f64,
    pub interventions: Vec<Intervention>,
    pub phases: Vec<PhaseSummary>,
    pub drops: Vec<DropRow>,
}

impl SessionReport {
    /// Summarize a recording. Returns `None` when nothing was analysed.
    pub fn build(records: &[SessionRecord], selector: &InterventionSelector) -> Option<Self> {
        let first = records.first()?;
        let n = records.len();

        let avg_score = records.iter().map(|r| r.score).sum::<f64>() / n as f64;
        let mut lowest = first;
        for r in records {
            if r.score < lowest.score {
                lowest = r;
            }
        }
        let max_score = records.iter().map(|r| r.score).fold(f64::MIN, f64::max);

        let total_alerts: usize = records.iter().map(|r| r.alerts).sum();
        let drop_frames = records.iter().filter(|r| r.score < DROP_SCORE).count();
        let critical_frames = records.iter().filter(|r| r.score < CRITICAL_SCORE).count();
        let head_down_frames = records.iter().filter(|r| r.faces == 0).count();

        let mut alerts = Vec::new();
        if critical_frames > 0 {
            alerts.push("CRITICAL: Engagement dropped below 40%".to_string());
        }
        if drop_frames as f64 > n as f64 * 0.3 {
            alerts.push("Sustained engagement drop across 30%+ of video".to_string());
        }
        if head_down_frames as f64 > n as f64 * 0.2 {
            alerts.push("Frequent head-down / faces not visible detected".to_string());
        }
        if total_alerts > 5 {
            alerts.push("Multiple distraction events logged".to_string());
        }

        let min_score = lowest.score;
        let intervention_score =
            avg_score.min(min_score + (avg_score - min_score) * MIN_SCORE_PULL);
        let interventions = selector.select(intervention_score, &alerts);

        let drops = records
            .iter()
            .filter(|r| r.score < DROP_SCORE)
            .map(|r| DropRow {
                time: format_mm_ss(r.time_s),
                score: r.score,
                faces: r.faces,
                alerts: r.alerts,
            })
            .collect();

        Some(Self {
            frames_analyzed: n,
            avg_score,
            min_score,
            max_score,
            min_time_s: lowest.time_s,
            min_time: format_mm_ss(lowest.time_s),
            total_alerts,
            drop_frames,
            critical_frames,
            head_down_frames,
            alerts,
            intervention_score,
            interventions,
            phases: phases(records),
            drops,
        })
    }
}

/// Split the recording into four phases by fraction of its final timestamp
fn phases(records: &[SessionRecord]) -> Vec<PhaseSummary> {
    let total = records.iter().map(|r| r.time_s).fold(0.0, f64::max);

    PHASES
        .iter()
        .filter_map(|&(name, start, end)| {
            let segment: Vec<&SessionRecord> = records
                .iter()
                .filter(|r| r.time_s >= start * total && r.time_s < end * total)
                .collect();
            if segment.is_empty() {
                return None;
            }
            let avg_score = segment.iter().map(|r| r.score).sum::<f64>() / segment.len() as f64;
            Some(PhaseSummary {
                name: name.to_string(),
                avg_score,
                min_score: segment.iter().map(|r| r.score).fold(f64::MAX, f64::min),
                alerts: segment.iter().map(|r| r.alerts).sum(),
                status: PhaseStatus::from_avg(avg_score),
            })
        })
        .collect()
}

/// `mm:ss`, truncating fractional seconds
pub fn format_mm_ss(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intervention::Priority;

    fn record(frame: u64, score: f64, faces: usize, alerts: usize) -> SessionRecord {
        SessionRecord {
            frame,
            time_s: frame as f64 / DEFAULT_FPS,
            score,
            faces,
            alerts,
        }
    }

    fn build(records: &[SessionRecord]) -> SessionReport {
        SessionReport::build(records, &InterventionSelector::new()).unwrap()
    }

    #[test]
    fn test_empty_session_has_no_report() {
        assert!(SessionReport::build(&[], &InterventionSelector::new()).is_none());
    }

    #[test]
    fn test_healthy_session() {
        let records: Vec<_> = (1..=8).map(|i| record(i * 2, 100.0, 3, 0)).collect();
        let report = build(&records);
        assert_eq!(report.frames_analyzed, 8);
        assert_eq!(report.avg_score, 100.0);
        assert!(report.alerts.is_empty());
        assert!(report.drops.is_empty());
        assert_eq!(report.interventions[0].action, "Continue standard monitoring");
        assert!(report.phases.iter().all(|p| p.status == PhaseStatus::Good));
    }

    #[test]
    fn test_session_alerts_and_intervention_score() {
        // 10 records: 2 critical, 4 below 60, 3 with no faces, 7 alerts total
        let scores = [95.0, 95.0, 80.0, 55.0, 35.0, 30.0, 58.0, 95.0, 90.0, 80.0];
        let faces = [0, 0, 3, 3, 3, 3, 3, 0, 3, 3];
        let alerts = [0, 0, 0, 2, 2, 2, 1, 0, 0, 0];
        let records: Vec<_> = (0..10)
            .map(|i| record(i as u64 + 1, scores[i], faces[i], alerts[i]))
            .collect();
        let report = build(&records);

        assert_eq!(report.critical_frames, 2);
        assert_eq!(report.drop_frames, 4);
        assert_eq!(report.head_down_frames, 3);
        assert_eq!(report.total_alerts, 7);
        assert_eq!(
            report.alerts,
            vec![
                "CRITICAL: Engagement dropped below 40%",
                "Sustained engagement drop across 30%+ of video",
                "Frequent head-down / faces not visible detected",
                "Multiple distraction events logged",
            ]
        );

        // avg 71.3, min 30: 30 + 41.3 * 0.4 = 46.52
        assert!((report.intervention_score - 46.52).abs() < 1e-9);
        assert_eq!(report.min_score, 30.0);
        assert_eq!(report.interventions.len(), 3);
        assert_eq!(report.interventions[0].priority, Priority::High);
        assert_eq!(report.interventions[0].action, "Gently tap on desks as you patrol");
    }

    #[test]
    fn test_min_time_is_first_minimum() {
        let records = vec![
            record(25, 80.0, 2, 0),
            record(50, 40.0, 2, 1),
            record(1525, 40.0, 2, 1),
        ];
        let report = build(&records);
        assert_eq!(report.min_time_s, 2.0);
        assert_eq!(report.min_time, "00:02");
        assert_eq!(report.drops.len(), 2);
        assert_eq!(report.drops[1].time, "01:01");
    }

    #[test]
    fn test_phases_split_by_time() {
        // Times 1..=8 s: Opening [0,2), Early [2,4), Mid [4,6), Final [6,8.08)
        let records: Vec<_> = (1..=8)
            .map(|s| SessionRecord {
                frame: s * 25,
                time_s: s as f64,
                score: if s <= 4 { 90.0 } else { 45.0 },
                faces: 2,
                alerts: 1,
            })
            .collect();
        let report = build(&records);

        let names: Vec<&str> = report.phases.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Opening Phase", "Early Phase", "Mid Phase", "Final Phase"]);
        assert_eq!(report.phases[0].alerts, 1);
        assert_eq!(report.phases[1].alerts, 2);
        assert_eq!(report.phases[3].alerts, 3);
        assert_eq!(report.phases[0].status, PhaseStatus::Good);
        assert_eq!(report.phases[2].status, PhaseStatus::Watch);
        assert_eq!(report.phases[3].status, PhaseStatus::Critical);
    }

    #[test]
    fn test_record_defaults_fps() {
        let result = FrameResult {
            frame_index: 1,
            timestamp_ns: 0,
            faces_detected: 2,
            eyes_detected: 4,
            head_down_count: 0,
            distracted_count: 0,
            engagement_score: 100.0,
            alerts: vec![],
            detection: Default::default(),
        };
        assert_eq!(SessionRecord::from_result(50, 0.0, &result).time_s, 2.0);
        assert_eq!(SessionRecord::from_result(50, 10.0, &result).time_s, 5.0);
    }

    #[test]
    fn test_format_mm_ss() {
        assert_eq!(format_mm_ss(0.0), "00:00");
        assert_eq!(format_mm_ss(59.9), "00:59");
        assert_eq!(format_mm_ss(125.4), "02:05");
    }
}

//! Invigilator intervention selection

use serde::{Deserialize, Serialize};

/// Maximum interventions returned per query
pub const MAX_INTERVENTIONS: usize = 4;

/// Intervention priority, most urgent first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Immediate,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Immediate => "IMMEDIATE",
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

/// Recommended invigilator action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intervention {
    pub priority: Priority,
    pub action: String,
    pub rationale: String,
}

struct Template {
    priority: Priority,
    action: &'static str,
    rationale: &'static str,
}

impl Template {
    fn build(&self) -> Intervention {
        Intervention {
            priority: self.priority,
            action: self.action.to_string(),
            rationale: self.rationale.to_string(),
        }
    }
}

const CRITICAL_TIER: &[Template] = &[
    Template {
        priority: Priority::Immediate,
        action: "Announce a 2-minute stretch break",
        rationale: "Critical engagement drop — physical reset reactivates attention",
    },
    Template {
        priority: Priority::Immediate,
        action: "Walk through the exam hall slowly",
        rationale: "Invigilator presence re-focuses distracted students",
    },
    Template {
        priority: Priority::High,
        action: "Verbal reminder: 'Check your time remaining'",
        rationale: "Time-pressure cue re-engages task focus",
    },
];

const LOW_TIER: &[Template] = &[
    Template {
        priority: Priority::High,
        action: "Gently tap on desks as you patrol",
        rationale: "Low-stimulus alert for students showing fatigue signs",
    },
    Template {
        priority: Priority::High,
        action: "Write remaining time on whiteboard",
        rationale: "Visual time anchoring improves self-regulation",
    },
    Template {
        priority: Priority::Medium,
        action: "Open/close a window for air circulation",
        rationale: "Environmental refresh counters cognitive fatigue",
    },
];

const MODERATE_TIER: &[Template] = &[
    Template {
        priority: Priority::Medium,
        action: "Slow patrol of room perimeter",
        rationale: "Passive supervision signal maintains focus",
    },
    Template {
        priority: Priority::Medium,
        action: "Soft verbal: 'You have X minutes remaining'",
        rationale: "Time reminder at mid-drop prevents further decline",
    },
    Template {
        priority: Priority::Low,
        action: "Ensure water is accessible to students",
        rationale: "Hydration supports sustained cognitive performance",
    },
];

const HEALTHY_TIER: &[Template] = &[
    Template {
        priority: Priority::Low,
        action: "Continue standard monitoring",
        rationale: "Engagement is healthy — maintain current environment",
    },
    Template {
        priority: Priority::Low,
        action: "Note time of high engagement for reporting",
        rationale: "Baseline data helps identify optimal exam scheduling",
    },
];

const DISTRESS_CHECK: Template = Template {
    priority: Priority::High,
    action: "Check on student(s) with head down — possible distress",
    rationale: "Head-down posture can indicate anxiety, fatigue, or cheating",
};

/// Alert text that triggers the distress check (matched case-insensitively)
const HEAD_DOWN_MARKER: &str = "head down";

/// Score band selecting the base intervention list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// score < 40
    Critical,
    /// 40 <= score < 60
    Low,
    /// 60 <= score < 75
    Moderate,
    /// score >= 75
    Healthy,
}

impl Tier {
    pub fn for_score(score: f64) -> Self {
        if score < 40.0 {
            Tier::Critical
        } else if score < 60.0 {
            Tier::Low
        } else if score < 75.0 {
            Tier::Moderate
        } else {
            Tier::Healthy
        }
    }

    fn templates(&self) -> &'static [Template] {
        match self {
            Tier::Critical => CRITICAL_TIER,
            Tier::Low => LOW_TIER,
            Tier::Moderate => MODERATE_TIER,
            Tier::Healthy => HEALTHY_TIER,
        }
    }
}

/// Maps a score and alerts to a ranked, capped intervention list
#[derive(Debug, Clone, Default)]
pub struct InterventionSelector;

impl InterventionSelector {
    pub fn new() -> Self {
        Self
    }

    /// Select up to four interventions.
    ///
    /// The first alert mentioning "head down" puts the distress check in
    /// front of the tier list; later matches are ignored.
    pub fn select<S: AsRef<str>>(&self, score: f64, alerts: &[S]) -> Vec<Intervention> {
        let mut interventions: Vec<Intervention> =
            Tier::for_score(score).templates().iter().map(Template::build).collect();

        let head_down = alerts
            .iter()
            .any(|alert| alert.as_ref().to_lowercase().contains(HEAD_DOWN_MARKER));
        if head_down {
            interventions.insert(0, DISTRESS_CHECK.build());
        }

        interventions.truncate(MAX_INTERVENTIONS);
        interventions
    }
}

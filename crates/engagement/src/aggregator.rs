//! Rolling engagement history and trailing statistics

use std::fmt;

use ring_buffer::RingBuffer;
use serde::{Deserialize, Serialize};

use crate::config::{HistoryConfig, Thresholds};

/// Direction of recent engagement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
    /// Fewer samples than the trend window
    InsufficientData,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Rising => "rising",
            Trend::Falling => "falling",
            Trend::Stable => "stable",
            Trend::InsufficientData => "collecting",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics over the rolling history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub trend: Trend,
    /// Downward crossings of the drop threshold
    pub drop_events: usize,
}

impl Default for SummaryStats {
    fn default() -> Self {
        Self {
            avg: 0.0,
            min: 0.0,
            max: 0.0,
            trend: Trend::InsufficientData,
            drop_events: 0,
        }
    }
}

/// Owns the score history
#[derive(Debug, Clone)]
pub struct TemporalAggregator {
    history: RingBuffer<f64>,
    trend_window: usize,
    trend_delta: f64,
    drop_threshold: f64,
}

impl TemporalAggregator {
    pub fn new(config: &HistoryConfig, thresholds: &Thresholds) -> Self {
        Self {
            history: RingBuffer::new(config.capacity),
            trend_window: config.trend_window,
            trend_delta: config.trend_delta,
            drop_threshold: thresholds.drop,
        }
    }

    /// Append a score, evicting the oldest when full
    pub fn record(&mut self, score: f64) {
        self.history.push(score);
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.history.capacity()
    }

    pub fn latest(&self) -> Option<f64> {
        self.history.latest().copied()
    }

    pub fn drop_threshold(&self) -> f64 {
        self.drop_threshold
    }

    /// Scores oldest first
    pub fn history(&self) -> Vec<f64> {
        self.history.to_vec()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Compute statistics over the current window
    pub fn stats(&self) -> SummaryStats {
        if self.history.is_empty() {
            return SummaryStats::default();
        }

        let n = self.history.len() as f64;
        let avg = self.history.iter().sum::<f64>() / n;
        let min = self.history.iter().copied().fold(f64::MAX, f64::min);
        let max = self.history.iter().copied().fold(f64::MIN, f64::max);

        SummaryStats {
            avg,
            min,
            max,
            trend: self.trend(),
            drop_events: self.drop_events(),
        }
    }

    /// Compare the mean of the newest half-window with the half before it
    pub fn trend(&self) -> Trend {
        if self.history.len() < self.trend_window {
            return Trend::InsufficientData;
        }

        let half = self.trend_window / 2;
        let window: Vec<f64> = self.history.iter_last(self.trend_window).copied().collect();
        let (prev, recent) = window.split_at(half);
        let diff = mean(recent) - mean(prev);

        if diff > self.trend_delta {
            Trend::Rising
        } else if diff < -self.trend_delta {
            Trend::Falling
        } else {
            Trend::Stable
        }
    }

    /// Count transitions from at-or-above the drop threshold to below it
    pub fn drop_events(&self) -> usize {
        self.history
            .iter()
            .zip(self.history.iter().skip(1))
            .filter(|(prev, cur)| **prev >= self.drop_threshold && **cur < self.drop_threshold)
            .count()
    }
}

impl Default for TemporalAggregator {
    fn default() -> Self {
        Self::new(&HistoryConfig::default(), &Thresholds::NOMINAL)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

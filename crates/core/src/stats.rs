//! Aggregate result types returned by window queries

use crate::run::RunSummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Latency at one percentile of the completed-run population
///
/// `latency` is `None` when there were no completed runs to measure. That is
/// "no data", not zero latency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyPercentile {
    /// Requested percentile in `[0, 100]`
    pub percentile: f64,
    /// Interpolated latency in milliseconds
    pub latency: Option<f64>,
}

/// Distribution of feedback values observed under one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackCount {
    /// Feedback key
    pub key: String,
    /// Feedback label -> number of runs carrying it
    pub counts: BTreeMap<String, u64>,
}

impl FeedbackCount {
    /// Number of runs carrying feedback under this key
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

/// Result of a windowed run summary
///
/// All three parts are computed from the same filtered run population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSummary {
    /// Latency percentiles over completed runs
    pub latency_percentiles: Vec<LatencyPercentile>,
    /// Matching runs, newest first
    pub runs: Vec<RunSummary>,
    /// Feedback distributions, sorted by key
    pub feedback_counts: Vec<FeedbackCount>,
    /// Number of runs listed
    pub record_count: usize,
}

impl WindowSummary {
    /// Check if the window held no runs
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Look up the feedback distribution for a key
    pub fn feedback_for(&self, key: &str) -> Option<&FeedbackCount> {
        self.feedback_counts.iter().find(|fc| fc.key == key)
    }

    /// Look up the latency at a requested percentile
    pub fn latency_at(&self, percentile: f64) -> Option<f64> {
        self.latency_percentiles
            .iter()
            .find(|lp| lp.percentile == percentile)
            .and_then(|lp| lp.latency)
    }
}

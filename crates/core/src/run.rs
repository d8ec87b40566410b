//! Run-level types
//!
//! A run is a read-time aggregate of all spans sharing a `run_id`. It has no
//! independent lifecycle: it is recomputed from its root span on every query
//! and never cached across queries.

use crate::span::{Feedback, Span};
use crate::types::{ProjectId, RunId, SpanTime};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a span or run
///
/// Derived from a span's error and end time:
/// - Errored: an error is recorded (dominates completion)
/// - Completed: no error, valid end time
/// - InProgress: no error, no end time
/// - Indeterminate: no error, end time present but unparseable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanStatus {
    /// Finished without error
    Completed,
    /// Failed
    Errored,
    /// Still running
    InProgress,
    /// Timing data could not be interpreted
    Indeterminate,
}

impl SpanStatus {
    /// Check if the span finished without error
    pub fn is_completed(&self) -> bool {
        matches!(self, SpanStatus::Completed)
    }

    /// Check if the span failed
    pub fn is_errored(&self) -> bool {
        matches!(self, SpanStatus::Errored)
    }

    /// Check if the span is still running
    pub fn is_in_progress(&self) -> bool {
        matches!(self, SpanStatus::InProgress)
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanStatus::Completed => "completed",
            SpanStatus::Errored => "errored",
            SpanStatus::InProgress => "in_progress",
            SpanStatus::Indeterminate => "indeterminate",
        }
    }
}

impl std::fmt::Display for SpanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// List-level summary of one run, derived from its root span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Run identifier
    pub run_id: RunId,
    /// Owning project
    pub project_id: ProjectId,
    /// Root span name
    pub name: String,
    /// Root span start
    pub start_time: Option<SpanTime>,
    /// Root span end
    pub end_time: Option<SpanTime>,
    /// Root span `end_time - start_time` in milliseconds, absent if not ended
    pub latency_ms: Option<u64>,
    /// Derived lifecycle status
    pub status: SpanStatus,
    /// Root span error, if any
    pub error: Option<String>,
    /// Root span feedback, used for list-level display and filtering
    pub feedback: Option<Feedback>,
}

impl RunSummary {
    /// Build a summary from a root span and its resolved status
    pub fn from_root(root: &Span, status: SpanStatus) -> Self {
        Self {
            run_id: root.run_id.clone(),
            project_id: root.project_id.clone(),
            name: root.name.clone(),
            start_time: root.start_time.clone(),
            end_time: root.end_time.clone(),
            latency_ms: root.latency_ms(),
            status,
            error: root.error.clone(),
            feedback: root.feedback.clone(),
        }
    }

    /// Latency that may enter percentile statistics
    ///
    /// Only completed runs with a measurable latency contribute.
    pub fn completed_latency_ms(&self) -> Option<u64> {
        if self.status.is_completed() {
            self.latency_ms
        } else {
            None
        }
    }
}

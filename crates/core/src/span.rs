//! Span records as ingested from the span data source
//!
//! A span is a single recorded unit of work. Spans are flat records; the
//! hierarchy of a run is implied by `parent_id` and reconstructed at read
//! time by the tree builder.

use crate::types::{ProjectId, RunId, SpanId, SpanTime};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reviewer annotation attached to a span
///
/// Only the root span's feedback is used at list level (display, filtering
/// and feedback counts).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    /// Feedback key (e.g. "thumbs", "correctness")
    pub key: String,
    /// Feedback value as recorded
    pub value: String,
    /// Optional numeric score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Feedback {
    /// Create feedback without a score
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            score: None,
        }
    }

    /// Attach a numeric score
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// The label used for display and counting
    ///
    /// The score wins when present, otherwise the raw value. Scores use the
    /// shortest `f64` display, so `1.0` is labelled `"1"`.
    pub fn label(&self) -> String {
        match self.score {
            Some(score) => score.to_string(),
            None => self.value.clone(),
        }
    }
}

/// A single recorded unit of work
///
/// # Invariants
///
/// - `span_id` is unique within a run
/// - At most one span per run has no `parent_id` (the root)
/// - Every `parent_id` references a span of the same run
///
/// These invariants are not enforced at construction; the tree builder
/// validates them and reports violations as malformed traces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Unique identifier within the run
    pub span_id: SpanId,
    /// Owning run
    pub run_id: RunId,
    /// Parent span within the same run; `None` marks the root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<SpanId>,
    /// Owning project
    pub project_id: ProjectId,
    /// Human-readable operation label
    pub name: String,
    /// When the span started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<SpanTime>,
    /// When the span ended; `None` means still in progress
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<SpanTime>,
    /// Error descriptor; presence marks failure regardless of `end_time`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Reviewer annotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
}

impl Span {
    /// Create a root span with no timing, error or feedback
    pub fn new(
        run_id: impl Into<RunId>,
        span_id: impl Into<SpanId>,
        project_id: impl Into<ProjectId>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            span_id: span_id.into(),
            run_id: run_id.into(),
            parent_id: None,
            project_id: project_id.into(),
            name: name.into(),
            start_time: None,
            end_time: None,
            error: None,
            feedback: None,
        }
    }

    /// Set the parent span
    pub fn with_parent(mut self, parent_id: impl Into<SpanId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Set the start time
    pub fn with_start(mut self, start: impl Into<SpanTime>) -> Self {
        self.start_time = Some(start.into());
        self
    }

    /// Set the end time
    pub fn with_end(mut self, end: impl Into<SpanTime>) -> Self {
        self.end_time = Some(end.into());
        self
    }

    /// Mark the span as failed
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Attach feedback
    pub fn with_feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = Some(feedback);
        self
    }

    /// Check if this is a root span (no parent)
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Parsed start instant, if present and valid
    pub fn start_instant(&self) -> Option<DateTime<Utc>> {
        self.start_time.as_ref().and_then(SpanTime::instant)
    }

    /// Parsed end instant, if present and valid
    pub fn end_instant(&self) -> Option<DateTime<Utc>> {
        self.end_time.as_ref().and_then(SpanTime::instant)
    }

    /// Elapsed milliseconds between start and end
    ///
    /// `None` when either bound is absent or malformed, or when the end
    /// precedes the start.
    pub fn latency_ms(&self) -> Option<u64> {
        let start = self.start_instant()?;
        let end = self.end_instant()?;
        u64::try_from((end - start).num_milliseconds()).ok()
    }
}

//! Query types for windowed run listing
//!
//! ## Window convention
//!
//! | Bound | Absent | Present |
//! |-------|--------|---------|
//! | start | unbounded | inclusive |
//! | end | unbounded | exclusive |
//!
//! Half-open windows let adjacent windows tile time without double counting
//! a run that starts exactly on a boundary.

use crate::error::{Error, Result};
use crate::span::{Feedback, Span};
use crate::types::ProjectId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// Half-open time window `[start, end)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Inclusive lower bound
    pub start: Option<DateTime<Utc>>,
    /// Exclusive upper bound
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// A window with no bounds
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Create a window from optional bounds
    ///
    /// # Errors
    ///
    /// - `InvalidInput`: both bounds present and `start >= end`
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Result<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s >= e {
                return Err(Error::InvalidInput(format!(
                    "window start {} is not before end {}",
                    s.to_rfc3339(),
                    e.to_rfc3339()
                )));
            }
        }
        Ok(Self { start, end })
    }

    /// The window `[now - preset, now)`
    pub fn last(preset: WindowPreset, now: DateTime<Utc>) -> Self {
        Self {
            start: Some(now - preset.duration()),
            end: Some(now),
        }
    }

    /// Check if an instant falls inside the window
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| t >= s) && self.end.map_or(true, |e| t < e)
    }

    /// Check if the window has no bounds at all
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Relative window presets offered by the trace list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowPreset {
    /// Last hour
    #[serde(rename = "1h")]
    LastHour,
    /// Last 3 hours
    #[serde(rename = "3h")]
    Last3Hours,
    /// Last 12 hours
    #[serde(rename = "12h")]
    Last12Hours,
    /// Last 24 hours
    #[serde(rename = "24h")]
    LastDay,
    /// Last 3 days
    #[serde(rename = "3d")]
    Last3Days,
    /// Last 7 days
    #[serde(rename = "7d")]
    LastWeek,
    /// Last 30 days
    #[serde(rename = "30d")]
    Last30Days,
}

impl WindowPreset {
    /// Length of the window
    pub fn duration(&self) -> Duration {
        match self {
            WindowPreset::LastHour => Duration::hours(1),
            WindowPreset::Last3Hours => Duration::hours(3),
            WindowPreset::Last12Hours => Duration::hours(12),
            WindowPreset::LastDay => Duration::hours(24),
            WindowPreset::Last3Days => Duration::days(3),
            WindowPreset::LastWeek => Duration::days(7),
            WindowPreset::Last30Days => Duration::days(30),
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowPreset::LastHour => "1h",
            WindowPreset::Last3Hours => "3h",
            WindowPreset::Last12Hours => "12h",
            WindowPreset::LastDay => "24h",
            WindowPreset::Last3Days => "3d",
            WindowPreset::LastWeek => "7d",
            WindowPreset::Last30Days => "30d",
        }
    }
}

impl std::fmt::Display for WindowPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WindowPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "1h" => Ok(WindowPreset::LastHour),
            "3h" => Ok(WindowPreset::Last3Hours),
            "12h" => Ok(WindowPreset::Last12Hours),
            "24h" | "1d" => Ok(WindowPreset::LastDay),
            "3d" => Ok(WindowPreset::Last3Days),
            "7d" => Ok(WindowPreset::LastWeek),
            "30d" => Ok(WindowPreset::Last30Days),
            other => Err(Error::InvalidInput(format!("unknown window preset: {}", other))),
        }
    }
}

/// Feedback constraint on the run population
///
/// Maps a feedback key to the set of acceptable values:
/// - ANY value in the set matches within a key
/// - ALL keys must match
/// - An empty value set matches any feedback under that key
/// - An empty filter matches every run, with or without feedback
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackFilter {
    keys: BTreeMap<String, BTreeSet<String>>,
}

impl FeedbackFilter {
    /// A filter with no constraints
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `value` under `key` (adds to any values already accepted)
    pub fn allow(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.keys.entry(key.into()).or_default().insert(value.into());
        self
    }

    /// Require feedback under `key`, with any value
    pub fn require_key(mut self, key: impl Into<String>) -> Self {
        self.keys.entry(key.into()).or_default();
        self
    }

    /// Check if the filter has no constraints
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate over `(key, accepted values)`
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.keys.iter()
    }

    /// Check a run's feedback against the filter
    pub fn matches(&self, feedback: Option<&Feedback>) -> bool {
        if self.keys.is_empty() {
            return true;
        }
        let Some(feedback) = feedback else {
            return false;
        };
        self.keys.iter().all(|(key, values)| {
            key == &feedback.key
                && (values.is_empty()
                    || values.contains(&feedback.value)
                    || values.contains(&feedback.label()))
        })
    }
}

impl FromIterator<(String, String)> for FeedbackFilter {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(FeedbackFilter::new(), |filter, (k, v)| filter.allow(k, v))
    }
}

/// A windowed run listing request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowQuery {
    /// Restrict to one project; `None` means all projects
    pub project_id: Option<ProjectId>,
    /// Root start-time window
    pub window: TimeWindow,
    /// Feedback constraint on root spans
    pub feedback: FeedbackFilter,
}

impl WindowQuery {
    /// A query over all runs of all projects
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to a project
    pub fn project(mut self, project_id: impl Into<ProjectId>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Set the time window
    pub fn window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    /// Set the feedback filter
    pub fn feedback(mut self, feedback: FeedbackFilter) -> Self {
        self.feedback = feedback;
        self
    }

    /// Check a root span against project, window and feedback constraints
    ///
    /// A span without a valid start time only passes an unbounded window.
    pub fn admits(&self, span: &Span) -> bool {
        let project_ok = self
            .project_id
            .as_ref()
            .map_or(true, |p| p == &span.project_id);
        let time_ok = self.window.is_unbounded()
            || span.start_instant().map_or(false, |t| self.window.contains(t));
        project_ok && time_ok && self.feedback.matches(span.feedback.as_ref())
    }
}

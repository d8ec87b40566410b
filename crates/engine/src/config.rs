//! Engine configuration
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! percentiles = [50.0, 90.0, 95.0, 99.0]
//! fetch_timeout_ms = 30000
//! max_spans_per_run = 100000
//! max_tree_depth = 512
//! refilter_source_output = true
//! ```
//!
//! TOML has no null, so an omitted `fetch_timeout_ms` or `max_tree_depth`
//! takes its default. Removing either bound is only possible from code, with
//! `with_fetch_timeout(None)` or `with_max_tree_depth(None)`.

use crate::percentile::DEFAULT_PERCENTILES;
use runscope_core::{CancelSignal, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default deadline for one span source fetch
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;

/// Default cap on run tree depth
///
/// Cloning, comparing and serializing a tree recurse once per level.
pub const DEFAULT_MAX_TREE_DEPTH: usize = 512;

/// Trace engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Percentiles reported by window summaries, each in `[0, 100]`
    pub percentiles: Vec<f64>,

    /// Deadline applied when the caller supplies no cancellation signal.
    /// `None` waits indefinitely.
    pub fetch_timeout_ms: Option<u64>,

    /// Upper bound on spans in one run tree. `None` is unbounded.
    pub max_spans_per_run: Option<usize>,

    /// Upper bound on run tree depth (a lone root has depth 1).
    /// `None` is unbounded.
    pub max_tree_depth: Option<usize>,

    /// Re-apply the window query to source output
    ///
    /// Keeps the run list, percentiles and feedback counts derived from the
    /// same population even when a source over-returns.
    pub refilter_source_output: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            fetch_timeout_ms: Some(DEFAULT_FETCH_TIMEOUT_MS),
            max_spans_per_run: None,
            max_tree_depth: Some(DEFAULT_MAX_TREE_DEPTH),
            refilter_source_output: true,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(text)
            .map_err(|e| Error::InvalidInput(format!("invalid engine config: {}", e)))?;
        config.validate()
    }

    /// Load and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check field constraints, returning the config unchanged if valid
    ///
    /// # Errors
    ///
    /// - `InvalidInput`: empty percentile list, a percentile outside
    ///   `[0, 100]` or NaN, or a zero span or depth limit
    pub fn validate(self) -> Result<Self> {
        if self.percentiles.is_empty() {
            return Err(Error::InvalidInput(
                "percentiles must not be empty".to_string(),
            ));
        }
        if let Some(bad) = self
            .percentiles
            .iter()
            .find(|p| !(0.0..=100.0).contains(*p))
        {
            return Err(Error::InvalidInput(format!(
                "percentile {} outside [0, 100]",
                bad
            )));
        }
        if self.max_spans_per_run == Some(0) {
            return Err(Error::InvalidInput(
                "max_spans_per_run must be at least 1".to_string(),
            ));
        }
        if self.max_tree_depth == Some(0) {
            return Err(Error::InvalidInput(
                "max_tree_depth must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }

    /// Set the reported percentiles
    pub fn with_percentiles(mut self, percentiles: impl Into<Vec<f64>>) -> Self {
        self.percentiles = percentiles.into();
        self
    }

    /// Set the default fetch deadline
    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout_ms = timeout.map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Set the per-run span limit
    pub fn with_max_spans_per_run(mut self, limit: Option<usize>) -> Self {
        self.max_spans_per_run = limit;
        self
    }

    /// Set the run tree depth limit
    pub fn with_max_tree_depth(mut self, limit: Option<usize>) -> Self {
        self.max_tree_depth = limit;
        self
    }

    /// Enable or disable re-filtering of source output
    pub fn with_refilter(mut self, refilter: bool) -> Self {
        self.refilter_source_output = refilter;
        self
    }

    /// The default fetch deadline, if any
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    /// A fresh cancellation signal bound to the default deadline
    pub fn cancel_signal(&self) -> CancelSignal {
        match self.fetch_timeout() {
            Some(timeout) => CancelSignal::with_timeout(timeout),
            None => CancelSignal::new(),
        }
    }
}

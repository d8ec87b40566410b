//! Trace aggregation service
//!
//! Composes the span source, status resolver, tree builder, percentile
//! calculator and feedback aggregator behind two read operations:
//!
//! | Operation | Source call | Result |
//! |-----------|-------------|--------|
//! | `get_window_summary` | `fetch_window` | run list, percentiles, feedback counts |
//! | `get_run_tree` | `fetch_run_spans` | root node, or `None` for an unknown run |
//!
//! The service keeps no state between calls. Every result is recomputed from
//! a fresh fetch, so concurrent calls are independent.
//!
//! ## Cancellation
//!
//! The fetch is the only suspension point. The signal is checked before the
//! fetch, handed to the source, and checked again once the source returns, so
//! a fired signal never yields partial aggregates.

use crate::config::EngineConfig;
use crate::feedback::count_run_feedback;
use crate::percentile::latency_percentiles;
use crate::summary::summarize_roots;
use crate::tree::build_tree;
use runscope_core::{
    CancelSignal, Error, ProjectId, Result, RunId, TraceTreeNode, WindowQuery, WindowSummary,
};
use runscope_storage::SpanSource;
use std::collections::BTreeSet;
use tracing::{debug, instrument, warn};

/// Read-only query service over a span source
pub struct TraceService<S> {
    source: S,
    config: EngineConfig,
}

impl<S: SpanSource> TraceService<S> {
    /// Create a service with the default configuration
    pub fn new(source: S) -> Self {
        Self {
            source,
            config: EngineConfig::default(),
        }
    }

    /// Create a service with a validated configuration
    pub fn with_config(source: S, config: EngineConfig) -> Result<Self> {
        Ok(Self {
            source,
            config: config.validate()?,
        })
    }

    /// The underlying span source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Summarize the runs matching a window query
    ///
    /// Runs, latency percentiles and feedback counts all derive from the
    /// same filtered run population. Percentiles only measure completed
    /// runs; every listed run counts towards feedback.
    ///
    /// # Errors
    ///
    /// - `DataSource`: the source failed
    /// - `DuplicateRun`: the source returned roots of one run id from
    ///   several projects
    /// - `Cancelled`: the signal fired before the summary was complete
    #[instrument(
        skip(self, query, cancel),
        fields(
            source = self.source.name(),
            start = ?query.window.start,
            end = ?query.window.end,
        )
    )]
    pub fn get_window_summary(
        &self,
        query: &WindowQuery,
        cancel: &CancelSignal,
    ) -> Result<WindowSummary> {
        cancel.check()?;
        let mut spans = self.source.fetch_window(query, cancel)?;
        cancel.check()?;
        let fetched = spans.len();

        if self.config.refilter_source_output {
            spans.retain(|span| query.admits(span));
            if spans.len() < fetched {
                debug!(
                    dropped = fetched - spans.len(),
                    "Source returned spans outside the query"
                );
            }
        }

        let runs = summarize_roots(spans)?;
        let latencies: Vec<u64> = runs
            .iter()
            .filter_map(|run| run.completed_latency_ms())
            .collect();
        let latency_percentiles = latency_percentiles(&latencies, &self.config.percentiles);
        let feedback_counts = count_run_feedback(&runs);

        debug!(
            fetched,
            runs = runs.len(),
            completed = latencies.len(),
            feedback_keys = feedback_counts.len(),
            "Window summary computed"
        );

        Ok(WindowSummary {
            latency_percentiles,
            record_count: runs.len(),
            runs,
            feedback_counts,
        })
    }

    /// Reconstruct the span tree of one run
    ///
    /// Returns `Ok(None)` when the source holds no spans for the run.
    ///
    /// # Errors
    ///
    /// - `DataSource`: the source failed, or returned spans of another run
    /// - `DuplicateRun`: the run id spans several projects
    /// - `MalformedTrace`: the spans do not form exactly one tree
    /// - `InvalidInput`: the run exceeds `max_spans_per_run` or
    ///   `max_tree_depth`
    /// - `Cancelled`: the signal fired before the tree was complete
    #[instrument(skip(self, run_id, cancel), fields(source = self.source.name(), run_id = %run_id))]
    pub fn get_run_tree(
        &self,
        run_id: &RunId,
        cancel: &CancelSignal,
    ) -> Result<Option<TraceTreeNode>> {
        cancel.check()?;
        let spans = self.source.fetch_run_spans(run_id, cancel)?;
        cancel.check()?;

        if spans.is_empty() {
            debug!("No spans for run");
            return Ok(None);
        }

        if let Some(foreign) = spans.iter().find(|s| &s.run_id != run_id) {
            return Err(Error::data_source(
                self.source.name(),
                format!(
                    "requested run {} but received span {} of run {}",
                    run_id, foreign.span_id, foreign.run_id
                ),
            ));
        }

        let projects: BTreeSet<&ProjectId> = spans.iter().map(|s| &s.project_id).collect();
        if projects.len() > 1 {
            warn!(projects = projects.len(), "Run id resolves to several runs");
            return Err(Error::DuplicateRun {
                run_id: run_id.clone(),
                aggregates: projects.len(),
            });
        }

        if let Some(limit) = self.config.max_spans_per_run {
            if spans.len() > limit {
                return Err(Error::InvalidInput(format!(
                    "run {} has {} spans, limit is {}",
                    run_id,
                    spans.len(),
                    limit
                )));
            }
        }

        let span_count = spans.len();
        match build_tree(run_id, spans) {
            Ok(tree) => {
                let depth = tree.depth();
                if let Some(limit) = self.config.max_tree_depth {
                    if depth > limit {
                        return Err(Error::InvalidInput(format!(
                            "run {} is {} levels deep, limit is {}",
                            run_id, depth, limit
                        )));
                    }
                }
                debug!(spans = span_count, depth, "Run tree built");
                Ok(Some(tree))
            }
            Err(e) => {
                warn!(error = %e, "Rejected malformed trace");
                Err(e)
            }
        }
    }

    /// [`get_window_summary`](Self::get_window_summary) under the configured
    /// default deadline
    pub fn window_summary(&self, query: &WindowQuery) -> Result<WindowSummary> {
        self.get_window_summary(query, &self.config.cancel_signal())
    }

    /// [`get_run_tree`](Self::get_run_tree) under the configured default
    /// deadline
    pub fn run_tree(&self, run_id: &RunId) -> Result<Option<TraceTreeNode>> {
        self.get_run_tree(run_id, &self.config.cancel_signal())
    }
}

impl<S: SpanSource> std::fmt::Debug for TraceService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceService")
            .field("source", &self.source.name())
            .field("config", &self.config)
            .finish()
    }
}

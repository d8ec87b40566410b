//! Main entry point for Runscope.
//!
//! This module provides the `Runscope` struct: an in-memory span store with
//! the trace service on top of it.

use crate::error::Result;
use runscope_core::{CancelSignal, RunId, Span, TraceTreeNode, WindowQuery, WindowSummary};
use runscope_engine::{EngineConfig, TraceService};
use runscope_storage::{load_jsonl, load_jsonl_file, MemorySpanStore};
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// A span store with trace queries.
///
/// Create one with [`Runscope::ephemeral`], [`Runscope::from_jsonl`] or
/// [`Runscope::builder`].
///
/// # Example
///
/// ```ignore
/// use runscope::prelude::*;
///
/// let rs = Runscope::from_jsonl("./spans.jsonl")?;
///
/// // Newest-first run list with percentiles and feedback counts
/// let summary = rs.window_summary(&WindowQuery::all())?;
///
/// // Full span tree of one run
/// if let Some(tree) = rs.run_tree(&RunId::new("run-42"))? {
///     println!("{} spans", tree.node_count());
/// }
/// ```
pub struct Runscope {
    store: Arc<MemorySpanStore>,
    service: TraceService<Arc<MemorySpanStore>>,
}

impl Runscope {
    /// Create an empty store with default settings.
    ///
    /// Nothing touches disk; spans live until the handle is dropped.
    pub fn ephemeral() -> Result<Self> {
        Self::builder().open()
    }

    /// Create a store pre-loaded from a JSON-lines span file.
    pub fn from_jsonl(path: impl AsRef<Path>) -> Result<Self> {
        let rs = Self::ephemeral()?;
        rs.load_jsonl_file(path)?;
        Ok(rs)
    }

    /// Create a builder for configuration.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let rs = Runscope::builder()
    ///     .percentiles([50.0, 99.0])
    ///     .fetch_timeout(Duration::from_secs(5))
    ///     .open()?;
    /// ```
    pub fn builder() -> RunscopeBuilder {
        RunscopeBuilder::new()
    }

    /// Store one span, replacing any span with the same run, project and id.
    pub fn ingest(&self, span: Span) {
        self.store.insert(span);
    }

    /// Store a batch of spans, returning how many were stored.
    pub fn ingest_all(&self, spans: impl IntoIterator<Item = Span>) -> usize {
        self.store.insert_all(spans)
    }

    /// Load spans from a JSON-lines reader.
    pub fn load_jsonl<R: BufRead>(&self, reader: R) -> Result<usize> {
        Ok(load_jsonl(&self.store, reader)?)
    }

    /// Load spans from a JSON-lines file.
    pub fn load_jsonl_file(&self, path: impl AsRef<Path>) -> Result<usize> {
        Ok(load_jsonl_file(&self.store, path)?)
    }

    /// Summarize the runs matching a query, under the configured deadline.
    pub fn window_summary(&self, query: &WindowQuery) -> Result<WindowSummary> {
        Ok(self.service.window_summary(query)?)
    }

    /// Summarize the runs matching a query, under a caller signal.
    pub fn window_summary_with_cancel(
        &self,
        query: &WindowQuery,
        cancel: &CancelSignal,
    ) -> Result<WindowSummary> {
        Ok(self.service.get_window_summary(query, cancel)?)
    }

    /// Reconstruct one run's span tree, under the configured deadline.
    ///
    /// `Ok(None)` means the run has no spans.
    pub fn run_tree(&self, run_id: &RunId) -> Result<Option<TraceTreeNode>> {
        Ok(self.service.run_tree(run_id)?)
    }

    /// Reconstruct one run's span tree, under a caller signal.
    pub fn run_tree_with_cancel(
        &self,
        run_id: &RunId,
        cancel: &CancelSignal,
    ) -> Result<Option<TraceTreeNode>> {
        Ok(self.service.get_run_tree(run_id, cancel)?)
    }

    /// Remove every span of a run.
    pub fn remove_run(&self, run_id: &RunId) -> bool {
        self.store.remove_run(run_id)
    }

    /// Number of stored runs.
    pub fn run_count(&self) -> usize {
        self.store.run_count()
    }

    /// Number of stored spans.
    pub fn span_count(&self) -> usize {
        self.store.span_count()
    }

    /// The active engine configuration.
    pub fn config(&self) -> &EngineConfig {
        self.service.config()
    }

    /// The underlying span store.
    pub fn store(&self) -> &Arc<MemorySpanStore> {
        &self.store
    }
}

impl std::fmt::Debug for Runscope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runscope")
            .field("runs", &self.store.run_count())
            .field("spans", &self.store.span_count())
            .field("config", self.service.config())
            .finish()
    }
}

/// Builder for Runscope configuration.
///
/// # Example
///
/// ```ignore
/// // From a config file, with an explicit store name in logs
/// let rs = Runscope::builder()
///     .config_file("./runscope.toml")?
///     .name("staging")
///     .open()?;
///
/// // Tests: no deadline, trust the source
/// let rs = Runscope::builder()
///     .no_fetch_timeout()
///     .refilter(false)
///     .open()?;
/// ```
pub struct RunscopeBuilder {
    config: EngineConfig,
    name: Option<String>,
}

impl RunscopeBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            name: None,
        }
    }

    /// Replace the whole engine configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the engine configuration from a TOML file.
    pub fn config_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        self.config = EngineConfig::from_file(path)?;
        Ok(self)
    }

    /// Name the store in log output.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the reported percentiles.
    pub fn percentiles(mut self, percentiles: impl Into<Vec<f64>>) -> Self {
        self.config = self.config.with_percentiles(percentiles);
        self
    }

    /// Set the deadline applied to calls without a caller signal.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_fetch_timeout(Some(timeout));
        self
    }

    /// Remove the default deadline.
    pub fn no_fetch_timeout(mut self) -> Self {
        self.config = self.config.with_fetch_timeout(None);
        self
    }

    /// Cap the number of spans in one run tree.
    pub fn max_spans_per_run(mut self, limit: usize) -> Self {
        self.config = self.config.with_max_spans_per_run(Some(limit));
        self
    }

    /// Cap run tree depth; `None` removes the cap.
    pub fn max_tree_depth(mut self, limit: Option<usize>) -> Self {
        self.config = self.config.with_max_tree_depth(limit);
        self
    }

    /// Enable or disable re-filtering of source output.
    pub fn refilter(mut self, refilter: bool) -> Self {
        self.config = self.config.with_refilter(refilter);
        self
    }

    /// Validate the configuration and create the store.
    pub fn open(self) -> Result<Runscope> {
        let store = Arc::new(match self.name {
            Some(name) => MemorySpanStore::named(name),
            None => MemorySpanStore::new(),
        });
        let service = TraceService::with_config(Arc::clone(&store), self.config)?;
        Ok(Runscope { store, service })
    }
}

impl Default for RunscopeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

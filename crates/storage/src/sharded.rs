//! Sharded in-memory span store
//!
//! DashMap keyed by RunId, FxHashMap within each shard.
//!
//! # Design
//!
//! - DashMap: sharded by run, so fetching one run never contends with
//!   ingestion into another
//! - FxHashMap: O(1) span lookups within a run
//! - RootTimeIndex: root spans by start time, so window queries are a range
//!   scan instead of a full sweep
//!
//! Spans are keyed by `(project_id, span_id)` inside a shard. A run id reused
//! by two projects therefore keeps both span sets, which lets the engine
//! detect the collision instead of the store silently merging them.

use crate::index::{RootRef, RootTimeIndex};
use crate::source::SpanSource;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use runscope_core::{CancelSignal, ProjectId, Result, RunId, Span, SpanId, WindowQuery};
use rustc_hash::FxHashMap;
use tracing::debug;

/// Roots examined between cancellation checks during a window scan
const CANCEL_CHECK_INTERVAL: usize = 256;

/// Per-run shard containing the run's spans
#[derive(Debug, Default)]
pub struct Shard {
    pub(crate) spans: FxHashMap<(ProjectId, SpanId), Span>,
}

impl Shard {
    /// Create a new empty shard
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of spans in this shard
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Check if shard is empty
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// In-memory span store, sharded by run
///
/// # Thread Safety
///
/// All operations take `&self`:
/// - fetches lock only the shards they read
/// - inserts lock only the target run's shard
/// - different runs never contend
///
/// # Example
///
/// ```
/// use runscope_core::{CancelSignal, RunId, Span};
/// use runscope_storage::{MemorySpanStore, SpanSource};
///
/// let store = MemorySpanStore::new();
/// store.insert(Span::new("run-1", "root", "proj", "agent"));
/// store.insert(Span::new("run-1", "child", "proj", "tool").with_parent("root"));
///
/// let spans = store
///     .fetch_run_spans(&RunId::new("run-1"), &CancelSignal::new())
///     .unwrap();
/// assert_eq!(spans.len(), 2);
/// ```
pub struct MemorySpanStore {
    name: String,
    shards: DashMap<RunId, Shard>,
    roots: RootTimeIndex,
}

impl MemorySpanStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::named("memory")
    }

    /// Create an empty store with a source name for logs and errors
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shards: DashMap::new(),
            roots: RootTimeIndex::new(),
        }
    }

    /// Create with expected number of runs
    pub fn with_capacity(num_runs: usize) -> Self {
        Self {
            name: "memory".to_string(),
            shards: DashMap::with_capacity(num_runs),
            roots: RootTimeIndex::new(),
        }
    }

    /// Insert or replace a span
    ///
    /// Returns the span previously stored under the same run, project and
    /// span id.
    pub fn insert(&self, span: Span) -> Option<Span> {
        let key = (span.project_id.clone(), span.span_id.clone());
        let root_ref = (span.run_id.clone(), key.0.clone(), key.1.clone());
        let new_root_start = span.is_root().then(|| span.start_instant());

        // The index is updated under the shard guard so writers to the same
        // run apply shard and index changes in one order. Lock order is
        // always shard, then index.
        let mut shard = self
            .shards
            .entry(span.run_id.clone())
            .or_insert_with(Shard::new);
        let previous = shard.spans.insert(key, span);

        if let Some(old) = previous.as_ref().filter(|old| old.is_root()) {
            self.roots.remove(old.start_instant(), &root_ref);
        }
        if let Some(start) = new_root_start {
            self.roots.insert(start, root_ref);
        }
        drop(shard);
        previous
    }

    /// Insert many spans
    ///
    /// Returns the number of spans inserted.
    pub fn insert_all<I: IntoIterator<Item = Span>>(&self, spans: I) -> usize {
        let mut inserted = 0;
        for span in spans {
            self.insert(span);
            inserted += 1;
        }
        inserted
    }

    /// Remove every span of a run
    ///
    /// Returns true if the run existed.
    pub fn remove_run(&self, run_id: &RunId) -> bool {
        match self.shards.entry(run_id.clone()) {
            Entry::Occupied(shard) => {
                // Holding the entry keeps a concurrent insert from recreating
                // the shard between the two removals
                self.roots.remove_run(run_id);
                shard.remove();
                true
            }
            Entry::Vacant(_) => false,
        }
    }

    /// Check if a run has any spans
    pub fn has_run(&self, run_id: &RunId) -> bool {
        self.shards.contains_key(run_id)
    }

    /// Number of runs (shards)
    pub fn run_count(&self) -> usize {
        self.shards.len()
    }

    /// Number of spans in one run
    pub fn run_span_count(&self, run_id: &RunId) -> usize {
        self.shards.get(run_id).map(|shard| shard.len()).unwrap_or(0)
    }

    /// Total number of spans across all runs
    pub fn span_count(&self) -> usize {
        self.shards.iter().map(|entry| entry.value().len()).sum()
    }

    /// All run ids, sorted
    pub fn run_ids(&self) -> Vec<RunId> {
        let mut ids: Vec<RunId> = self.shards.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    fn root_span(&self, root: &RootRef) -> Option<Span> {
        let (run_id, project_id, span_id) = root;
        self.shards.get(run_id).and_then(|shard| {
            shard
                .spans
                .get(&(project_id.clone(), span_id.clone()))
                .cloned()
        })
    }
}

impl Default for MemorySpanStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemorySpanStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySpanStore")
            .field("name", &self.name)
            .field("run_count", &self.run_count())
            .field("span_count", &self.span_count())
            .field("indexed_roots", &self.roots.len())
            .finish()
    }
}

impl SpanSource for MemorySpanStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_window(&self, query: &WindowQuery, cancel: &CancelSignal) -> Result<Vec<Span>> {
        cancel.check()?;

        let candidates = self.roots.range(&query.window);
        let mut spans = Vec::new();
        for (i, root) in candidates.iter().enumerate() {
            if i % CANCEL_CHECK_INTERVAL == 0 {
                cancel.check()?;
            }
            if let Some(span) = self.root_span(root) {
                if query.admits(&span) {
                    spans.push(span);
                }
            }
        }

        debug!(
            source = %self.name,
            candidates = candidates.len(),
            matched = spans.len(),
            "window fetch"
        );
        Ok(spans)
    }

    fn fetch_run_spans(&self, run_id: &RunId, cancel: &CancelSignal) -> Result<Vec<Span>> {
        cancel.check()?;

        let mut spans: Vec<Span> = self
            .shards
            .get(run_id)
            .map(|shard| shard.spans.values().cloned().collect())
            .unwrap_or_default();

        // Sort for consistent ordering
        spans.sort_by(|a, b| {
            (&a.project_id, &a.span_id).cmp(&(&b.project_id, &b.span_id))
        });
        Ok(spans)
    }
}

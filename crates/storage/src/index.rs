//! Secondary index of root spans by start time
//!
//! Window queries only need root spans. Scanning every shard for roots is
//! O(total spans); this index keeps roots ordered by start time so a bounded
//! window is a range scan.
//!
//! Roots whose start time is absent or malformed cannot be placed on the
//! time axis. They are kept in a separate set and only returned for
//! unbounded windows.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use runscope_core::{ProjectId, RunId, SpanId, TimeWindow};
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;
use std::ops::Bound;

/// Location of a root span in the sharded store
pub type RootRef = (RunId, ProjectId, SpanId);

type TimedKey = (DateTime<Utc>, RunId, ProjectId, SpanId);

/// Root spans ordered by start time
#[derive(Debug, Default)]
pub struct RootTimeIndex {
    timed: RwLock<BTreeSet<TimedKey>>,
    untimed: RwLock<FxHashSet<RootRef>>,
}

impl RootTimeIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a root span
    pub fn insert(&self, start: Option<DateTime<Utc>>, root: RootRef) {
        let (run_id, project_id, span_id) = root;
        match start {
            Some(t) => {
                self.timed.write().insert((t, run_id, project_id, span_id));
            }
            None => {
                self.untimed.write().insert((run_id, project_id, span_id));
            }
        }
    }

    /// Remove a root span
    ///
    /// `start` must be the value it was indexed with.
    pub fn remove(&self, start: Option<DateTime<Utc>>, root: &RootRef) -> bool {
        let (run_id, project_id, span_id) = root;
        match start {
            Some(t) => self
                .timed
                .write()
                .remove(&(t, run_id.clone(), project_id.clone(), span_id.clone())),
            None => self.untimed.write().remove(root),
        }
    }

    /// Drop every entry of a run
    pub fn remove_run(&self, run_id: &RunId) {
        self.timed.write().retain(|(_, r, _, _)| r != run_id);
        self.untimed.write().retain(|(r, _, _)| r != run_id);
    }

    /// Roots whose start time falls in `window`
    ///
    /// Timed roots come back in start-time order; for an unbounded window
    /// untimed roots follow.
    pub fn range(&self, window: &TimeWindow) -> Vec<RootRef> {
        if let (Some(s), Some(e)) = (window.start, window.end) {
            // BTreeSet::range panics on inverted bounds
            if s >= e {
                return Vec::new();
            }
        }
        let lower = match window.start {
            Some(s) => Bound::Included(Self::floor(s)),
            None => Bound::Unbounded,
        };
        // Every key at `e` sorts at or above floor(e), so this excludes `e` itself
        let upper = match window.end {
            Some(e) => Bound::Excluded(Self::floor(e)),
            None => Bound::Unbounded,
        };

        let mut roots: Vec<RootRef> = self
            .timed
            .read()
            .range((lower, upper))
            .map(|(_, r, p, s)| (r.clone(), p.clone(), s.clone()))
            .collect();

        if window.is_unbounded() {
            let mut untimed: Vec<RootRef> = self.untimed.read().iter().cloned().collect();
            untimed.sort();
            roots.extend(untimed);
        }
        roots
    }

    /// Number of indexed roots
    pub fn len(&self) -> usize {
        self.timed.read().len() + self.untimed.read().len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn floor(t: DateTime<Utc>) -> TimedKey {
        (t, RunId::new(""), ProjectId::new(""), SpanId::new(""))
    }
}

//! Run summaries from root spans
//!
//! A window fetch yields root spans. Each run id must resolve to exactly one
//! root. A run id whose roots sit in several projects cannot be summarized
//! as one run and fails the request with `DuplicateRun`. Several roots in
//! one project is a malformed run: it is left out of the listing with a
//! warning, and the rest of the window is still summarized.

use crate::status;
use runscope_core::{Error, ProjectId, Result, RunId, RunSummary, Span};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Summarize one run per root span
///
/// Non-root spans are ignored. Output is newest run first, by root start
/// time; runs without a valid start time follow, and `run_id` breaks ties.
///
/// # Errors
///
/// - `DuplicateRun`: roots of one run id belong to more than one project
pub fn summarize_roots(spans: Vec<Span>) -> Result<Vec<RunSummary>> {
    let mut roots: BTreeMap<RunId, Vec<Span>> = BTreeMap::new();
    let mut skipped = 0usize;
    for span in spans {
        if span.is_root() {
            roots.entry(span.run_id.clone()).or_default().push(span);
        } else {
            skipped += 1;
        }
    }
    if skipped > 0 {
        debug!(skipped, "Ignoring non-root spans in window result");
    }

    let mut runs = Vec::with_capacity(roots.len());
    for (run_id, group) in roots {
        if group.len() > 1 {
            let projects: BTreeSet<&ProjectId> = group.iter().map(|s| &s.project_id).collect();
            if projects.len() > 1 {
                return Err(Error::DuplicateRun {
                    run_id,
                    aggregates: projects.len(),
                });
            }
            warn!(run_id = %run_id, roots = group.len(), "Skipping run with several roots");
            continue;
        }
        for root in &group {
            runs.push(RunSummary::from_root(root, status::resolve(root)));
        }
    }

    runs.sort_by(newest_first);
    Ok(runs)
}

/// Listing order: newest start first, untimed last, then run id
pub fn newest_first(a: &RunSummary, b: &RunSummary) -> Ordering {
    let ta = a.start_time.as_ref().and_then(|t| t.instant());
    let tb = b.start_time.as_ref().and_then(|t| t.instant());
    ta.is_none()
        .cmp(&tb.is_none())
        .then(tb.cmp(&ta))
        .then_with(|| a.run_id.cmp(&b.run_id))
}

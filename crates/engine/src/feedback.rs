//! Feedback distribution counts
//!
//! Counts how often each feedback label occurs per key over a run
//! population. This is a pure multiset count: the result does not depend on
//! input order, keys come back sorted and labels are held in a `BTreeMap`.

use runscope_core::{Feedback, FeedbackCount, RunSummary};
use std::collections::BTreeMap;

/// Count feedback labels per key
///
/// Items without feedback contribute nothing. Keys never observed do not
/// appear in the output.
pub fn count_feedback<'a, I>(feedback: I) -> Vec<FeedbackCount>
where
    I: IntoIterator<Item = Option<&'a Feedback>>,
{
    let mut by_key: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
    for fb in feedback.into_iter().flatten() {
        *by_key
            .entry(fb.key.clone())
            .or_default()
            .entry(fb.label())
            .or_insert(0) += 1;
    }

    by_key
        .into_iter()
        .map(|(key, counts)| FeedbackCount { key, counts })
        .collect()
}

/// Count feedback over run summaries
pub fn count_run_feedback(runs: &[RunSummary]) -> Vec<FeedbackCount> {
    count_feedback(runs.iter().map(|run| run.feedback.as_ref()))
}

//! Status resolution for spans and runs
//!
//! Rules, evaluated in order:
//!
//! | # | Condition | Status |
//! |---|-----------|--------|
//! | 1 | `error` present | Errored (regardless of `end_time`) |
//! | 2 | `end_time` valid | Completed |
//! | 3 | `end_time` absent | InProgress |
//! | 4 | `end_time` present but unparseable | Indeterminate |
//!
//! Resolution never fails; malformed timing downgrades to `Indeterminate`
//! and the caller decides how to display it.

use runscope_core::{Span, SpanStatus, SpanTime};
use tracing::warn;

/// Resolve the lifecycle status of a span
pub fn resolve(span: &Span) -> SpanStatus {
    if span.error.is_some() {
        return SpanStatus::Errored;
    }
    match &span.end_time {
        Some(SpanTime::At(end)) => {
            if let Some(start) = span.start_instant() {
                if *end < start {
                    // Still completed, but it reports no latency
                    warn!(
                        run_id = %span.run_id,
                        span_id = %span.span_id,
                        "Span ends before it starts"
                    );
                }
            }
            SpanStatus::Completed
        }
        None => SpanStatus::InProgress,
        Some(SpanTime::Unparsed(_)) => SpanStatus::Indeterminate,
    }
}

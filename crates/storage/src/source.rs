//! The span data source boundary
//!
//! The trace engine does not own storage. It consumes spans through
//! [`SpanSource`], which a document store, a database client or the in-memory
//! [`MemorySpanStore`](crate::MemorySpanStore) implements.
//!
//! ## Contract
//!
//! - `fetch_window` returns root spans (a run-level projection is enough)
//!   whose start time falls in the query window, restricted to the query's
//!   project and feedback filter. Extra child spans are tolerated.
//! - `fetch_run_spans` returns the complete flat span set of one run; an
//!   empty vector means no such run.
//! - Failures surface as `Error::DataSource`, never as "no data".
//! - A fired [`CancelSignal`] surfaces as `Error::Cancelled`.
//!
//! | Condition | Error |
//! |-----------|-------|
//! | Connectivity or query failure | `DataSource` |
//! | Signal fired during the fetch | `Cancelled` |

use runscope_core::{CancelSignal, Result, RunId, Span, WindowQuery};
use std::sync::Arc;

/// Read-only access to recorded spans
///
/// Implementations must be safe to call concurrently; the engine holds no
/// locks around calls.
pub trait SpanSource: Send + Sync {
    /// Name used in logs and `DataSource` errors
    fn name(&self) -> &str;

    /// Fetch root spans for a project/time window with a feedback filter
    fn fetch_window(&self, query: &WindowQuery, cancel: &CancelSignal) -> Result<Vec<Span>>;

    /// Fetch every span of one run
    fn fetch_run_spans(&self, run_id: &RunId, cancel: &CancelSignal) -> Result<Vec<Span>>;
}

impl<S: SpanSource + ?Sized> SpanSource for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_window(&self, query: &WindowQuery, cancel: &CancelSignal) -> Result<Vec<Span>> {
        (**self).fetch_window(query, cancel)
    }

    fn fetch_run_spans(&self, run_id: &RunId, cancel: &CancelSignal) -> Result<Vec<Span>> {
        (**self).fetch_run_spans(run_id, cancel)
    }
}

impl<S: SpanSource + ?Sized> SpanSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_window(&self, query: &WindowQuery, cancel: &CancelSignal) -> Result<Vec<Span>> {
        (**self).fetch_window(query, cancel)
    }

    fn fetch_run_spans(&self, run_id: &RunId, cancel: &CancelSignal) -> Result<Vec<Span>> {
        (**self).fetch_run_spans(run_id, cancel)
    }
}

//! Cooperative cancellation for span fetches
//!
//! The only suspension point of a query is the call into the span source.
//! Callers hand a [`CancelSignal`] to every operation; the source checks it
//! while scanning and the service checks it around the fetch. A fired signal
//! turns the operation into `Error::Cancelled` instead of partial results.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why an operation was cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelKind {
    /// Explicit cancellation by the caller
    Requested,
    /// The deadline passed
    DeadlineExceeded,
}

impl std::fmt::Display for CancelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancelKind::Requested => write!(f, "requested"),
            CancelKind::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

/// Shared cancellation flag with an optional deadline
///
/// Cloning a signal shares the same flag, so any holder can cancel and all
/// others observe it.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelSignal {
    /// A signal that only fires when cancelled explicitly
    pub fn new() -> Self {
        Self::default()
    }

    /// A signal that also fires once `timeout` has elapsed
    pub fn with_timeout(timeout: Duration) -> Self {
        // A timeout past the clock's range never fires
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::with_deadline(deadline),
            None => Self::new(),
        }
    }

    /// A signal that also fires at `deadline`
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    /// Signal cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// The deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Why the signal has fired, if it has
    ///
    /// Explicit cancellation wins over an expired deadline.
    pub fn state(&self) -> Option<CancelKind> {
        if self.cancelled.load(Ordering::Acquire) {
            return Some(CancelKind::Requested);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelKind::DeadlineExceeded),
            _ => None,
        }
    }

    /// Check whether the signal has fired
    pub fn is_cancelled(&self) -> bool {
        self.state().is_some()
    }

    /// Return `Err(Cancelled)` if the signal has fired
    pub fn check(&self) -> Result<()> {
        match self.state() {
            Some(kind) => Err(Error::Cancelled { kind }),
            None => Ok(()),
        }
    }
}

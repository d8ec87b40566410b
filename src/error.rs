//! Unified error type for Runscope.
//!
//! Wraps the internal core error and presents a stable interface to callers.
//! "No data" outcomes are never errors: an empty window is an empty summary
//! and an unknown run is `Ok(None)`.

use runscope_core::{CancelKind, MalformedReason, RunId};
use thiserror::Error;

/// All Runscope errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The span source failed (connectivity, bad query, contract violation)
    #[error("data source error: {0}")]
    DataSource(String),

    /// A run's spans do not form exactly one tree
    #[error("malformed trace for run {run_id}: {reason}")]
    MalformedTrace {
        /// Affected run
        run_id: RunId,
        /// What is wrong with it
        reason: MalformedReason,
    },

    /// One run id resolved to several distinct runs
    #[error("run {run_id} resolved to {aggregates} distinct runs")]
    DuplicateRun {
        /// Affected run id
        run_id: RunId,
        /// Number of distinct runs found
        aggregates: usize,
    },

    /// The caller's cancellation signal or deadline fired
    #[error("cancelled: {0}")]
    Cancelled(CancelKind),

    /// Invalid window, filter or configuration
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Span records could not be decoded
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for Runscope operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if the operation was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled(_))
    }

    /// Check if this is a malformed trace.
    ///
    /// Callers typically render "trace unavailable" for these.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedTrace { .. })
    }

    /// Check if the span source failed.
    pub fn is_data_source(&self) -> bool {
        matches!(self, Error::DataSource(_))
    }

    /// Check if a run id resolved to several runs.
    pub fn is_duplicate_run(&self) -> bool {
        matches!(self, Error::DuplicateRun { .. })
    }
}

// Convert from internal core errors
impl From<runscope_core::Error> for Error {
    fn from(e: runscope_core::Error) -> Self {
        use runscope_core::Error as CoreError;
        match e {
            CoreError::DataSource {
                source_name,
                message,
            } => Error::DataSource(format!("{}: {}", source_name, message)),
            CoreError::MalformedTrace { run_id, reason } => {
                Error::MalformedTrace { run_id, reason }
            }
            CoreError::DuplicateRun { run_id, aggregates } => {
                Error::DuplicateRun { run_id, aggregates }
            }
            CoreError::Cancelled { kind } => Error::Cancelled(kind),
            CoreError::InvalidInput(msg) => Error::InvalidInput(msg),
            CoreError::Serialization(msg) => Error::Serialization(msg),
            CoreError::Io(io_err) => Error::Io(io_err),
        }
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

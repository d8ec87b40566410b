//! Error types for the trace engine
//!
//! ## Error kinds
//!
//! | Kind | Meaning | Caller treatment |
//! |------|---------|------------------|
//! | DataSource | Span source failed (connectivity, bad query) | Surface, do not retry here |
//! | MalformedTrace | Zero or many roots, dangling parent, duplicate span id | Render "trace unavailable" |
//! | DuplicateRun | One run id resolved to several distinct runs | Fail this request only |
//! | Cancelled | Caller signal fired before completion | Discard, no partial result |
//!
//! "No data" (empty window, unknown run id, no completed runs) is never an
//! error; it is an empty or absent result.

use crate::cancel::CancelKind;
use crate::types::{RunId, SpanId};
use thiserror::Error;

/// Why a run's spans could not form a single tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// No span without a parent
    NoRoot,
    /// More than one span without a parent
    MultipleRoots(Vec<SpanId>),
    /// A parent reference that resolves to no span of the run
    DanglingParent {
        /// Span holding the reference
        span_id: SpanId,
        /// The unresolved parent id
        parent_id: SpanId,
    },
    /// Two spans share an id
    DuplicateSpanId(SpanId),
    /// A span of another run was passed in
    ForeignSpan {
        /// The offending span
        span_id: SpanId,
        /// Its run
        run_id: RunId,
    },
    /// Spans not reachable from the root (parent cycle)
    Cycle(Vec<SpanId>),
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedReason::NoRoot => write!(f, "no root span"),
            MalformedReason::MultipleRoots(roots) => {
                let ids: Vec<&str> = roots.iter().map(SpanId::as_str).collect();
                write!(f, "{} root spans: {}", roots.len(), ids.join(", "))
            }
            MalformedReason::DanglingParent { span_id, parent_id } => {
                write!(f, "span {} references missing parent {}", span_id, parent_id)
            }
            MalformedReason::DuplicateSpanId(id) => write!(f, "duplicate span id {}", id),
            MalformedReason::ForeignSpan { span_id, run_id } => {
                write!(f, "span {} belongs to run {}", span_id, run_id)
            }
            MalformedReason::Cycle(ids) => {
                write!(f, "{} spans unreachable from root (parent cycle)", ids.len())
            }
        }
    }
}

/// All trace engine errors
#[derive(Debug, Error)]
pub enum Error {
    /// The span source failed
    #[error("data source error ({source_name}): {message}")]
    DataSource {
        /// Name of the failing source
        source_name: String,
        /// What went wrong
        message: String,
    },

    /// A run's spans do not form a single valid tree
    #[error("malformed trace for run {run_id}: {reason}")]
    MalformedTrace {
        /// Affected run
        run_id: RunId,
        /// What is wrong with it
        reason: MalformedReason,
    },

    /// The source returned several distinct runs under one run id
    #[error("run {run_id} resolved to {aggregates} distinct runs")]
    DuplicateRun {
        /// Affected run id
        run_id: RunId,
        /// Number of distinct aggregates found
        aggregates: usize,
    },

    /// The caller's cancellation signal fired
    #[error("operation cancelled: {kind}")]
    Cancelled {
        /// Why it was cancelled
        kind: CancelKind,
    },

    /// Invalid caller input (window, config)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Span records could not be decoded or encoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for trace engine operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a data source error
    pub fn data_source(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::DataSource {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create a malformed trace error
    pub fn malformed(run_id: RunId, reason: MalformedReason) -> Self {
        Error::MalformedTrace { run_id, reason }
    }

    /// Check if this is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled { .. })
    }

    /// Check if this is a malformed trace
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedTrace { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

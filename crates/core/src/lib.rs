//! Core types for the runscope trace engine
//!
//! This crate defines the data model shared by the storage and engine crates:
//! - Span records and reviewer feedback ([`Span`], [`Feedback`])
//! - Run-level summaries and statuses ([`RunSummary`], [`SpanStatus`])
//! - Reconstructed trees ([`TraceTreeNode`])
//! - Window queries and feedback filters ([`WindowQuery`])
//! - Aggregate results ([`WindowSummary`])
//! - Cancellation ([`CancelSignal`]) and errors ([`Error`])

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cancel;
pub mod error;
pub mod query;
pub mod run;
pub mod span;
pub mod stats;
pub mod tree;
pub mod types;

pub use cancel::{CancelKind, CancelSignal};
pub use error::{Error, MalformedReason, Result};
pub use query::{FeedbackFilter, TimeWindow, WindowPreset, WindowQuery};
pub use run::{RunSummary, SpanStatus};
pub use span::{Feedback, Span};
pub use stats::{FeedbackCount, LatencyPercentile, WindowSummary};
pub use tree::TraceTreeNode;
pub use types::{ProjectId, RunId, SpanId, SpanTime};

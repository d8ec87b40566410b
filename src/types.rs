//! Public types for the Runscope API.
//!
//! Re-exports types from the internal crates with a flat public path.

// Identifiers and timestamps
pub use runscope_core::{ProjectId, RunId, SpanId, SpanTime};

// Span records
pub use runscope_core::{Feedback, Span};

// Query inputs
pub use runscope_core::{FeedbackFilter, TimeWindow, WindowPreset, WindowQuery};

// Query outputs
pub use runscope_core::{
    FeedbackCount, LatencyPercentile, RunSummary, SpanStatus, TraceTreeNode, WindowSummary,
};

// Error details
pub use runscope_core::{CancelKind, MalformedReason};

// Cancellation
pub use runscope_core::CancelSignal;

// Engine configuration
pub use runscope_engine::EngineConfig;

// Custom span sources
pub use runscope_engine::TraceService;
pub use runscope_storage::{MemorySpanStore, SpanSource};

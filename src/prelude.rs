//! Convenient imports for Runscope.
//!
//! ```ignore
//! use runscope::prelude::*;
//!
//! let rs = Runscope::ephemeral()?;
//! rs.ingest(Span::new("run-1", "root", "proj", "agent"));
//! let tree = rs.run_tree(&RunId::new("run-1"))?;
//! ```

// Main entry point
pub use crate::database::{Runscope, RunscopeBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Core types
pub use crate::types::{Feedback, ProjectId, RunId, Span, SpanId, SpanStatus, SpanTime};

// Queries
pub use crate::types::{CancelSignal, FeedbackFilter, TimeWindow, WindowPreset, WindowQuery};

// Results
pub use crate::types::{TraceTreeNode, WindowSummary};

// Re-export chrono for building windows
pub use chrono::{DateTime, Utc};

//! # Runscope
//!
//! Trace aggregation and span-tree reconstruction for recorded agent runs.
//!
//! Runscope ingests flat span records (each naming its run, parent, timing,
//! error and optional reviewer feedback) and answers two queries:
//!
//! - a windowed run list with latency percentiles and feedback counts
//! - the full span tree of a single run
//!
//! ## Quick Start
//!
//! ```ignore
//! use runscope::prelude::*;
//!
//! let rs = Runscope::from_jsonl("./spans.jsonl")?;
//!
//! // Runs of the last day that got a thumbs up
//! let query = WindowQuery::all()
//!     .window(TimeWindow::last(WindowPreset::LastDay, Utc::now()))
//!     .feedback(FeedbackFilter::new().allow("thumbs", "up"));
//! let summary = rs.window_summary(&query)?;
//! println!("p50 = {:?} ms", summary.latency_at(50.0));
//!
//! // One run's tree
//! match rs.run_tree(&RunId::new("run-42")) {
//!     Ok(Some(tree)) => println!("{} spans", tree.node_count()),
//!     Ok(None) => println!("no such run"),
//!     Err(e) if e.is_malformed() => println!("trace unavailable"),
//!     Err(e) => return Err(e),
//! }
//! ```
//!
//! ## Outcomes
//!
//! | Situation | Result |
//! |-----------|--------|
//! | Empty window | empty summary, percentiles with no latency |
//! | Unknown run | `Ok(None)` |
//! | Broken parent links, zero or several roots | `Error::MalformedTrace` |
//! | Run id shared by several runs | `Error::DuplicateRun` |
//! | Signal or deadline fired | `Error::Cancelled` |

#![warn(missing_docs)]

mod database;
mod error;
mod types;

pub mod prelude;

// Re-export main entry points
pub use database::{Runscope, RunscopeBuilder};
pub use error::{Error, Result};

// Re-export types
pub use types::*;

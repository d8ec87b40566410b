//! Span storage for runscope
//!
//! This crate implements the span data source boundary:
//! - SpanSource: the trait the trace engine consumes
//! - MemorySpanStore: DashMap-sharded span store, one shard per run
//! - RootTimeIndex: root spans ordered by start time for window scans
//! - jsonl: loading span records from JSON lines

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod index;
pub mod jsonl;
pub mod sharded;
pub mod source;

pub use index::RootTimeIndex;
pub use jsonl::{load_jsonl, load_jsonl_file, read_spans};
pub use sharded::{MemorySpanStore, Shard};
pub use source::SpanSource;

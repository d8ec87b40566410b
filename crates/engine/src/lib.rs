//! Trace aggregation and tree reconstruction
//!
//! Operates on spans fetched from a [`SpanSource`](runscope_storage::SpanSource):
//! - [`status`]: lifecycle status of a span
//! - [`tree`]: one run's flat spans to a single ordered tree
//! - [`percentile`]: interpolated latency percentiles
//! - [`feedback`]: feedback label counts per key
//! - [`summary`]: run summaries from root spans
//! - [`service`]: the two public queries, window summary and run tree
//!
//! Nothing here caches results. Each query recomputes from a fresh fetch.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod feedback;
pub mod percentile;
pub mod service;
pub mod status;
pub mod summary;
pub mod tree;

pub use config::{EngineConfig, DEFAULT_FETCH_TIMEOUT_MS};
pub use feedback::{count_feedback, count_run_feedback};
pub use percentile::{interpolate, latency_percentiles, DEFAULT_PERCENTILES};
pub use service::TraceService;
pub use status::resolve;
pub use summary::summarize_roots;
pub use tree::build_tree;

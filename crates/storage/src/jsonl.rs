//! Loading span records from JSON lines
//!
//! One span object per line. Blank lines are skipped. A line that does not
//! decode fails the whole load with its 1-based line number, rather than
//! dropping the span and producing a silently incomplete run.

use crate::sharded::MemorySpanStore;
use runscope_core::{Error, Result, Span};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// Decode spans from a JSON-lines reader
pub fn read_spans<R: BufRead>(reader: R) -> Result<Vec<Span>> {
    let mut spans = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let span: Span = serde_json::from_str(trimmed)
            .map_err(|e| Error::Serialization(format!("line {}: {}", idx + 1, e)))?;
        spans.push(span);
    }
    Ok(spans)
}

/// Load spans from a JSON-lines reader into a store
///
/// Returns the number of spans loaded.
pub fn load_jsonl<R: BufRead>(store: &MemorySpanStore, reader: R) -> Result<usize> {
    let spans = read_spans(reader)?;
    Ok(store.insert_all(spans))
}

/// Load spans from a JSON-lines file into a store
pub fn load_jsonl_file(store: &MemorySpanStore, path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let loaded = load_jsonl(store, BufReader::new(file))?;
    info!("Loaded {} spans from {}", loaded, path.display());
    Ok(loaded)
}

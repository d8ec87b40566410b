//! Loading Tests
//!
//! - JSON-lines span files through the facade
//! - Engine configuration from TOML
//! - Facade error classification

use crate::*;
use runscope::{Error, Runscope};
use std::io::{Cursor, Write};

const SPANS: &str = r#"
{"span_id":"root","run_id":"run-1","project_id":"proj","name":"agent","start_time":"2024-05-01T10:00:00Z","end_time":"2024-05-01T10:00:00.100Z","feedback":{"key":"thumbs","value":"up"}}
{"span_id":"llm","run_id":"run-1","parent_id":"root","project_id":"proj","name":"llm.call","start_time":"2024-05-01T10:00:00.010Z","end_time":"2024-05-01T10:00:00.090Z"}
{"span_id":"root","run_id":"run-2","project_id":"proj","name":"agent","start_time":"2024-05-01T10:01:00Z","end_time":"2024-05-01T10:01:00.300Z","feedback":{"key":"thumbs","value":"up"}}
{"span_id":"root","run_id":"run-3","project_id":"proj","name":"agent","start_time":"2024-05-01T10:02:00Z","feedback":{"key":"thumbs","value":"down"}}
"#;

fn spans_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_from_jsonl_end_to_end() {
    init_tracing();
    let file = spans_file(SPANS);
    let rs = Runscope::from_jsonl(file.path()).unwrap();

    assert_eq!(rs.run_count(), 3);
    assert_eq!(rs.span_count(), 4);

    let summary = rs.window_summary(&WindowQuery::all()).unwrap();
    assert_eq!(run_ids(&summary), vec!["run-3", "run-2", "run-1"]);
    assert_eq!(summary.latency_at(50.0), Some(200.0));
    let thumbs = summary.feedback_for("thumbs").unwrap();
    assert_eq!(thumbs.counts.get("up"), Some(&2));
    assert_eq!(thumbs.counts.get("down"), Some(&1));

    let tree = rs.run_tree(&RunId::new("run-1")).unwrap().unwrap();
    assert_eq!(tree.children[0].span.name, "llm.call");
    assert_eq!(tree.children[0].latency_ms, Some(80));

    assert!(rs.run_tree(&RunId::new("run-9")).unwrap().is_none());
}

#[test]
fn test_incremental_load_from_reader() {
    let rs = Runscope::ephemeral().unwrap();
    let loaded = rs.load_jsonl(Cursor::new(SPANS)).unwrap();
    assert_eq!(loaded, 4);

    // Reloading replaces spans rather than duplicating them
    rs.load_jsonl(Cursor::new(SPANS)).unwrap();
    assert_eq!(rs.span_count(), 4);
}

#[test]
fn test_epoch_and_odd_timestamps_load() {
    let file = spans_file(concat!(
        r#"{"span_id":"root","run_id":"epoch","project_id":"proj","name":"agent","start_time":1714557600000,"end_time":1714557601000}"#,
        "\n",
        r#"{"span_id":"root","run_id":"flag","project_id":"proj","name":"agent","start_time":"2024-05-01T10:05:00Z","end_time":true}"#,
        "\n",
    ));
    let rs = Runscope::from_jsonl(file.path()).unwrap();
    assert_eq!(rs.span_count(), 2);

    let summary = rs.window_summary(&WindowQuery::all()).unwrap();
    let status = |run: &str| {
        summary
            .runs
            .iter()
            .find(|r| r.run_id.as_str() == run)
            .unwrap()
            .status
    };
    assert_eq!(status("epoch"), runscope::SpanStatus::Completed);
    assert_eq!(status("flag"), runscope::SpanStatus::Indeterminate);
    assert_eq!(summary.latency_at(50.0), Some(1_000.0));

    let tree = rs.run_tree(&RunId::new("epoch")).unwrap().unwrap();
    assert_eq!(tree.latency_ms, Some(1_000));
}

#[test]
fn test_bad_line_is_serialization_error() {
    let file = spans_file("{\"span_id\":\"a\"}\n");
    let err = Runscope::from_jsonl(file.path()).unwrap_err();
    match err {
        Error::Serialization(msg) => assert!(msg.starts_with("line 1:"), "{}", msg),
        other => panic!("expected serialization error, got {:?}", other),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let err = Runscope::from_jsonl("/definitely/not/here.jsonl").unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_config_file() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "percentiles = [0.0, 100.0]").unwrap();
    writeln!(config, "max_spans_per_run = 1").unwrap();

    let rs = Runscope::builder()
        .config_file(config.path())
        .unwrap()
        .no_fetch_timeout()
        .open()
        .unwrap();
    rs.load_jsonl(Cursor::new(SPANS)).unwrap();

    let summary = rs.window_summary(&WindowQuery::all()).unwrap();
    assert_eq!(summary.latency_percentiles.len(), 2);
    assert_eq!(summary.latency_at(0.0), Some(100.0));
    assert_eq!(summary.latency_at(100.0), Some(300.0));

    // run-1 has two spans, over the configured limit
    let err = rs.run_tree(&RunId::new("run-1")).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(rs.run_tree(&RunId::new("run-2")).unwrap().is_some());
}

#[test]
fn test_invalid_config_file() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "percentiles = [-1.0]").unwrap();
    let err = Runscope::builder()
        .config_file(config.path())
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn test_facade_error_classification() {
    let rs = Runscope::ephemeral().unwrap();
    rs.ingest_all(vec![
        completed("broken", 0, 10),
        child("broken", "lost", "nowhere", 1),
    ]);

    let err = rs.run_tree(&RunId::new("broken")).unwrap_err();
    assert!(err.is_malformed());
    assert!(!err.is_data_source());
    assert!(err.to_string().contains("nowhere"));

    rs.ingest(
        Span::new("broken", "root", "second-proj", "agent").with_start(at(0)),
    );
    let err = rs.window_summary(&WindowQuery::all()).unwrap_err();
    assert!(err.is_duplicate_run());
}

//! Edge Case Tests
//!
//! - Malformed traces: dangling parents, zero or several roots, cycles
//! - Run ids shared across projects
//! - Unparseable and inverted timestamps
//! - Span limits

use crate::*;
use runscope::{MalformedReason, SpanId, SpanStatus};
use runscope_core::Error as CoreError;

fn malformed_reason(err: CoreError) -> MalformedReason {
    match err {
        CoreError::MalformedTrace { reason, .. } => reason,
        other => panic!("expected malformed trace, got {:?}", other),
    }
}

#[test]
fn test_dangling_parent_fails_whole_tree() {
    let spans = vec![
        completed("r1", 0, 100),
        child("r1", "kept", "root", 10),
        child("r1", "orphan", "vanished", 20),
    ];

    test_across_sources(spans, |_, service| {
        let err = service
            .get_run_tree(&RunId::new("r1"), &CancelSignal::new())
            .unwrap_err();
        assert_eq!(
            malformed_reason(err),
            MalformedReason::DanglingParent {
                span_id: SpanId::new("orphan"),
                parent_id: SpanId::new("vanished"),
            }
        );
    });
}

#[test]
fn test_two_roots_in_one_project() {
    let spans = vec![
        completed("r1", 0, 100),
        Span::new("r1", "second-root", "proj", "agent").with_start(at(5)),
    ];

    test_across_sources(spans, |_, service| {
        let err = service
            .get_run_tree(&RunId::new("r1"), &CancelSignal::new())
            .unwrap_err();
        assert!(matches!(
            malformed_reason(err),
            MalformedReason::MultipleRoots(ids) if ids.len() == 2
        ));
    });
}

#[test]
fn test_only_children_no_root() {
    let spans = vec![
        child("r1", "a", "b", 0),
        child("r1", "b", "a", 1),
    ];

    test_across_sources(spans, |_, service| {
        let err = service
            .get_run_tree(&RunId::new("r1"), &CancelSignal::new())
            .unwrap_err();
        assert_eq!(malformed_reason(err), MalformedReason::NoRoot);
    });
}

#[test]
fn test_cycle_beside_valid_root() {
    let spans = vec![
        completed("r1", 0, 100),
        child("r1", "x", "y", 1),
        child("r1", "y", "x", 2),
    ];

    test_across_sources(spans, |_, service| {
        let err = service
            .get_run_tree(&RunId::new("r1"), &CancelSignal::new())
            .unwrap_err();
        assert!(matches!(malformed_reason(err), MalformedReason::Cycle(_)));
    });
}

#[test]
fn test_malformed_run_does_not_hide_window() {
    init_tracing();
    let spans = vec![
        completed("good", 0, 120),
        Span::new("bad", "a", "proj", "agent").with_start(at(10)),
        Span::new("bad", "b", "proj", "agent").with_start(at(20)),
    ];

    test_across_sources(spans, |_, service| {
        let summary = service
            .get_window_summary(&WindowQuery::all(), &CancelSignal::new())
            .unwrap();
        assert_eq!(run_ids(&summary), vec!["good"]);
        assert_eq!(summary.latency_at(50.0), Some(120.0));

        // The run itself still reports why it cannot be shown
        let err = service
            .get_run_tree(&RunId::new("bad"), &CancelSignal::new())
            .unwrap_err();
        assert!(matches!(
            malformed_reason(err),
            MalformedReason::MultipleRoots(ids) if ids.len() == 2
        ));
    });
}

#[test]
fn test_run_id_reused_across_projects() {
    let spans = vec![
        completed("shared", 0, 100),
        Span::new("shared", "root", "other-proj", "agent")
            .with_start(at(50))
            .with_end(at(60)),
    ];

    test_across_sources(spans, |_, service| {
        let err = service
            .get_run_tree(&RunId::new("shared"), &CancelSignal::new())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::DuplicateRun { aggregates: 2, .. }
        ));

        // The window path cannot tell the two apart either
        let err = service
            .get_window_summary(&WindowQuery::all(), &CancelSignal::new())
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateRun { .. }));

        // Scoped to one project, the run is unambiguous
        let scoped = service
            .get_window_summary(&WindowQuery::all().project("proj"), &CancelSignal::new())
            .unwrap();
        assert_eq!(scoped.record_count, 1);
    });
}

#[test]
fn test_unparseable_timestamps_from_json() {
    let record = r#"{
        "span_id": "root", "run_id": "weird", "project_id": "proj", "name": "agent",
        "start_time": "2024-05-01T10:00:00Z", "end_time": "ten-ish"
    }"#;
    let span: Span = serde_json::from_str(record).unwrap();
    assert!(span.end_time.as_ref().unwrap().is_malformed());

    test_across_sources(vec![span], |_, service| {
        let summary = service
            .get_window_summary(&WindowQuery::all(), &CancelSignal::new())
            .unwrap();
        assert_eq!(summary.runs[0].status, SpanStatus::Indeterminate);
        assert!(summary.latency_at(50.0).is_none());

        let tree = service
            .get_run_tree(&RunId::new("weird"), &CancelSignal::new())
            .unwrap()
            .unwrap();
        assert_eq!(tree.status, SpanStatus::Indeterminate);
    });
}

#[test]
fn test_end_before_start() {
    let spans = vec![root("backwards", 1_000).with_end(at(0)), completed("fine", 0, 40)];

    test_across_sources(spans, |_, service| {
        let summary = service
            .get_window_summary(&WindowQuery::all(), &CancelSignal::new())
            .unwrap();
        let backwards = summary
            .runs
            .iter()
            .find(|r| r.run_id.as_str() == "backwards")
            .unwrap();
        assert_eq!(backwards.status, SpanStatus::Completed);
        assert_eq!(backwards.latency_ms, None);
        // Only the measurable run enters the percentiles
        assert_eq!(summary.latency_at(50.0), Some(40.0));
    });
}

#[test]
fn test_span_limit_per_run() {
    init_tracing();
    let store = MemorySpanStore::new();
    store.insert_all(vec![
        completed("r1", 0, 10),
        child("r1", "a", "root", 1),
        child("r1", "b", "root", 2),
    ]);
    let config = runscope::EngineConfig::default().with_max_spans_per_run(Some(2));
    let service = TraceService::with_config(store, config).unwrap();

    let err = service
        .get_run_tree(&RunId::new("r1"), &CancelSignal::new())
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));
}

#[test]
fn test_lax_source_with_foreign_spans() {
    init_tracing();
    // A source that answers a run lookup with another run's spans
    struct Confused;

    impl SpanSource for Confused {
        fn name(&self) -> &str {
            "confused"
        }

        fn fetch_window(&self, _: &WindowQuery, _: &CancelSignal) -> Result<Vec<Span>> {
            Ok(vec![])
        }

        fn fetch_run_spans(&self, _: &RunId, _: &CancelSignal) -> Result<Vec<Span>> {
            Ok(vec![completed("someone-else", 0, 1)])
        }
    }

    let service = TraceService::new(Confused);
    let err = service
        .get_run_tree(&RunId::new("r1"), &CancelSignal::new())
        .unwrap_err();
    match err {
        CoreError::DataSource { source_name, .. } => assert_eq!(source_name, "confused"),
        other => panic!("expected data source error, got {:?}", other),
    }
}

#[test]
fn test_inverted_window_rejected() {
    assert!(TimeWindow::new(Some(instant(10)), Some(instant(0))).is_err());
    assert!("2h".parse::<runscope::WindowPreset>().is_err());
}

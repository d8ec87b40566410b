//! Feedback Tests
//!
//! - Distribution counts per key
//! - Filters narrow the run list, percentiles and counts together
//! - ANY value within a key, ALL keys across the filter
//! - Key-only filters and score labels

use crate::*;
use runscope::{Feedback, FeedbackFilter};

fn thumbs(value: &str) -> Feedback {
    Feedback::new("thumbs", value)
}

fn thumbs_population() -> Vec<Span> {
    vec![
        completed("a", 0, 100).with_feedback(thumbs("up")),
        completed("b", 10, 200).with_feedback(thumbs("up")),
        completed("c", 20, 900).with_feedback(thumbs("down")),
        completed("d", 30, 50),
    ]
}

#[test]
fn test_thumbs_distribution() {
    test_across_sources(thumbs_population(), |_, service| {
        let summary = service
            .get_window_summary(&WindowQuery::all(), &CancelSignal::new())
            .unwrap();

        assert_eq!(summary.feedback_counts.len(), 1);
        let fc = summary.feedback_for("thumbs").unwrap();
        assert_eq!(fc.counts.get("up"), Some(&2));
        assert_eq!(fc.counts.get("down"), Some(&1));
        assert_eq!(fc.total(), 3);
    });
}

#[test]
fn test_filter_narrows_every_output() {
    test_across_sources(thumbs_population(), |mode, service| {
        let query = WindowQuery::all().feedback(FeedbackFilter::new().allow("thumbs", "up"));
        let summary = service.get_window_summary(&query, &CancelSignal::new()).unwrap();

        assert_eq!(run_ids(&summary), vec!["b", "a"], "{:?}", mode);
        // p50 of {100, 200}, not of the unfiltered {50, 100, 200, 900}
        assert_eq!(summary.latency_at(50.0), Some(150.0));
        let fc = summary.feedback_for("thumbs").unwrap();
        assert_eq!(fc.counts.get("up"), Some(&2));
        assert_eq!(fc.counts.get("down"), None);
    });
}

#[test]
fn test_any_value_within_key() {
    test_across_sources(thumbs_population(), |_, service| {
        let filter = FeedbackFilter::new()
            .allow("thumbs", "up")
            .allow("thumbs", "down");
        let summary = service
            .get_window_summary(&WindowQuery::all().feedback(filter), &CancelSignal::new())
            .unwrap();
        assert_eq!(summary.record_count, 3);
    });
}

#[test]
fn test_all_keys_must_match() {
    // A run carries one feedback annotation, so two required keys exclude all
    test_across_sources(thumbs_population(), |_, service| {
        let filter = FeedbackFilter::new()
            .allow("thumbs", "up")
            .allow("accuracy", "high");
        let summary = service
            .get_window_summary(&WindowQuery::all().feedback(filter), &CancelSignal::new())
            .unwrap();
        assert!(summary.is_empty());
        assert!(summary.feedback_counts.is_empty());
        assert!(summary
            .latency_percentiles
            .iter()
            .all(|lp| lp.latency.is_none()));
    });
}

#[test]
fn test_key_only_filter() {
    test_across_sources(thumbs_population(), |_, service| {
        let filter = FeedbackFilter::new().require_key("thumbs");
        let summary = service
            .get_window_summary(&WindowQuery::all().feedback(filter), &CancelSignal::new())
            .unwrap();
        assert_eq!(summary.record_count, 3);
        assert!(!run_ids(&summary).contains(&"d"));
    });
}

#[test]
fn test_filter_built_from_pairs() {
    test_across_sources(thumbs_population(), |_, service| {
        let filter: FeedbackFilter = vec![("thumbs".to_string(), "down".to_string())]
            .into_iter()
            .collect();
        let summary = service
            .get_window_summary(&WindowQuery::all().feedback(filter), &CancelSignal::new())
            .unwrap();
        assert_eq!(run_ids(&summary), vec!["c"]);
    });
}

#[test]
fn test_in_progress_runs_still_counted() {
    let spans = vec![
        completed("done", 0, 100).with_feedback(thumbs("up")),
        root("running", 10).with_feedback(thumbs("down")),
    ];

    test_across_sources(spans, |_, service| {
        let summary = service
            .get_window_summary(&WindowQuery::all(), &CancelSignal::new())
            .unwrap();
        let fc = summary.feedback_for("thumbs").unwrap();
        assert_eq!(fc.counts.get("down"), Some(&1));
        assert_eq!(summary.latency_at(50.0), Some(100.0));
    });
}

#[test]
fn test_scores_counted_by_score() {
    let spans = vec![
        completed("a", 0, 10).with_feedback(Feedback::new("rating", "good").with_score(1.0)),
        completed("b", 10, 10).with_feedback(Feedback::new("rating", "fine").with_score(1.0)),
        completed("c", 20, 10).with_feedback(Feedback::new("rating", "poor").with_score(0.25)),
    ];

    test_across_sources(spans, |_, service| {
        let summary = service
            .get_window_summary(&WindowQuery::all(), &CancelSignal::new())
            .unwrap();
        let fc = summary.feedback_for("rating").unwrap();
        assert_eq!(fc.counts.get("1"), Some(&2));
        assert_eq!(fc.counts.get("0.25"), Some(&1));

        // Filters accept the score label as well as the raw value
        let by_score = service
            .get_window_summary(
                &WindowQuery::all().feedback(FeedbackFilter::new().allow("rating", "1")),
                &CancelSignal::new(),
            )
            .unwrap();
        assert_eq!(by_score.record_count, 2);
    });
}

#[test]
fn test_keys_sorted() {
    let spans = vec![
        completed("a", 0, 10).with_feedback(thumbs("up")),
        completed("b", 10, 10).with_feedback(Feedback::new("accuracy", "high")),
        completed("c", 20, 10).with_feedback(Feedback::new("latency", "slow")),
    ];

    test_across_sources(spans, |_, service| {
        let summary = service
            .get_window_summary(&WindowQuery::all(), &CancelSignal::new())
            .unwrap();
        let keys: Vec<&str> = summary
            .feedback_counts
            .iter()
            .map(|fc| fc.key.as_str())
            .collect();
        assert_eq!(keys, vec!["accuracy", "latency", "thumbs"]);
    });
}

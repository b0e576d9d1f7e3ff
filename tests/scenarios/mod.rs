use waterfall_detector::query_key;
use waterfall_detector::DetectorConfig;
use waterfall_detector::QueryStatus;

use crate::common::watch;

#[test]
fn query_settling_alone_is_not_a_waterfall() {
    let harness = watch(DetectorConfig::default(), |cache| {
        cache.set_status(query_key!["a"], QueryStatus::Pending);
    });

    harness.cache.set_status(query_key!["a"], QueryStatus::Success);

    assert_eq!(harness.reporter.report_count(), 0);
    assert!(harness.handle.pending_hashes().is_empty());
}

#[test]
fn query_starting_alone_is_not_a_waterfall() {
    let harness = watch(DetectorConfig::default(), |_| {});

    harness.cache.set_status(query_key!["b"], QueryStatus::Pending);

    assert_eq!(harness.reporter.report_count(), 0);
    assert_eq!(harness.handle.pending_hashes(), vec![r#"["b"]"#]);
}

#[test]
fn settle_and_start_in_one_batch_is_reported() {
    let harness = watch(DetectorConfig::default(), |cache| {
        cache.set_status(query_key!["a"], QueryStatus::Pending);
    });

    harness.cache.batch(|cache| {
        cache.set_status(query_key!["a"], QueryStatus::Success);
        cache.set_status(query_key!["b"], QueryStatus::Pending);
    });

    assert_eq!(harness.reporter.reports(), vec![vec![r#"["a"] --> ["b"]"#.to_string()]]);
}

#[test]
fn unbatched_settle_then_start_is_two_quiet_cycles() {
    let harness = watch(DetectorConfig::default(), |cache| {
        cache.set_status(query_key!["a"], QueryStatus::Pending);
    });

    // Each mutation is its own change interval.
    harness.cache.set_status(query_key!["a"], QueryStatus::Success);
    harness.cache.set_status(query_key!["b"], QueryStatus::Pending);

    assert_eq!(harness.reporter.report_count(), 0);
}

#[test]
fn unrelated_status_changes_never_report() {
    let harness = watch(DetectorConfig::default(), |cache| {
        cache.set_status(query_key!["a"], QueryStatus::Pending);
        cache.set_status(query_key!["done"], QueryStatus::Success);
    });

    harness.cache.batch(|cache| {
        cache.set_status(query_key!["done"], QueryStatus::Error);
        cache.set_status(query_key!["idle"], QueryStatus::Idle);
        cache.set_status(query_key!["a"], QueryStatus::Pending);
    });
    harness.cache.set_status(query_key!["done"], QueryStatus::Success);

    assert_eq!(harness.reporter.report_count(), 0);
    assert_eq!(harness.handle.pending_hashes(), vec![r#"["a"]"#]);
}

#[test]
fn legacy_loading_status_counts_as_in_flight() {
    let harness = watch(DetectorConfig::default(), |cache| {
        cache.set_status(query_key!["a"], QueryStatus::Loading);
    });

    harness.cache.batch(|cache| {
        cache.set_status(query_key!["a"], QueryStatus::Success);
        cache.set_status(query_key!["b"], QueryStatus::Loading);
    });

    assert_eq!(harness.reporter.reports(), vec![vec![r#"["a"] --> ["b"]"#.to_string()]]);
}

#[test]
fn two_by_two_produces_four_pairs_in_one_report() {
    let harness = watch(DetectorConfig::default(), |cache| {
        cache.set_status(query_key!["f1"], QueryStatus::Pending);
        cache.set_status(query_key!["f2"], QueryStatus::Pending);
    });

    harness.cache.batch(|cache| {
        cache.set_status(query_key!["f1"], QueryStatus::Success);
        cache.set_status(query_key!["f2"], QueryStatus::Success);
        cache.set_status(query_key!["s1"], QueryStatus::Pending);
        cache.set_status(query_key!["s2"], QueryStatus::Pending);
    });

    let reports = harness.reporter.reports();
    assert_eq!(reports.len(), 1);
    let mut pairs = reports[0].clone();
    pairs.sort();
    assert_eq!(
        pairs,
        vec![
            r#"["f1"] --> ["s1"]"#,
            r#"["f1"] --> ["s2"]"#,
            r#"["f2"] --> ["s1"]"#,
            r#"["f2"] --> ["s2"]"#,
        ]
    );
}

#[test]
fn exemption_suppresses_only_matching_pairs() {
    let config = DetectorConfig::default().with_exemption(query_key!["users"], query_key!["users", "*", "posts"]);
    let harness = watch(config, |cache| {
        cache.set_status(query_key!["users"], QueryStatus::Pending);
    });

    harness.cache.batch(|cache| {
        cache.set_status(query_key!["users"], QueryStatus::Success);
        cache.set_status(query_key!["users", "42", "posts"], QueryStatus::Pending);
        cache.set_status(query_key!["comments"], QueryStatus::Pending);
    });

    assert_eq!(
        harness.reporter.reports(),
        vec![vec![r#"["users"] --> ["comments"]"#.to_string()]]
    );
}

#[test]
fn fully_exempt_cycle_emits_nothing_but_advances_state() {
    let config = DetectorConfig::default().with_exemption(query_key!["users"], query_key!["users", "*", "posts"]);
    let harness = watch(config, |cache| {
        cache.set_status(query_key!["users"], QueryStatus::Pending);
    });

    harness.cache.batch(|cache| {
        cache.set_status(query_key!["users"], QueryStatus::Success);
        cache.set_status(query_key!["users", "42", "posts"], QueryStatus::Pending);
    });

    assert_eq!(harness.reporter.report_count(), 0);
    assert_eq!(harness.handle.pending_hashes(), vec![r#"["users","42","posts"]"#]);
}

#[test]
fn chained_waterfall_reports_each_step() {
    let harness = watch(DetectorConfig::default(), |cache| {
        cache.set_status(query_key!["user"], QueryStatus::Pending);
    });

    harness.cache.batch(|cache| {
        cache.set_status(query_key!["user"], QueryStatus::Success);
        cache.set_status(query_key!["posts"], QueryStatus::Pending);
    });
    harness.cache.batch(|cache| {
        cache.set_status(query_key!["posts"], QueryStatus::Success);
        cache.set_status(query_key!["comments"], QueryStatus::Pending);
    });

    assert_eq!(
        harness.reporter.reports(),
        vec![
            vec![r#"["user"] --> ["posts"]"#.to_string()],
            vec![r#"["posts"] --> ["comments"]"#.to_string()],
        ]
    );
}

#[test]
fn removed_pending_query_counts_as_finished() {
    let harness = watch(DetectorConfig::default(), |cache| {
        cache.set_status(query_key!["a"], QueryStatus::Pending);
    });

    harness.cache.batch(|cache| {
        cache.remove(&query_key!["a"]);
        cache.set_status(query_key!["b"], QueryStatus::Pending);
    });

    assert_eq!(harness.reporter.reports(), vec![vec![r#"["a"] --> ["b"]"#.to_string()]]);
}

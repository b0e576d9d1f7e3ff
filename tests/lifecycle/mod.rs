use std::sync::Arc;

use waterfall_detector::query_key;
use waterfall_detector::watch_waterfalls;
use waterfall_detector::DetectorConfig;
use waterfall_detector::MemoryQueryCache;
use waterfall_detector::QueryStatus;

use crate::common::watch;

#[test]
fn queries_pending_before_watch_are_baseline() {
    let harness = watch(DetectorConfig::default(), |cache| {
        cache.set_status(query_key!["early"], QueryStatus::Pending);
    });

    assert_eq!(harness.handle.pending_hashes(), vec![r#"["early"]"#]);
    assert_eq!(harness.reporter.report_count(), 0);
}

#[test]
fn unsubscribe_stops_reporting() {
    let harness = watch(DetectorConfig::default(), |cache| {
        cache.set_status(query_key!["a"], QueryStatus::Pending);
    });
    let cache = harness.cache.clone();
    let reporter = harness.reporter.clone();

    harness.handle.unsubscribe();
    cache.batch(|cache| {
        cache.set_status(query_key!["a"], QueryStatus::Success);
        cache.set_status(query_key!["b"], QueryStatus::Pending);
    });

    assert_eq!(reporter.report_count(), 0);
    assert_eq!(cache.listener_count(), 0);
}

#[test]
fn detectors_on_same_cache_are_independent() {
    let cache = Arc::new(MemoryQueryCache::new());
    cache.set_status(query_key!["a"], QueryStatus::Pending);

    let first = watch_waterfalls(cache.clone(), DetectorConfig::default()).unwrap();
    cache.set_status(query_key!["b"], QueryStatus::Pending);
    let second = watch_waterfalls(cache.clone(), DetectorConfig::default()).unwrap();

    assert_eq!(first.pending_hashes(), vec![r#"["a"]"#, r#"["b"]"#]);
    assert_eq!(second.pending_hashes(), vec![r#"["a"]"#, r#"["b"]"#]);
    assert_eq!(cache.listener_count(), 2);

    first.unsubscribe();
    cache.set_status(query_key!["c"], QueryStatus::Pending);

    assert_eq!(second.pending_hashes(), vec![r#"["a"]"#, r#"["b"]"#, r#"["c"]"#]);
    assert_eq!(cache.listener_count(), 1);
}

#[test]
fn detector_watches_empty_cache() {
    let cache = Arc::new(MemoryQueryCache::new());

    let handle = watch_waterfalls(cache.clone(), DetectorConfig::default()).unwrap();
    cache.clear();

    assert!(handle.pending_hashes().is_empty());
    assert!(handle.is_active());
}

//! Architectural Contract Test: Change Detection
//!
//! This test verifies that updaters are only invoked when the discovered
//! address set differs from the last applied one.
//!
//! Constraints verified:
//! - An unchanged address set never reaches any updater
//! - A changed address set reaches every updater exactly once
//! - Force overrides the comparison
//! - The new set is cached and flushed after a successful run
//!
//! If this test fails, redundant DNS updates (or missed ones) are possible.

mod common;

use common::*;
use ddns_core::traits::ChangeCache;
use ddns_core::{AddressSet, DdnsEngine, EngineOptions, FileCache, MemoryCache, RunOutcome};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn unchanged_addresses_do_not_invoke_updaters() {
    let cache = primed_cache(&["10.0.0.5"]).await;
    let updater = MockUpdater::new("dns_test");

    let engine = DdnsEngine::new(
        finders(vec![StaticFinder::new("address_test", &["10.0.0.5"])]),
        updaters(&[&updater]),
        cache,
        EngineOptions::default(),
    );

    let outcome = engine.run().await.unwrap();

    assert!(matches!(outcome, RunOutcome::Unchanged(_)));
    assert_eq!(
        updater.merge_call_count(),
        0,
        "Expected no updater invocation for an unchanged address set"
    );
}

#[tokio::test]
async fn changed_addresses_invoke_every_updater_once() {
    let cache = primed_cache(&["10.0.0.5"]).await;
    let first = MockUpdater::new("dns_first");
    let second = MockUpdater::new("dns_second");

    let engine = DdnsEngine::new(
        finders(vec![StaticFinder::new("address_test", &["10.0.0.6"])]),
        updaters(&[&first, &second]),
        cache.clone(),
        EngineOptions::default(),
    );

    engine.run().await.unwrap();

    let expected: AddressSet = [ip("10.0.0.6")].into_iter().collect();
    for updater in [&first, &second] {
        assert_eq!(updater.merge_call_count(), 1);
        assert_eq!(updater.received_sets(), vec![expected.clone()]);
    }

    assert_eq!(
        cache.get("ddnsupdater", "addresses").await,
        Some(vec!["10.0.0.6".to_string()])
    );
}

#[tokio::test]
async fn force_invokes_updaters_for_unchanged_addresses() {
    let cache = primed_cache(&["10.0.0.5"]).await;
    let updater = MockUpdater::new("dns_test");

    let engine = DdnsEngine::new(
        finders(vec![StaticFinder::new("address_test", &["10.0.0.5"])]),
        updaters(&[&updater]),
        cache,
        EngineOptions {
            force: true,
            dry_run: false,
        },
    );

    let outcome = engine.run().await.unwrap();

    assert!(matches!(outcome, RunOutcome::Updated(_)));
    assert_eq!(updater.merge_call_count(), 1);
    assert_eq!(updater.received_flags(), vec![(true, false)]);
}

#[tokio::test]
async fn cold_cache_invokes_updaters() {
    let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));
    let updater = MockUpdater::new("dns_test");

    let engine = DdnsEngine::new(
        finders(vec![StaticFinder::new("address_test", &["192.0.2.1"])]),
        updaters(&[&updater]),
        cache,
        EngineOptions::default(),
    );

    engine.run().await.unwrap();

    assert_eq!(updater.merge_call_count(), 1);
}

#[tokio::test]
async fn finder_results_are_merged_and_normalized() {
    let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));
    let updater = MockUpdater::new("dns_test");

    let engine = DdnsEngine::new(
        finders(vec![
            StaticFinder::new("address_interface", &["2001:db8::1", "192.0.2.10"]),
            StaticFinder::new("address_web", &["::ffff:192.0.2.9", "192.0.2.10"]),
        ]),
        updaters(&[&updater]),
        cache,
        EngineOptions::default(),
    );

    engine.run().await.unwrap();

    let received = updater.received_sets();
    assert_eq!(received.len(), 1);
    assert_eq!(
        received[0].to_strings(),
        vec!["192.0.2.9", "192.0.2.10", "2001:db8::1"]
    );
}

#[tokio::test]
async fn second_run_after_restart_is_suppressed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.toml");
    let updater = MockUpdater::new("dns_test");

    for _ in 0..2 {
        let cache = Arc::new(FileCache::open(&path, Duration::from_secs(3600)).await);
        let engine = DdnsEngine::new(
            finders(vec![StaticFinder::new("address_test", &["203.0.113.7"])]),
            updaters(&[&updater]),
            cache,
            EngineOptions::default(),
        );
        engine.run().await.unwrap();
    }

    assert_eq!(
        updater.merge_call_count(),
        1,
        "Expected the persisted cache to suppress the second run"
    );
}

#[tokio::test]
async fn successful_run_flushes_once() {
    let cache = Arc::new(CountingCache::new());
    let updater = MockUpdater::new("dns_test");

    let engine = DdnsEngine::new(
        finders(vec![StaticFinder::new("address_test", &["192.0.2.1"])]),
        updaters(&[&updater]),
        cache.clone(),
        EngineOptions::default(),
    );

    engine.run().await.unwrap();

    assert_eq!(cache.flush_call_count(), 1);
}

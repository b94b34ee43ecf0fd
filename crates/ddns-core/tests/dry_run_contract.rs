//! Architectural Contract Test: Dry Run
//!
//! This test verifies that a dry run computes the change without
//! persisting anything.
//!
//! Constraints verified:
//! - Updaters are still invoked, with the dry-run flag set
//! - The cache is never flushed
//! - A later real run still sees the change
//!
//! If this test fails, dry runs may mutate persisted state.

mod common;

use common::*;
use ddns_core::{DdnsEngine, EngineOptions, FileCache};
use std::sync::Arc;
use std::time::Duration;

fn dry_run() -> EngineOptions {
    EngineOptions {
        force: false,
        dry_run: true,
    }
}

#[tokio::test]
async fn dry_run_passes_flag_and_skips_flush() {
    let cache = Arc::new(CountingCache::new());
    let updater = MockUpdater::new("dns_test");

    let engine = DdnsEngine::new(
        finders(vec![StaticFinder::new("address_test", &["192.0.2.1"])]),
        updaters(&[&updater]),
        cache.clone(),
        dry_run(),
    );

    engine.run().await.unwrap();

    assert_eq!(updater.received_flags(), vec![(false, true)]);
    assert_eq!(cache.flush_call_count(), 0);
}

#[tokio::test]
async fn dry_run_leaves_cache_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.toml");
    let updater = MockUpdater::new("dns_test");

    let engine = DdnsEngine::new(
        finders(vec![StaticFinder::new("address_test", &["192.0.2.1"])]),
        updaters(&[&updater]),
        Arc::new(FileCache::open(&path, Duration::from_secs(3600)).await),
        dry_run(),
    );
    engine.run().await.unwrap();

    assert!(!path.exists(), "Dry run must not create the cache file");

    // The real run still detects the change
    let engine = DdnsEngine::new(
        finders(vec![StaticFinder::new("address_test", &["192.0.2.1"])]),
        updaters(&[&updater]),
        Arc::new(FileCache::open(&path, Duration::from_secs(3600)).await),
        EngineOptions::default(),
    );
    engine.run().await.unwrap();

    assert_eq!(updater.merge_call_count(), 2);
    assert!(path.exists());
}

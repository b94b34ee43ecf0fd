//! Test doubles and common utilities for engine contract tests
//!
//! This module provides minimal test doubles that verify the engine's
//! orchestration without probing or updating anything real.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{AddressFinder, ChangeCache, DnsUpdater};
use ddns_core::{AddressSet, MemoryCache, SharedCache};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Parse an address literal
pub fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

/// An AddressFinder returning a fixed list (or a fixed failure)
pub struct StaticFinder {
    name: String,
    addresses: Vec<IpAddr>,
    fail: bool,
    run_call_count: Arc<AtomicUsize>,
}

impl StaticFinder {
    pub fn new(name: &str, addresses: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            addresses: addresses.iter().map(|s| ip(s)).collect(),
            fail: false,
            run_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A finder whose probe always fails
    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(name, &[])
        }
    }

    /// Get the number of times run() was called
    pub fn run_call_count(&self) -> usize {
        self.run_call_count.load(Ordering::SeqCst)
    }

    /// Create a new StaticFinder that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            name: other.name.clone(),
            addresses: other.addresses.clone(),
            fail: other.fail,
            run_call_count: Arc::clone(&other.run_call_count),
        }
    }
}

#[async_trait::async_trait]
impl AddressFinder for StaticFinder {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> Result<Vec<IpAddr>> {
        self.run_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::finder("no capable network interface"));
        }
        Ok(self.addresses.clone())
    }
}

/// A DnsUpdater that records every merge call
pub struct MockUpdater {
    name: String,
    fail: bool,
    merge_call_count: Arc<AtomicUsize>,
    /// Address sets received, with the force and dry-run flags
    received: Arc<Mutex<Vec<(AddressSet, bool, bool)>>>,
}

impl MockUpdater {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail: false,
            merge_call_count: Arc::new(AtomicUsize::new(0)),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// An updater whose merge always fails
    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(name)
        }
    }

    /// Get the number of times merge() was called
    pub fn merge_call_count(&self) -> usize {
        self.merge_call_count.load(Ordering::SeqCst)
    }

    /// Get the address sets passed to merge()
    pub fn received_sets(&self) -> Vec<AddressSet> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|(set, _, _)| set.clone())
            .collect()
    }

    /// Get the (force, dry_run) flags passed to merge()
    pub fn received_flags(&self) -> Vec<(bool, bool)> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|(_, force, dry_run)| (*force, *dry_run))
            .collect()
    }

    /// Create a new MockUpdater that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            name: other.name.clone(),
            fail: other.fail,
            merge_call_count: Arc::clone(&other.merge_call_count),
            received: Arc::clone(&other.received),
        }
    }
}

#[async_trait::async_trait]
impl DnsUpdater for MockUpdater {
    fn name(&self) -> &str {
        &self.name
    }

    async fn merge(&self, addresses: &AddressSet, force: bool, dry_run: bool) -> Result<()> {
        self.merge_call_count.fetch_add(1, Ordering::SeqCst);
        self.received
            .lock()
            .unwrap()
            .push((addresses.clone(), force, dry_run));

        if self.fail {
            return Err(Error::http("backend rejected the change batch"));
        }
        Ok(())
    }
}

/// A ChangeCache wrapper counting flushes
pub struct CountingCache {
    inner: MemoryCache,
    flush_call_count: Arc<AtomicUsize>,
}

impl CountingCache {
    pub fn new() -> Self {
        Self {
            inner: MemoryCache::new(Duration::from_secs(3600)),
            flush_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times flush() was called
    pub fn flush_call_count(&self) -> usize {
        self.flush_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ChangeCache for CountingCache {
    async fn get(&self, context: &str, name: &str) -> Option<Vec<String>> {
        self.inner.get(context, name).await
    }

    async fn put(&self, context: &str, name: &str, values: Vec<String>) {
        self.inner.put(context, name, values).await
    }

    async fn flush(&self) -> Result<()> {
        self.flush_call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.flush().await
    }
}

/// A memory cache primed with a last applied address set
pub async fn primed_cache(addresses: &[&str]) -> SharedCache {
    let cache = MemoryCache::new(Duration::from_secs(3600));
    cache
        .put(
            "ddnsupdater",
            "addresses",
            addresses.iter().map(|s| s.to_string()).collect(),
        )
        .await;
    Arc::new(cache)
}

/// Box a finder for the engine
pub fn finders(list: Vec<StaticFinder>) -> Vec<Box<dyn AddressFinder>> {
    list.into_iter()
        .map(|f| Box::new(f) as Box<dyn AddressFinder>)
        .collect()
}

/// Box updaters sharing counters with the given ones
pub fn updaters(list: &[&MockUpdater]) -> Vec<Box<dyn DnsUpdater>> {
    list.iter()
        .map(|u| Box::new(MockUpdater::sharing_counters_with(u)) as Box<dyn DnsUpdater>)
        .collect()
}

// # Memory Cache
//
// In-memory implementation of ChangeCache.
//
// ## Purpose
//
// Backs the `disabled` cache mode: reads and writes behave exactly like the
// file cache within one run, but nothing is ever written to disk. Every run
// therefore starts cold and updates all configured updaters.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::RwLock;

use super::Entries;
use crate::Error;
use crate::traits::cache::{ChangeCache, cache_key};

/// In-memory change cache
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::cache::MemoryCache;
/// use ddns_core::traits::ChangeCache;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let cache = MemoryCache::new(Duration::from_secs(3600));
///
///     cache.put("ddnsupdater", "addresses", vec!["192.0.2.1".to_string()]).await;
///
///     let values = cache.get("ddnsupdater", "addresses").await;
///     assert_eq!(values, Some(vec!["192.0.2.1".to_string()]));
/// }
/// ```
#[derive(Debug)]
pub struct MemoryCache {
    validity: Duration,
    inner: RwLock<Entries>,
}

impl MemoryCache {
    /// Create an empty memory cache
    pub fn new(validity: Duration) -> Self {
        Self {
            validity,
            inner: RwLock::new(Entries::default()),
        }
    }

    /// Number of stored entries (expired ones included until the next flush)
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }
}

#[async_trait]
impl ChangeCache for MemoryCache {
    async fn get(&self, context: &str, name: &str) -> Option<Vec<String>> {
        self.inner.read().await.get(&cache_key(context, name))
    }

    async fn put(&self, context: &str, name: &str, values: Vec<String>) {
        self.inner
            .write()
            .await
            .put(cache_key(context, name), values, self.validity);
    }

    async fn flush(&self) -> Result<(), Error> {
        // Nothing is persisted; expired entries are still dropped
        let mut guard = self.inner.write().await;
        if guard.dirty {
            guard.purge_expired();
            guard.dirty = false;
        }
        Ok(())
    }
}

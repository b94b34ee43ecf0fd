//! Change cache implementations
//!
//! - [`FileCache`]: TOML file in the per-user cache directory
//! - [`MemoryCache`]: Never persisted (cache disabled)
//!
//! Use [`open_cache`] to build the cache selected by the configuration.

pub mod file;
pub mod memory;

pub use file::FileCache;
pub use memory::MemoryCache;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{CacheMode, GlobalConfig};
use crate::error::Result;
use crate::traits::ChangeCache;

/// Cache handle shared by the engine and the finders that need it
pub type SharedCache = Arc<dyn ChangeCache>;

/// Open the cache selected by the global configuration
pub async fn open_cache(global: &GlobalConfig) -> Result<SharedCache> {
    let validity = global.cache_validity();
    match global.cache {
        CacheMode::Enabled => Ok(Arc::new(
            FileCache::open(global.cache_path()?, validity).await,
        )),
        CacheMode::Reset => Ok(Arc::new(FileCache::reset(global.cache_path()?, validity))),
        CacheMode::Disabled => {
            tracing::debug!("Cache disabled, entries are kept in memory only");
            Ok(Arc::new(MemoryCache::new(validity)))
        }
    }
}

/// One cached value list with its expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Entry is valid until this instant
    pub valid_till: DateTime<Utc>,
    /// Cached values
    pub values: Vec<String>,
}

impl CacheEntry {
    fn new(values: Vec<String>, validity: Duration) -> Self {
        let valid_till = TimeDelta::from_std(validity)
            .ok()
            .and_then(|delta| Utc::now().checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { valid_till, values }
    }

    /// Whether the entry has not expired yet
    pub fn is_valid(&self) -> bool {
        Utc::now() < self.valid_till
    }
}

/// In-memory entry map shared by both implementations
#[derive(Debug, Default)]
struct Entries {
    entries: BTreeMap<String, CacheEntry>,
    dirty: bool,
}

impl Entries {
    fn from_map(entries: BTreeMap<String, CacheEntry>) -> Self {
        Self {
            entries,
            dirty: false,
        }
    }

    fn get(&self, key: &str) -> Option<Vec<String>> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_valid())
            .map(|entry| entry.values.clone())
    }

    fn put(&mut self, key: String, values: Vec<String>, validity: Duration) {
        self.entries.insert(key, CacheEntry::new(values, validity));
        self.dirty = true;
    }

    /// Replace the map by its still valid entries
    fn purge_expired(&mut self) -> usize {
        let before = self.entries.len();
        let retained: BTreeMap<String, CacheEntry> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_valid())
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect();
        self.entries = retained;
        before - self.entries.len()
    }
}

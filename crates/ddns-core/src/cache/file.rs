// # File Cache
//
// File-based implementation of ChangeCache.
//
// ## Purpose
//
// Remembers the last applied address set across runs so that an unchanged
// address set does not trigger any DNS update.
//
// ## Crash Behavior
//
// - Atomic writes: the new content is written to a temporary file, then renamed
// - Read tolerance: an unreadable or undecodable file is treated as a cold cache
// - Write failures (directory or file) are reported by `flush`
//
// ## File Format
//
// ```toml
// ["ddnsupdater.addresses"]
// valid_till = "2025-01-09T12:00:00Z"
// values = ["192.0.2.1", "2001:db8::1"]
//
// ["address_upnp.igd_location"]
// valid_till = "2025-01-09T12:00:00Z"
// values = ["http://192.168.1.1:49000/igddesc.xml"]
// ```

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, trace, warn};

use super::{CacheEntry, Entries};
use crate::Error;
use crate::traits::cache::{ChangeCache, cache_key};

/// File-backed change cache
///
/// The whole file is loaded on open and fully rewritten on every flush
/// that follows a write.
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::cache::FileCache;
/// use ddns_core::traits::ChangeCache;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let cache = FileCache::open("/var/cache/ddns-updater/cache.toml", Duration::from_secs(86400)).await;
///
///     cache.put("ddnsupdater", "addresses", vec!["192.0.2.1".to_string()]).await;
///     cache.flush().await?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    validity: Duration,
    state: RwLock<Entries>,
}

impl FileCache {
    /// Open a file cache, loading any persisted entries
    ///
    /// A missing, unreadable or corrupted file yields an empty cache.
    pub async fn open<P: AsRef<Path>>(path: P, validity: Duration) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match Self::load(&path).await {
            Ok(entries) => {
                debug!("Loaded {} cache entries from {}", entries.len(), path.display());
                entries
            }
            Err(e) => {
                warn!("Ignoring unreadable cache file: {}", e);
                BTreeMap::new()
            }
        };

        Self {
            path,
            validity,
            state: RwLock::new(Entries::from_map(entries)),
        }
    }

    /// Open a file cache discarding any persisted entries
    ///
    /// The file is not touched until the next flush, which rewrites it with
    /// the entries of the current run only.
    pub fn reset<P: AsRef<Path>>(path: P, validity: Duration) -> Self {
        let path = path.as_ref().to_path_buf();
        debug!("Resetting cache {}", path.display());
        let mut entries = Entries::default();
        entries.dirty = true;

        Self {
            path,
            validity,
            state: RwLock::new(entries),
        }
    }

    /// Location of the cache file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(path: &Path) -> Result<BTreeMap<String, CacheEntry>, Error> {
        if !path.exists() {
            debug!("Cache file does not exist: {}", path.display());
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::cache(format!(
                "failed to read cache file {}: {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            Error::cache(format!(
                "failed to decode cache file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Write entries to the cache file atomically
    async fn write(&self, entries: &BTreeMap<String, CacheEntry>) -> Result<(), Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::cache(format!(
                    "failed to create cache directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let content = toml::to_string_pretty(entries)?;

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::cache(format!(
                    "failed to create cache file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(content.as_bytes()).await.map_err(|e| {
                Error::cache(format!(
                    "failed to write cache file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::cache(format!(
                    "failed to flush cache file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::cache(format!(
                "failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        trace!("Cache written to file: {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }
}

#[async_trait]
impl ChangeCache for FileCache {
    async fn get(&self, context: &str, name: &str) -> Option<Vec<String>> {
        self.state.read().await.get(&cache_key(context, name))
    }

    async fn put(&self, context: &str, name: &str, values: Vec<String>) {
        self.state
            .write()
            .await
            .put(cache_key(context, name), values, self.validity);
    }

    async fn flush(&self) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if !state.dirty {
            return Ok(());
        }

        let purged = state.purge_expired();
        if purged > 0 {
            debug!("Purged {} expired cache entries", purged);
        }

        self.write(&state.entries).await?;
        state.dirty = false;
        Ok(())
    }
}

// # Change Cache Trait
//
// Defines the interface for the key/value cache that remembers the last
// applied address set (and other small facts such as the last known UPnP
// gateway location) between runs.
//
// ## Keys
//
// Entries are addressed by a context and a name. Implementations store them
// under the composite key `context.name`.
//
// ## Expiry
//
// Every write stamps the entry with `now + validity`. An expired entry reads
// as absent and is purged on the next flush.

use async_trait::async_trait;

/// Compose the storage key of a cache entry
pub fn cache_key(context: &str, name: &str) -> String {
    format!("{}.{}", context, name)
}

/// Trait for change cache implementations
///
/// `get` and `put` are pure in-memory operations; `flush` is the only one
/// performing I/O. Reads never fail: a missing or expired entry is `None`.
#[async_trait]
pub trait ChangeCache: Send + Sync {
    /// Get the cached values of an entry
    ///
    /// # Returns
    ///
    /// - `Some(values)`: The entry exists and has not expired
    /// - `None`: No entry, or the entry expired
    async fn get(&self, context: &str, name: &str) -> Option<Vec<String>>;

    /// Replace an entry, stamping it with a fresh expiry
    async fn put(&self, context: &str, name: &str, values: Vec<String>);

    /// Persist pending changes
    ///
    /// No-op if nothing was written since the last flush. Otherwise expired
    /// entries are purged and the surviving entries are written out.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Successfully flushed (or nothing to do)
    /// - `Err(Error)`: The cache could not be written
    async fn flush(&self) -> Result<(), crate::Error>;
}

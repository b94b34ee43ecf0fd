// # ddns-core
//
// Core library of ddns-updater.
//
// ## Architecture Overview
//
// This library provides the address aggregation and DNS reconciliation engine:
// - **AddressSet**: Deduplicated, byte-ordered set of discovered addresses
// - **AddressFinder**: Trait for probing one source for the host's public addresses
// - **DnsUpdater**: Trait for reconciling an address set against one DNS backend
// - **ChangeCache**: Trait for the persistent key/value cache used for change detection
// - **DdnsEngine**: Runs finders, detects changes and drives the updaters
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Probing and updating live in their own crates
// 2. **Fail Fast**: Any finder or updater error aborts the whole run
// 3. **Idempotency**: Updaters are only invoked when the address set changed
// 4. **Library-First**: The engine can be embedded without the daemon

pub mod address;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod traits;

// Re-export core types for convenience
pub use address::{AddressSet, normalize_ip};
pub use cache::{FileCache, MemoryCache, SharedCache, open_cache};
pub use config::{CacheMode, DdnsConfig, FinderConfig, UpdaterConfig};
pub use engine::{DdnsEngine, EngineOptions, RunOutcome};
pub use error::{Error, Result};
pub use traits::{AddressFinder, ChangeCache, DnsUpdater};

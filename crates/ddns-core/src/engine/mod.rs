//! Core DDNS engine
//!
//! The DdnsEngine is responsible for:
//! - Running every configured AddressFinder
//! - Normalizing the discovered addresses into one AddressSet
//! - Checking the ChangeCache for the last applied set
//! - Invoking every DnsUpdater when the set changed (or when forced)
//! - Flushing the cache at the end of a successful run
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐
//! │ AddressFinder │── Vec<IpAddr> ──┐      (one after another, in order)
//! └───────────────┘                 │
//!                                   ▼
//!                           ┌──────────────┐
//!                           │  DdnsEngine  │── AddressSet
//!                           └──────────────┘
//!                                   │
//!              ┌────────────────────┴────────────────────┐
//!              ▼                                         ▼
//!      ┌──────────────┐                          ┌──────────────┐
//!      │ ChangeCache  │                          │  DnsUpdater  │
//!      │ (compare,    │                          │  (merge)     │
//!      │  put, flush) │                          └──────────────┘
//!      └──────────────┘
//! ```
//!
//! ## Run Flow
//!
//! 1. Run all finders; the first error aborts the run
//! 2. Merge all results into an AddressSet; empty → done
//! 3. Compare with the cached set; unchanged and not forced → done
//! 4. Cache the new set, then merge it into every updater; the first error aborts
//! 5. Unless dry-run, flush the cache

use std::net::IpAddr;
use tracing::{debug, info, warn};

use crate::address::{AddressSet, normalize_ip};
use crate::cache::SharedCache;
use crate::error::{Error, Result};
use crate::traits::{AddressFinder, DnsUpdater};

/// Cache context of the last applied address set
pub const CACHE_CONTEXT: &str = "ddnsupdater";

/// Cache entry name of the last applied address set
pub const CACHE_ADDRESSES: &str = "addresses";

/// Per-run switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Update even if the addresses did not change
    pub force: bool,

    /// Compute and log changes without applying them
    pub dry_run: bool,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No finders or no updaters are configured
    NothingConfigured,

    /// The finders did not return any address
    NoAddresses,

    /// The discovered set equals the last applied one
    Unchanged(AddressSet),

    /// Every updater merged the discovered set
    Updated(AddressSet),
}

/// Core DDNS engine
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`] from the finders, updaters and cache
///    assembled at startup
/// 2. Call [`DdnsEngine::run()`] once per invocation
///
/// The engine owns the cache's flush. It never retries: every failure aborts
/// the run and the operator (or an external scheduler) re-invokes it.
pub struct DdnsEngine {
    /// Address finders, in configured order
    finders: Vec<Box<dyn AddressFinder>>,

    /// DNS updaters, in configured order
    updaters: Vec<Box<dyn DnsUpdater>>,

    /// Change cache (shared with finders that keep their own entries)
    cache: SharedCache,

    /// Per-run switches
    options: EngineOptions,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Parameters
    ///
    /// - `finders`: Address finders to run, in order
    /// - `updaters`: DNS updaters to invoke, in order
    /// - `cache`: Change cache of this run
    /// - `options`: Force and dry-run switches
    pub fn new(
        finders: Vec<Box<dyn AddressFinder>>,
        updaters: Vec<Box<dyn DnsUpdater>>,
        cache: SharedCache,
        options: EngineOptions,
    ) -> Self {
        Self {
            finders,
            updaters,
            cache,
            options,
        }
    }

    /// Run one reconciliation
    ///
    /// # Returns
    ///
    /// - `Ok(RunOutcome)`: The run completed (whether or not anything was updated)
    /// - `Err(Error)`: A finder, an updater or the cache flush failed
    pub async fn run(&self) -> Result<RunOutcome> {
        if self.finders.is_empty() {
            warn!("No address finders configured");
            return Ok(RunOutcome::NothingConfigured);
        }
        if self.updaters.is_empty() {
            warn!("No DNS updaters configured");
            return Ok(RunOutcome::NothingConfigured);
        }

        // Only a successful run reaches the flush; errors discard pending writes
        let outcome = self.reconcile().await?;
        self.finish().await?;
        Ok(outcome)
    }

    async fn reconcile(&self) -> Result<RunOutcome> {
        let addresses: AddressSet = self
            .find_addresses()
            .await?
            .into_iter()
            .map(normalize_ip)
            .collect();
        if addresses.is_empty() {
            warn!("No addresses found, nothing to update");
            return Ok(RunOutcome::NoAddresses);
        }
        info!("Found addresses {}", addresses);

        let cached = self.cache.get(CACHE_CONTEXT, CACHE_ADDRESSES).await;
        let unchanged = cached
            .as_deref()
            .is_some_and(|cached| addresses.matches_strings(cached));

        if unchanged && !self.options.force {
            info!("Addresses unchanged, nothing to update");
            return Ok(RunOutcome::Unchanged(addresses));
        }
        if unchanged {
            info!("Addresses unchanged, forcing update");
        } else {
            debug!("Addresses changed (cached: {:?})", cached);
        }

        self.cache
            .put(CACHE_CONTEXT, CACHE_ADDRESSES, addresses.to_strings())
            .await;
        self.update_addresses(&addresses).await?;

        Ok(RunOutcome::Updated(addresses))
    }

    /// Run every finder in order and concatenate the results
    async fn find_addresses(&self) -> Result<Vec<IpAddr>> {
        info!("Gathering addresses...");
        let mut found = Vec::new();
        for finder in &self.finders {
            debug!(finder = finder.name(), "Running address finder");
            let ips = finder
                .run()
                .await
                .map_err(|e| match e {
                    Error::Finder(message) => {
                        Error::finder(format!("{}: {}", finder.name(), message))
                    }
                    other => Error::finder(format!("{}: {}", finder.name(), other)),
                })?;
            found.extend(ips);
        }
        Ok(found)
    }

    /// Merge the address set into every updater in order
    async fn update_addresses(&self, addresses: &AddressSet) -> Result<()> {
        info!("Updating DNS...");
        for updater in &self.updaters {
            debug!(updater = updater.name(), "Running DNS updater");
            updater
                .merge(addresses, self.options.force, self.options.dry_run)
                .await
                .map_err(|e| match e {
                    Error::Updater { .. } => e,
                    other => Error::updater(updater.name(), other.to_string()),
                })?;
        }
        Ok(())
    }

    async fn finish(&self) -> Result<()> {
        if self.options.dry_run {
            debug!("Dry run, cache not flushed");
            return Ok(());
        }
        self.cache.flush().await
    }
}

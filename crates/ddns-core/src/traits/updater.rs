// # DNS Updater Trait
//
// Defines the interface for reconciling a normalized address set against
// one DNS backend.
//
// ## Implementations
//
// - Route 53 hosted zones: `ddns-provider-route53` crate
// - Web (dyndns style) update URLs: `ddns-provider-web` crate
// - Dummy (log only): `ddnsd`

use async_trait::async_trait;

use crate::address::AddressSet;

/// Trait for DNS updater implementations
///
/// # Contract
///
/// - The engine decides whether an update is needed. An updater always
///   attempts the merge when called.
/// - `force` tells the updater to proceed even if it would otherwise
///   consider the addresses unchanged.
/// - `dry_run` computes and logs the intended change but suppresses every
///   mutating call to the backend. Lookups still happen.
/// - Updaters do not retry and do not touch the change cache.
#[async_trait]
pub trait DnsUpdater: Send + Sync {
    /// Name used in logs and error messages
    fn name(&self) -> &str;

    /// Merge the address set into the backend's records
    ///
    /// # Parameters
    ///
    /// - `addresses`: The normalized address set of this run
    /// - `force`: Proceed even if the addresses look unchanged
    /// - `dry_run`: Log the change instead of applying it
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The change was applied (or would have been, in dry-run)
    /// - `Err(Error)`: If the merge failed; nothing is rolled back
    async fn merge(
        &self,
        addresses: &AddressSet,
        force: bool,
        dry_run: bool,
    ) -> Result<(), crate::Error>;
}

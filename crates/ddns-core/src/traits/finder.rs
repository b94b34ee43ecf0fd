// # Address Finder Trait
//
// Defines the interface for probing one mechanism for the host's current
// public address(es).
//
// ## Implementations
//
// - Interface scan: `ddns-ip-iface` crate
// - UPnP gateway: `ddns-ip-upnp` crate
// - Web services: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::AddressFinder;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let finder = /* AddressFinder implementation */;
//
//     for ip in finder.run().await? {
//         println!("{} found {}", finder.name(), ip);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for address finder implementations
///
/// # Contract
///
/// - A finder applies its own [`FinderConfig`](crate::FinderConfig) match
///   predicate before returning an address. The engine does not re-filter.
/// - IPv4-mapped IPv6 results are collapsed to their 4-byte form
///   (see [`normalize_ip`](crate::normalize_ip)) before matching.
/// - An empty result is not an error.
/// - A finder that cannot complete its probe returns a descriptive error;
///   the engine aborts the whole run on it.
/// - Finders do not retry. Any timeout belongs to the finder's own transport.
#[async_trait]
pub trait AddressFinder: Send + Sync {
    /// Name used in logs and error messages
    fn name(&self) -> &str;

    /// Probe for addresses
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<IpAddr>)`: The matching addresses (possibly none)
    /// - `Err(Error)`: If the probe could not be completed
    async fn run(&self) -> Result<Vec<IpAddr>, crate::Error>;
}

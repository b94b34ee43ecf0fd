// # Route 53 DNS Updater
//
// This crate provides the hosted-zone updater of ddns-updater.
//
// ## Architecture
//
// - `reconciler`: Zone resolution, record listing, per-type merge and the
//   upsert change batch. Backend independent.
// - `backend`: The `HostedZoneBackend` trait the reconciler talks to.
// - `aws`: The Amazon Route 53 implementation of that trait.
//
// ## Guarantees
//
// - A record sets only receive IPv4 addresses, AAAA record sets only IPv6
// - A record set is never emptied: a missing address family fails the merge
// - All record sets are upserted in one atomic change batch, TTLs preserved
// - Dry-run performs every lookup but never submits the change batch

pub mod aws;
pub mod backend;
mod reconciler;

pub use aws::Route53Backend;
pub use backend::{
    ChangeInfo, HostedZone, HostedZoneBackend, RecordCursor, RecordPage, RecordSet, RecordType,
    ZonePage,
};
pub use reconciler::{HostedZoneReconciler, UPDATER_NAME, merge_record_sets, zone_matches};

use ddns_core::Result;
use ddns_core::config::Route53UpdaterConfig;

/// Create the Route 53 updater described by the configuration
pub fn route53_updater(config: &Route53UpdaterConfig) -> Result<HostedZoneReconciler> {
    let backend = Route53Backend::new(config)?;
    Ok(HostedZoneReconciler::new(
        config.updater.host.clone(),
        Box::new(backend),
    ))
}

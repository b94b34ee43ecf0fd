//! Hosted zone reconciliation
//!
//! One `merge` runs four steps against the backend:
//!
//! 1. **Resolve zone**: page through the hosted zones until one is a suffix
//!    of the host (on a label boundary). First match wins.
//! 2. **List records**: page through the zone's record sets starting at the
//!    host, stopping at the first record of another name. Only A and AAAA
//!    record sets are kept.
//! 3. **Merge records**: A record sets receive every IPv4 address, AAAA
//!    record sets every IPv6 address. A record set left without values
//!    fails the whole merge.
//! 4. **Submit**: one upsert per record set, TTL preserved, in a single
//!    change batch. Skipped in dry-run.

use async_trait::async_trait;
use ddns_core::traits::DnsUpdater;
use ddns_core::{AddressSet, Error, Result};
use tracing::{debug, info, warn};

use crate::backend::{HostedZone, HostedZoneBackend, RecordCursor, RecordSet, RecordType};

/// Name of the Route 53 updater in logs and configuration
pub const UPDATER_NAME: &str = "dns_route53";

/// DNS updater reconciling address records of one host in a hosted zone
pub struct HostedZoneReconciler {
    name: String,
    host: String,
    backend: Box<dyn HostedZoneBackend>,
}

impl HostedZoneReconciler {
    /// Create a reconciler for `host` on the given backend
    pub fn new(host: impl Into<String>, backend: Box<dyn HostedZoneBackend>) -> Self {
        Self::with_name(UPDATER_NAME, host, backend)
    }

    /// Create a reconciler with a custom updater name
    pub fn with_name(
        name: impl Into<String>,
        host: impl Into<String>,
        backend: Box<dyn HostedZoneBackend>,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            backend,
        }
    }

    /// The host name with exactly one trailing dot
    fn fq_host(&self) -> String {
        fully_qualified(&self.host)
    }

    async fn resolve_zone(&self) -> Result<HostedZone> {
        let fq_host = self.fq_host();
        let mut marker: Option<String> = None;
        loop {
            let page = self
                .backend
                .list_hosted_zones(marker.as_deref())
                .await
                .map_err(|e| Error::http(format!("failed to list hosted zones: {}", e)))?;

            if let Some(zone) = page
                .zones
                .into_iter()
                .find(|zone| zone_matches(&fq_host, &zone.name))
            {
                debug!(updater = %self.name, "Using hosted zone '{}' ({})", zone.name, zone.id);
                return Ok(zone);
            }

            match page.next_marker {
                Some(next) => marker = Some(next),
                None => break,
            }
        }
        Err(Error::ZoneNotFound {
            host: self.host.clone(),
        })
    }

    async fn list_records(&self, zone: &HostedZone) -> Result<Vec<RecordSet>> {
        let fq_host = self.fq_host();
        let mut cursor = RecordCursor::at(fq_host.clone());
        let mut found = Vec::new();
        loop {
            let page = self
                .backend
                .list_record_sets(&zone.id, &cursor)
                .await
                .map_err(|e| Error::http(format!("failed to list resource record sets: {}", e)))?;

            for record_set in page.record_sets {
                // Record sets come sorted by name; past the host nothing else matches
                if !record_set.name.eq_ignore_ascii_case(&fq_host) {
                    return Ok(found);
                }
                if record_set.record_type.is_address() {
                    found.push(record_set);
                } else {
                    debug!(
                        updater = %self.name,
                        "Ignoring {} record set of '{}'", record_set.record_type, self.host
                    );
                }
            }

            match page.next {
                Some(next) => cursor = next,
                None => return Ok(found),
            }
        }
    }

    fn submit_lines(&self, merged: &[RecordSet]) {
        for record_set in merged {
            for value in &record_set.values {
                info!(
                    updater = %self.name,
                    "DDNS update '{}' {} {}", self.host, record_set.record_type, value
                );
            }
        }
    }
}

#[async_trait]
impl DnsUpdater for HostedZoneReconciler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn merge(&self, addresses: &AddressSet, _force: bool, dry_run: bool) -> Result<()> {
        info!(updater = %self.name, "Updating host '{}'...", self.host);

        let zone = self.resolve_zone().await?;
        let record_sets = self.list_records(&zone).await?;
        let merged = merge_record_sets(record_sets, addresses)?;
        self.submit_lines(&merged);

        if dry_run {
            warn!(updater = %self.name, "DDNS update skipped due to dry run");
            return Ok(());
        }

        let change = self
            .backend
            .upsert_record_sets(&zone.id, &merged)
            .await
            .map_err(|e| {
                Error::http(format!(
                    "changing resource record sets for zone id {} failed: {}",
                    zone.id, e
                ))
            })?;
        info!(
            updater = %self.name,
            "DDNS update applied ({}:{})", change.id, change.status
        );
        Ok(())
    }
}

/// Replace the values of every address record set by the matching family
///
/// Fails if there is no address record set at all, or if one of them would
/// end up without values. Nothing is returned in that case, so no partial
/// change batch can be built from it.
pub fn merge_record_sets(record_sets: Vec<RecordSet>, addresses: &AddressSet) -> Result<Vec<RecordSet>> {
    if record_sets.is_empty() {
        return Err(Error::NoRecordsToUpdate {
            record_type: "A or AAAA".to_string(),
        });
    }

    let mut merged = Vec::with_capacity(record_sets.len());
    for mut record_set in record_sets {
        let values: Vec<String> = match record_set.record_type {
            RecordType::A => addresses.ipv4().map(ToString::to_string).collect(),
            RecordType::Aaaa => addresses.ipv6().map(ToString::to_string).collect(),
            RecordType::Other(_) => continue,
        };
        if values.is_empty() {
            return Err(Error::NoRecordsToUpdate {
                record_type: record_set.record_type.to_string(),
            });
        }
        record_set.values = values;
        merged.push(record_set);
    }
    Ok(merged)
}

/// Whether `fq_host` lies in the zone `zone_name` (both fully qualified)
pub fn zone_matches(fq_host: &str, zone_name: &str) -> bool {
    let fq_host = fq_host.to_ascii_lowercase();
    let zone = fully_qualified(zone_name).to_ascii_lowercase();
    fq_host == zone || fq_host.ends_with(&format!(".{}", zone))
}

fn fully_qualified(name: &str) -> String {
    format!("{}.", name.trim_end_matches('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    fn record_set(record_type: RecordType, values: &[&str]) -> RecordSet {
        RecordSet {
            name: "www.example.com.".to_string(),
            record_type,
            ttl: Some(300),
            values: values.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn addresses(list: &[&str]) -> AddressSet {
        list.iter().map(|s| s.parse::<IpAddr>().unwrap()).collect()
    }

    #[test]
    fn test_zone_matches_on_label_boundary() {
        assert!(zone_matches("www.example.com.", "example.com."));
        assert!(zone_matches("www.example.com.", "example.com"));
        assert!(zone_matches("example.com.", "example.com."));
        assert!(zone_matches("WWW.Example.COM.", "example.com."));
        assert!(!zone_matches("www.example.com.", "other.com."));
        assert!(!zone_matches("www.myexample.com.", "example.com."));
    }

    #[test]
    fn test_merge_replaces_values_per_family() {
        let merged = merge_record_sets(
            vec![
                record_set(RecordType::A, &["198.51.100.1"]),
                record_set(RecordType::Aaaa, &["2001:db8::dead"]),
            ],
            &addresses(&["203.0.113.7", "203.0.113.8", "2001:db8::7"]),
        )
        .unwrap();

        assert_eq!(merged[0].values, vec!["203.0.113.7", "203.0.113.8"]);
        assert_eq!(merged[1].values, vec!["2001:db8::7"]);
        assert_eq!(merged[0].ttl, Some(300));
    }

    #[test]
    fn test_merge_fails_on_empty_family() {
        let err = merge_record_sets(
            vec![
                record_set(RecordType::A, &["198.51.100.1"]),
                record_set(RecordType::Aaaa, &["2001:db8::dead"]),
            ],
            &addresses(&["203.0.113.7"]),
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "no AAAA records to update");
    }

    #[test]
    fn test_merge_without_record_sets_fails() {
        let err = merge_record_sets(Vec::new(), &addresses(&["203.0.113.7"])).unwrap_err();
        assert!(matches!(err, Error::NoRecordsToUpdate { .. }));
    }

    #[test]
    fn test_fully_qualified() {
        assert_eq!(fully_qualified("www.example.com"), "www.example.com.");
        assert_eq!(fully_qualified("www.example.com."), "www.example.com.");
    }
}

//! Amazon Route 53 backend
//!
//! Uses static credentials from the configuration; no shared AWS profile or
//! environment lookup takes place.

use async_trait::async_trait;
use aws_sdk_route53::Client;
use aws_sdk_route53::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_route53::error::DisplayErrorContext;
use aws_sdk_route53::types::{
    Change, ChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet, RrType,
};
use ddns_core::config::Route53UpdaterConfig;
use ddns_core::{Error, Result};
use tracing::trace;

use crate::backend::{
    ChangeInfo, HostedZone, HostedZoneBackend, RecordCursor, RecordPage, RecordSet, RecordType,
    ZonePage,
};

/// Region used when none is configured (Route 53 itself is global)
pub const DEFAULT_REGION: &str = "us-east-1";

/// Route 53 hosted zone backend
pub struct Route53Backend {
    client: Client,
}

impl Route53Backend {
    /// Create a backend from the updater configuration
    pub fn new(config: &Route53UpdaterConfig) -> Result<Self> {
        if config.key.is_empty() || config.secret.is_empty() {
            return Err(Error::config("dns_route53 requires key and secret"));
        }
        let region = if config.region.is_empty() {
            DEFAULT_REGION.to_string()
        } else {
            config.region.clone()
        };

        let credentials = Credentials::new(
            config.key.clone(),
            config.secret.clone(),
            None,
            None,
            "ddns-updater",
        );
        let sdk_config = aws_sdk_route53::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region))
            .credentials_provider(credentials)
            .build();

        Ok(Self {
            client: Client::from_conf(sdk_config),
        })
    }
}

#[async_trait]
impl HostedZoneBackend for Route53Backend {
    async fn list_hosted_zones(&self, marker: Option<&str>) -> Result<ZonePage> {
        let output = self
            .client
            .list_hosted_zones()
            .set_marker(marker.map(str::to_string))
            .send()
            .await
            .map_err(|e| Error::http(DisplayErrorContext(&e).to_string()))?;

        let zones = output
            .hosted_zones()
            .iter()
            .map(|zone| HostedZone {
                id: zone.id().to_string(),
                name: zone.name().to_string(),
            })
            .collect();
        let next_marker = if output.is_truncated() {
            output.next_marker().map(str::to_string)
        } else {
            None
        };
        trace!("Listed hosted zones (next marker: {:?})", next_marker);

        Ok(ZonePage { zones, next_marker })
    }

    async fn list_record_sets(&self, zone_id: &str, start: &RecordCursor) -> Result<RecordPage> {
        let output = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(zone_id)
            .start_record_name(&start.name)
            .set_start_record_type(
                start
                    .record_type
                    .as_ref()
                    .map(|record_type| RrType::from(record_type.as_str())),
            )
            .set_start_record_identifier(start.identifier.clone())
            .send()
            .await
            .map_err(|e| Error::http(DisplayErrorContext(&e).to_string()))?;

        let record_sets = output
            .resource_record_sets()
            .iter()
            .map(|rrs| RecordSet {
                name: rrs.name().to_string(),
                record_type: RecordType::from(rrs.r#type().as_str()),
                ttl: rrs.ttl(),
                values: rrs
                    .resource_records()
                    .iter()
                    .map(|rr| rr.value().to_string())
                    .collect(),
            })
            .collect();

        let next = match (output.is_truncated(), output.next_record_name()) {
            (true, Some(name)) => Some(RecordCursor {
                name: name.to_string(),
                record_type: output
                    .next_record_type()
                    .map(|record_type| RecordType::from(record_type.as_str())),
                identifier: output.next_record_identifier().map(str::to_string),
            }),
            _ => None,
        };

        Ok(RecordPage { record_sets, next })
    }

    async fn upsert_record_sets(
        &self,
        zone_id: &str,
        record_sets: &[RecordSet],
    ) -> Result<ChangeInfo> {
        let changes = record_sets
            .iter()
            .map(upsert_change)
            .collect::<Result<Vec<Change>>>()?;
        let batch = ChangeBatch::builder()
            .set_changes(Some(changes))
            .build()
            .map_err(|e| Error::http(format!("invalid change batch: {}", e)))?;

        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| Error::http(DisplayErrorContext(&e).to_string()))?;

        let info = output
            .change_info()
            .ok_or_else(|| Error::http("change response without change info"))?;
        Ok(ChangeInfo {
            id: info.id().to_string(),
            status: info.status().as_str().to_string(),
        })
    }
}

fn upsert_change(record_set: &RecordSet) -> Result<Change> {
    let records = record_set
        .values
        .iter()
        .map(|value| ResourceRecord::builder().value(value).build())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::http(format!("invalid resource record: {}", e)))?;

    let rrs = ResourceRecordSet::builder()
        .name(&record_set.name)
        .r#type(RrType::from(record_set.record_type.as_str()))
        .set_ttl(record_set.ttl)
        .set_resource_records(Some(records))
        .build()
        .map_err(|e| Error::http(format!("invalid resource record set: {}", e)))?;

    Change::builder()
        .action(ChangeAction::Upsert)
        .resource_record_set(rrs)
        .build()
        .map_err(|e| Error::http(format!("invalid change: {}", e)))
}

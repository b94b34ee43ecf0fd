//! Test doubles for hosted zone reconciliation tests
//!
//! `ScriptedBackend` serves fixed pages of zones and record sets and records
//! every call, so tests can assert on pagination and submissions.

#![allow(dead_code)]

use ddns_core::{AddressSet, Error, Result};
use ddns_provider_route53::{
    ChangeInfo, HostedZone, HostedZoneBackend, RecordCursor, RecordPage, RecordSet, RecordType,
    ZonePage,
};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ZONE_ID: &str = "/hostedzone/Z0000000EXAMPLE";

pub fn zone(id: &str, name: &str) -> HostedZone {
    HostedZone {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub fn record_set(name: &str, record_type: &str, values: &[&str]) -> RecordSet {
    RecordSet {
        name: name.to_string(),
        record_type: RecordType::from(record_type),
        ttl: Some(300),
        values: values.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn addresses(list: &[&str]) -> AddressSet {
    list.iter().map(|s| s.parse::<IpAddr>().unwrap()).collect()
}

/// Shared view of the calls a ScriptedBackend received
#[derive(Clone, Default)]
pub struct Calls {
    zone_markers: Arc<Mutex<Vec<Option<String>>>>,
    record_cursors: Arc<Mutex<Vec<RecordCursor>>>,
    submissions: Arc<Mutex<Vec<(String, Vec<RecordSet>)>>>,
    upsert_call_count: Arc<AtomicUsize>,
}

impl Calls {
    /// Markers passed to list_hosted_zones()
    pub fn zone_markers(&self) -> Vec<Option<String>> {
        self.zone_markers.lock().unwrap().clone()
    }

    /// Cursors passed to list_record_sets()
    pub fn record_cursors(&self) -> Vec<RecordCursor> {
        self.record_cursors.lock().unwrap().clone()
    }

    /// Change batches passed to upsert_record_sets()
    pub fn submissions(&self) -> Vec<(String, Vec<RecordSet>)> {
        self.submissions.lock().unwrap().clone()
    }

    /// Get the number of times upsert_record_sets() was called
    pub fn upsert_call_count(&self) -> usize {
        self.upsert_call_count.load(Ordering::SeqCst)
    }
}

/// A HostedZoneBackend serving scripted pages
///
/// Zone page `n` is requested with marker `zones-n`; record page `n` with a
/// cursor whose identifier is `records-n`.
pub struct ScriptedBackend {
    zone_pages: Vec<Vec<HostedZone>>,
    record_pages: Vec<Vec<RecordSet>>,
    fail_submission: bool,
    calls: Calls,
}

impl ScriptedBackend {
    pub fn new(zone_pages: Vec<Vec<HostedZone>>, record_pages: Vec<Vec<RecordSet>>) -> Self {
        Self {
            zone_pages,
            record_pages,
            fail_submission: false,
            calls: Calls::default(),
        }
    }

    /// A backend rejecting every change batch
    pub fn failing_submission(mut self) -> Self {
        self.fail_submission = true;
        self
    }

    pub fn calls(&self) -> Calls {
        self.calls.clone()
    }
}

fn page_index(token: Option<&str>, prefix: &str) -> usize {
    token
        .and_then(|token| token.strip_prefix(prefix))
        .and_then(|index| index.parse().ok())
        .unwrap_or(0)
}

#[async_trait::async_trait]
impl HostedZoneBackend for ScriptedBackend {
    async fn list_hosted_zones(&self, marker: Option<&str>) -> Result<ZonePage> {
        self.calls
            .zone_markers
            .lock()
            .unwrap()
            .push(marker.map(str::to_string));

        let index = page_index(marker, "zones-");
        let zones = self.zone_pages.get(index).cloned().unwrap_or_default();
        let next_marker = (index + 1 < self.zone_pages.len()).then(|| format!("zones-{}", index + 1));
        Ok(ZonePage { zones, next_marker })
    }

    async fn list_record_sets(&self, _zone_id: &str, start: &RecordCursor) -> Result<RecordPage> {
        self.calls.record_cursors.lock().unwrap().push(start.clone());

        let index = page_index(start.identifier.as_deref(), "records-");
        let record_sets = self.record_pages.get(index).cloned().unwrap_or_default();
        let next = (index + 1 < self.record_pages.len()).then(|| {
            let first = &self.record_pages[index + 1][0];
            RecordCursor {
                name: first.name.clone(),
                record_type: Some(first.record_type.clone()),
                identifier: Some(format!("records-{}", index + 1)),
            }
        });
        Ok(RecordPage { record_sets, next })
    }

    async fn upsert_record_sets(
        &self,
        zone_id: &str,
        record_sets: &[RecordSet],
    ) -> Result<ChangeInfo> {
        self.calls.upsert_call_count.fetch_add(1, Ordering::SeqCst);
        self.calls
            .submissions
            .lock()
            .unwrap()
            .push((zone_id.to_string(), record_sets.to_vec()));

        if self.fail_submission {
            return Err(Error::http("InvalidChangeBatch"));
        }
        Ok(ChangeInfo {
            id: "/change/C0000000EXAMPLE".to_string(),
            status: "PENDING".to_string(),
        })
    }
}

// # Hosted Zone Backend
//
// Defines the three paginated operations the reconciler needs from a
// hosted-zone DNS service, with backend-neutral data types.
//
// ## Implementations
//
// - Amazon Route 53: `aws` module
// - In-memory pages: tests

use async_trait::async_trait;
use ddns_core::Result;
use std::fmt;

/// A hosted zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZone {
    /// Backend zone id
    pub id: String,
    /// Fully qualified zone name (with trailing dot)
    pub name: String,
}

/// One page of hosted zones
#[derive(Debug, Clone, Default)]
pub struct ZonePage {
    pub zones: Vec<HostedZone>,
    /// Marker of the next page; `None` on the last page
    pub next_marker: Option<String>,
}

/// Resource record type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordType {
    A,
    Aaaa,
    /// Any type the reconciler does not touch
    Other(String),
}

impl RecordType {
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Other(other) => other,
        }
    }

    /// Whether this is an address record type
    pub fn is_address(&self) -> bool {
        matches!(self, RecordType::A | RecordType::Aaaa)
    }
}

impl From<&str> for RecordType {
    fn from(value: &str) -> Self {
        match value {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            other => RecordType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource record set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    /// Fully qualified record name (with trailing dot)
    pub name: String,
    pub record_type: RecordType,
    /// Time to live in seconds (absent for alias records)
    pub ttl: Option<i64>,
    /// Record values
    pub values: Vec<String>,
}

/// Position to start a record set listing at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordCursor {
    pub name: String,
    pub record_type: Option<RecordType>,
    pub identifier: Option<String>,
}

impl RecordCursor {
    /// Start at the first record set of a name
    pub fn at(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record_type: None,
            identifier: None,
        }
    }
}

/// One page of resource record sets, sorted by name
#[derive(Debug, Clone, Default)]
pub struct RecordPage {
    pub record_sets: Vec<RecordSet>,
    /// Cursor of the next page; `None` on the last page
    pub next: Option<RecordCursor>,
}

/// Backend-assigned change tracking information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeInfo {
    pub id: String,
    pub status: String,
}

/// Trait for hosted-zone DNS services
///
/// # Contract
///
/// - Listings are paginated; the caller follows the returned marker/cursor
/// - Record sets are returned in name order starting at the given cursor
/// - `upsert_record_sets` applies all record sets as one atomic change batch
#[async_trait]
pub trait HostedZoneBackend: Send + Sync {
    /// List one page of hosted zones
    async fn list_hosted_zones(&self, marker: Option<&str>) -> Result<ZonePage>;

    /// List one page of record sets of a zone, starting at `start`
    async fn list_record_sets(&self, zone_id: &str, start: &RecordCursor) -> Result<RecordPage>;

    /// Upsert record sets in one change batch
    async fn upsert_record_sets(&self, zone_id: &str, record_sets: &[RecordSet])
    -> Result<ChangeInfo>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_round_trip() {
        assert_eq!(RecordType::from("A"), RecordType::A);
        assert_eq!(RecordType::from("AAAA").as_str(), "AAAA");
        assert_eq!(RecordType::from("TXT"), RecordType::Other("TXT".to_string()));
        assert!(!RecordType::from("CNAME").is_address());
        assert!(RecordType::Aaaa.is_address());
    }
}

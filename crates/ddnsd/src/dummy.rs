// # Dummy DNS Updater
//
// Logs the update it would apply for every address and applies nothing.
// Useful to check the finders and the change detection of a setup.

use async_trait::async_trait;
use ddns_core::traits::DnsUpdater;
use ddns_core::{AddressSet, Result};
use tracing::{info, warn};

/// Name of this updater in logs and configuration
pub const UPDATER_NAME: &str = "dns_dummy";

/// Log-only DNS updater
pub struct DummyUpdater {
    host: String,
}

impl DummyUpdater {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    /// The update lines this updater logs
    pub fn update_lines(&self, addresses: &AddressSet) -> Vec<String> {
        addresses
            .iter()
            .map(|ip| {
                let record_type = if ip.is_ipv4() { "A" } else { "AAAA" };
                format!("DDNS update '{}' {} {}", self.host, record_type, ip)
            })
            .collect()
    }
}

#[async_trait]
impl DnsUpdater for DummyUpdater {
    fn name(&self) -> &str {
        UPDATER_NAME
    }

    async fn merge(&self, addresses: &AddressSet, _force: bool, dry_run: bool) -> Result<()> {
        info!(updater = UPDATER_NAME, "Updating host '{}'...", self.host);
        for line in self.update_lines(addresses) {
            info!(updater = UPDATER_NAME, "{}", line);
        }
        if dry_run {
            warn!(updater = UPDATER_NAME, "DDNS update skipped due to dry run");
        } else {
            info!(updater = UPDATER_NAME, "DDNS update applied");
        }
        Ok(())
    }
}

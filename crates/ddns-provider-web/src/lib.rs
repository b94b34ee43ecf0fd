// # Web DNS Updater
//
// This crate provides a DNS updater calling a dyndns style update URL.
//
// ## URL Placeholders
//
// - `{hostname}`: The configured host
// - `{myipv4}`: The first IPv4 address of the run
// - `{myipv6}`: The first IPv6 address of the run
//
// A placeholder without an address of its family fails the merge; the URL
// is never called with a placeholder left in it.
//
// ## Request
//
// One GET, with the user agent, optional basic auth, optional timeout and
// optional TLS verification skip. Any status other than 200 is an error.

use async_trait::async_trait;
use ddns_core::config::WebUpdaterConfig;
use ddns_core::http::{HttpClientConfig, build_client};
use ddns_core::traits::DnsUpdater;
use ddns_core::{AddressSet, Error, Result};
use reqwest::StatusCode;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Name of this updater in logs and configuration
pub const UPDATER_NAME: &str = "dns_web";

/// Web (dyndns style) DNS updater
pub struct WebUpdater {
    host: String,
    url: String,
    username: String,
    password: String,
    client: reqwest::Client,
}

impl WebUpdater {
    /// Create a new web updater
    pub fn new(config: &WebUpdaterConfig) -> Result<Self> {
        let client = build_client(HttpClientConfig {
            timeout: config.timeout_secs.map(Duration::from_secs),
            tls_skip_verify: config.tls_skip_verify,
        })?;

        Ok(Self {
            host: config.updater.host.clone(),
            url: config.url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            client,
        })
    }

    async fn invoke(&self, url: &str) -> Result<()> {
        let mut request = self.client.get(url);
        if !self.username.is_empty() {
            request = request.basic_auth(&self.username, Some(&self.password));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("failed to execute update request: {}", e)))?;
        if response.status() != StatusCode::OK {
            return Err(Error::http(format!(
                "update request failed (status: {})",
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DnsUpdater for WebUpdater {
    fn name(&self) -> &str {
        UPDATER_NAME
    }

    async fn merge(&self, addresses: &AddressSet, _force: bool, dry_run: bool) -> Result<()> {
        info!(updater = UPDATER_NAME, "Updating host '{}'...", self.host);

        let update = build_update(&self.url, &self.host, addresses)?;
        debug!(updater = UPDATER_NAME, "Using update URL '{}'", update.url);

        if dry_run {
            warn!(updater = UPDATER_NAME, "DDNS update skipped due to dry run");
        } else {
            self.invoke(&update.url).await?;
        }
        for (record_type, ip) in &update.applied {
            info!(
                updater = UPDATER_NAME,
                "DDNS update '{}' {} {}", self.host, record_type, ip
            );
        }
        Ok(())
    }
}

/// An update URL with the addresses substituted into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub url: String,
    /// Record type and address of every substituted address placeholder
    pub applied: Vec<(&'static str, IpAddr)>,
}

/// Substitute the host and address placeholders of an update URL
pub fn build_update(template: &str, host: &str, addresses: &AddressSet) -> Result<Update> {
    let mut url = template.replace("{hostname}", host);
    let mut applied = Vec::new();

    let placeholders = [
        ("{myipv4}", "A", addresses.ipv4().next()),
        ("{myipv6}", "AAAA", addresses.ipv6().next()),
    ];
    for (placeholder, record_type, ip) in placeholders {
        if !url.contains(placeholder) {
            continue;
        }
        let ip = ip.ok_or_else(|| {
            Error::http(format!(
                "failed to substitute parameter {} due to missing IP address",
                placeholder
            ))
        })?;
        url = url.replace(placeholder, &ip.to_string());
        applied.push((record_type, *ip));
    }

    Ok(Update { url, applied })
}

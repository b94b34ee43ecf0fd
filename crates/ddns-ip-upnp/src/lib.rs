// # UPnP Address Finder
//
// This crate provides an address finder asking the local Internet Gateway
// Device (the home router) for its external address.
//
// ## Location Cache
//
// Discovery waits for multicast answers and is the slow part of the probe.
// The location of the last gateway that answered is kept in the change
// cache (context `address_upnp`, name `igd_location`). A cached location is
// tried first; if it fails for any reason the finder falls back to a full
// discovery.

mod gateway;
mod ssdp;

pub use gateway::{Gateway, GatewayDiscovery};
pub use ssdp::SsdpDiscovery;

use ddns_core::config::UpnpFinderConfig;
use ddns_core::traits::{AddressFinder, ChangeCache};
use ddns_core::{Error, FinderConfig, Result, SharedCache, normalize_ip};

use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, info};

/// Name of this finder in logs, configuration and the cache
pub const FINDER_NAME: &str = "address_upnp";

/// Cache entry holding the last working gateway location
pub const CACHE_LOCATION: &str = "igd_location";

/// UPnP gateway address finder
pub struct UpnpFinder {
    config: FinderConfig,
    cache: SharedCache,
    discovery: Box<dyn GatewayDiscovery>,
}

impl UpnpFinder {
    /// Create a UPnP finder using SSDP discovery
    pub fn new(config: &UpnpFinderConfig, cache: SharedCache) -> Result<Self> {
        let discovery = SsdpDiscovery::new(Duration::from_secs(config.discovery_timeout_secs))?;
        Ok(Self::with_discovery(
            config.finder.clone(),
            cache,
            Box::new(discovery),
        ))
    }

    /// Create a UPnP finder with a custom discovery
    pub fn with_discovery(
        config: FinderConfig,
        cache: SharedCache,
        discovery: Box<dyn GatewayDiscovery>,
    ) -> Self {
        Self {
            config,
            cache,
            discovery,
        }
    }

    /// Query the gateway at the cached location, if any
    async fn query_cached(&self) -> Option<(String, String)> {
        let location = self
            .cache
            .get(FINDER_NAME, CACHE_LOCATION)
            .await?
            .into_iter()
            .next()?;

        debug!(finder = FINDER_NAME, "Trying cached IGD location '{}'...", location);
        let answer = match self.discovery.connect(&location).await {
            Ok(gateway) => gateway.external_ip().await,
            Err(e) => Err(e),
        };
        match answer {
            Ok(ip) => Some((location, ip)),
            Err(e) => {
                debug!(
                    finder = FINDER_NAME,
                    "Cached IGD location '{}' failed: {}", location, e
                );
                None
            }
        }
    }

    async fn query_discovered(&self) -> Result<(String, String)> {
        info!(finder = FINDER_NAME, "Discovering UPnP devices...");
        let gateway = self
            .discovery
            .discover()
            .await
            .map_err(|e| Error::finder(format!("no UPnP device found: {}", e)))?;
        let location = gateway.location().to_string();

        debug!(
            finder = FINDER_NAME,
            "Querying external IP from IGD at location '{}'...", location
        );
        let ip = gateway.external_ip().await.map_err(|e| {
            Error::finder(format!(
                "failed to query external IP from IGD '{}': {}",
                location, e
            ))
        })?;
        Ok((location, ip))
    }
}

#[async_trait::async_trait]
impl AddressFinder for UpnpFinder {
    fn name(&self) -> &str {
        FINDER_NAME
    }

    async fn run(&self) -> Result<Vec<IpAddr>> {
        let (location, answer) = match self.query_cached().await {
            Some(found) => found,
            None => self.query_discovered().await?,
        };
        debug!(finder = FINDER_NAME, "IGD returned external IP '{}'", answer);

        let ip: IpAddr = answer.parse().map_err(|_| {
            Error::finder(format!(
                "invalid IP address '{}' returned from IGD '{}'",
                answer, location
            ))
        })?;
        self.cache
            .put(FINDER_NAME, CACHE_LOCATION, vec![location])
            .await;

        let ip = normalize_ip(ip);
        if self.config.is_match(&ip) {
            info!(finder = FINDER_NAME, "Found address {}", ip);
            Ok(vec![ip])
        } else {
            debug!(finder = FINDER_NAME, "Ignoring non-matching address {}", ip);
            Ok(Vec::new())
        }
    }
}

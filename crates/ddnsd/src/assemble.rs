//! Component assembly
//!
//! Builds the ordered finder and updater lists from the configuration.
//! Finders run in the order interface, UPnP, web; updaters in the order
//! dummy, Route 53, web.

use anyhow::{Context, Result};
use ddns_core::traits::{AddressFinder, DnsUpdater};
use ddns_core::{DdnsConfig, SharedCache};
use tracing::{debug, warn};

use crate::dummy::DummyUpdater;

/// Build the enabled address finders
pub fn finders(config: &DdnsConfig, cache: &SharedCache) -> Result<Vec<Box<dyn AddressFinder>>> {
    let mut finders: Vec<Box<dyn AddressFinder>> = Vec::new();

    if config.address_interface.finder.is_enabled() {
        #[cfg(feature = "iface")]
        finders.push(Box::new(ddns_ip_iface::InterfaceFinder::new(
            &config.address_interface,
        )));
        #[cfg(not(feature = "iface"))]
        warn!("Ignoring address_interface: support not compiled in");
    }

    if config.address_upnp.finder.is_enabled() {
        #[cfg(feature = "upnp")]
        finders.push(Box::new(
            ddns_ip_upnp::UpnpFinder::new(&config.address_upnp, cache.clone())
                .context("failed to set up address_upnp")?,
        ));
        #[cfg(not(feature = "upnp"))]
        warn!("Ignoring address_upnp: support not compiled in");
    }
    #[cfg(not(feature = "upnp"))]
    let _ = cache;

    if config.address_web.finder.is_enabled() {
        #[cfg(feature = "http")]
        finders.push(Box::new(
            ddns_ip_http::WebFinder::new(&config.address_web)
                .context("failed to set up address_web")?,
        ));
        #[cfg(not(feature = "http"))]
        warn!("Ignoring address_web: support not compiled in");
    }

    for finder in &finders {
        debug!("Using address finder '{}'", finder.name());
    }
    Ok(finders)
}

/// Build the enabled DNS updaters
pub fn updaters(config: &DdnsConfig) -> Result<Vec<Box<dyn DnsUpdater>>> {
    let mut updaters: Vec<Box<dyn DnsUpdater>> = Vec::new();

    if config.dns_dummy.is_enabled(crate::dummy::UPDATER_NAME) {
        updaters.push(Box::new(DummyUpdater::new(config.dns_dummy.host.clone())));
    }

    if config.dns_route53.updater.is_enabled("dns_route53") {
        #[cfg(feature = "route53")]
        updaters.push(Box::new(
            ddns_provider_route53::route53_updater(&config.dns_route53)
                .context("failed to set up dns_route53")?,
        ));
        #[cfg(not(feature = "route53"))]
        warn!("Ignoring dns_route53: support not compiled in");
    }

    if config.dns_web.updater.is_enabled("dns_web") {
        #[cfg(feature = "web")]
        updaters.push(Box::new(
            ddns_provider_web::WebUpdater::new(&config.dns_web)
                .context("failed to set up dns_web")?,
        ));
        #[cfg(not(feature = "web"))]
        warn!("Ignoring dns_web: support not compiled in");
    }

    for updater in &updaters {
        debug!("Using DNS updater '{}'", updater.name());
    }
    Ok(updaters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddns_core::MemoryCache;
    use std::sync::Arc;
    use std::time::Duration;

    fn cache() -> SharedCache {
        Arc::new(MemoryCache::new(Duration::from_secs(60)))
    }

    #[test]
    fn test_empty_config_assembles_nothing() {
        let config = DdnsConfig::default();

        assert!(finders(&config, &cache()).unwrap().is_empty());
        assert!(updaters(&config).unwrap().is_empty());
    }

    #[test]
    fn test_updater_without_host_is_skipped() {
        let config = DdnsConfig::from_toml_str("[dns_dummy]\nenabled = true\n").unwrap();
        assert!(updaters(&config).unwrap().is_empty());
    }

    #[cfg(all(feature = "iface", feature = "http", feature = "web"))]
    #[test]
    fn test_components_keep_their_order() {
        let config = DdnsConfig::from_toml_str(
            r#"
            [address_web]
            ipv4 = true
            ipv4_specs = [["https://ip4only.me/api/", "IPv4,([^,]*),.*"]]

            [address_interface]
            ipv6 = true

            [dns_web]
            enabled = true
            host = "home.example.org"
            url = "https://dyn.example.net/update?h={hostname}&ip={myipv6}"

            [dns_dummy]
            enabled = true
            host = "home.example.org"
            "#,
        )
        .unwrap();

        let finder_names: Vec<String> = finders(&config, &cache())
            .unwrap()
            .iter()
            .map(|f| f.name().to_string())
            .collect();
        assert_eq!(finder_names, vec!["address_interface", "address_web"]);

        let updater_names: Vec<String> = updaters(&config)
            .unwrap()
            .iter()
            .map(|u| u.name().to_string())
            .collect();
        assert_eq!(updater_names, vec!["dns_dummy", "dns_web"]);
    }

    #[cfg(feature = "route53")]
    #[test]
    fn test_route53_without_credentials_fails() {
        let config = DdnsConfig::from_toml_str(
            "[dns_route53]\nenabled = true\nhost = \"www.example.com\"\n",
        )
        .unwrap();

        let err = match updaters(&config) {
            Ok(_) => panic!("Expected a setup error"),
            Err(e) => e,
        };
        assert!(format!("{:#}", err).contains("key and secret"));
    }
}

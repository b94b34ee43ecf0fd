//! Configuration types for ddns-updater
//!
//! The configuration is a single TOML file. Every section is optional; a
//! missing finder section leaves the finder disabled, a missing updater
//! section leaves the updater disabled.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::address::{is_global_unicast, is_private};
use crate::error::{Error, Result};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_FILE: &str = "/etc/ddns-updater/ddns-updater.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DdnsConfig {
    /// Global settings
    pub global: GlobalConfig,

    /// Network interface scan finder
    pub address_interface: InterfaceFinderConfig,

    /// UPnP gateway finder
    pub address_upnp: UpnpFinderConfig,

    /// Web service finder
    pub address_web: WebFinderConfig,

    /// Dummy updater (logs only)
    pub dns_dummy: UpdaterConfig,

    /// Route 53 hosted zone updater
    pub dns_route53: Route53UpdaterConfig,

    /// Web (dyndns style) updater
    pub dns_web: WebUpdaterConfig,
}

impl DdnsConfig {
    /// Read and decode a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| {
            Error::config(format!(
                "failed to decode config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Decode a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: DdnsConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.global.cache_duration_secs == 0 {
            return Err(Error::config("global.cache_duration_secs must be > 0"));
        }
        if self.address_web.finder.is_enabled()
            && self.address_web.ipv4_specs.is_empty()
            && self.address_web.ipv6_specs.is_empty()
        {
            return Err(Error::config(
                "address_web is enabled but neither ipv4_specs nor ipv6_specs are set",
            ));
        }
        if self.dns_web.updater.enabled && self.dns_web.url.is_empty() {
            return Err(Error::config("dns_web is enabled but url is empty"));
        }
        Ok(())
    }
}

/// Global settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Log at INFO level
    pub verbose: bool,

    /// Log at DEBUG level
    pub debug: bool,

    /// Cache mode
    pub cache: CacheMode,

    /// Validity of every cache entry (in seconds)
    pub cache_duration_secs: u64,

    /// Cache file location (defaults to the per-user cache directory)
    pub cache_file: Option<PathBuf>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            debug: false,
            cache: CacheMode::default(),
            cache_duration_secs: default_cache_duration_secs(),
            cache_file: None,
        }
    }
}

impl GlobalConfig {
    /// Validity applied to cache writes
    pub fn cache_validity(&self) -> Duration {
        Duration::from_secs(self.cache_duration_secs)
    }

    /// Resolve the cache file location
    pub fn cache_path(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.cache_file {
            return Ok(path.clone());
        }
        let base = dirs::cache_dir()
            .ok_or_else(|| Error::cache("unable to determine the user cache directory"))?;
        Ok(base.join("ddns-updater").join("cache.toml"))
    }
}

fn default_cache_duration_secs() -> u64 {
    24 * 60 * 60
}

/// How the change cache is backed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Load from and flush to the cache file
    #[default]
    Enabled,
    /// Keep the cache in memory only
    Disabled,
    /// Ignore the persisted cache, then flush as usual
    Reset,
}

/// Settings shared by all address finders
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Consider IPv4 addresses
    pub ipv4: bool,

    /// Consider IPv6 addresses
    pub ipv6: bool,

    /// Accept addresses from private ranges
    pub private: bool,
}

impl FinderConfig {
    /// A finder is enabled if at least one address family is
    pub fn is_enabled(&self) -> bool {
        self.ipv4 || self.ipv6
    }

    /// Whether a discovered address is acceptable
    ///
    /// The address must be global-unicast shaped, of an enabled family and
    /// either public or allowed by `private`. Callers normalize IPv4-mapped
    /// addresses before matching.
    pub fn is_match(&self, ip: &IpAddr) -> bool {
        if !is_global_unicast(ip) {
            return false;
        }
        if !self.private && is_private(ip) {
            return false;
        }
        match ip {
            IpAddr::V4(_) => self.ipv4,
            IpAddr::V6(_) => self.ipv6,
        }
    }
}

/// Network interface scan finder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceFinderConfig {
    #[serde(flatten)]
    pub finder: FinderConfig,

    /// Interface name pattern (`*` and `?` wildcards)
    pub interface: String,
}

impl Default for InterfaceFinderConfig {
    fn default() -> Self {
        Self {
            finder: FinderConfig::default(),
            interface: "*".to_string(),
        }
    }
}

/// UPnP gateway finder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpnpFinderConfig {
    #[serde(flatten)]
    pub finder: FinderConfig,

    /// How long to wait for SSDP answers (in seconds)
    pub discovery_timeout_secs: u64,
}

impl Default for UpnpFinderConfig {
    fn default() -> Self {
        Self {
            finder: FinderConfig::default(),
            discovery_timeout_secs: 3,
        }
    }
}

/// Web service finder settings
///
/// Each spec is a `[url, regex]` pair. The first capture group of the regex
/// (or the whole match) is parsed as the address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebFinderConfig {
    #[serde(flatten)]
    pub finder: FinderConfig,

    pub ipv4_specs: Vec<[String; 2]>,

    pub ipv6_specs: Vec<[String; 2]>,
}

/// Settings shared by all DNS updaters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// Whether the updater is enabled
    pub enabled: bool,

    /// Host name to update
    pub host: String,
}

impl UpdaterConfig {
    /// An updater runs only if it is enabled and has a host
    ///
    /// An enabled updater without host is skipped with a warning.
    pub fn is_enabled(&self, updater_name: &str) -> bool {
        if self.enabled && self.host.is_empty() {
            warn!(
                "Ignoring DNS updater '{}' due to missing host name",
                updater_name
            );
        }
        self.enabled && !self.host.is_empty()
    }
}

/// Route 53 updater settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Route53UpdaterConfig {
    #[serde(flatten)]
    pub updater: UpdaterConfig,

    /// Access key id
    pub key: String,

    /// Secret access key
    pub secret: String,

    /// Region (empty selects the global Route 53 endpoint region)
    pub region: String,
}

/// Web updater settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebUpdaterConfig {
    #[serde(flatten)]
    pub updater: UpdaterConfig,

    /// Update URL with `{hostname}`, `{myipv4}` and `{myipv6}` placeholders
    pub url: String,

    pub username: String,

    pub password: String,

    /// Accept invalid TLS certificates
    pub tls_skip_verify: bool,

    /// Request timeout in seconds (none by default)
    pub timeout_secs: Option<u64>,
}

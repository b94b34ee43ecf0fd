// # Web Address Finder
//
// This crate provides an address finder querying external "what is my IP"
// web services.
//
// ## Purpose
//
// Behind NAT the interface addresses are private; the public address is
// only visible from outside. Each configured spec names a service URL and
// a regular expression extracting the address from the response body.
//
// ## Behavior
//
// - Specs are tried in order, per enabled address family
// - A failing spec (bad URL, bad regex, request error, no match) is logged
//   and skipped; the finder itself never fails because of one
// - The first spec yielding a matching address wins for its family
// - The first capture group of the regex is used if there is one, else the
//   whole match

use ddns_core::config::WebFinderConfig;
use ddns_core::http::{HttpClientConfig, build_client};
use ddns_core::traits::AddressFinder;
use ddns_core::{Error, FinderConfig, Result, normalize_ip};

use regex::Regex;
use std::net::IpAddr;
use tracing::{debug, info};

/// Name of this finder in logs and configuration
pub const FINDER_NAME: &str = "address_web";

/// Address family a spec is queried for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    V4,
    V6,
}

/// Web service address finder
pub struct WebFinder {
    config: FinderConfig,
    ipv4_specs: Vec<[String; 2]>,
    ipv6_specs: Vec<[String; 2]>,
    client: reqwest::Client,
}

impl WebFinder {
    /// Create a new web finder
    pub fn new(config: &WebFinderConfig) -> Result<Self> {
        Ok(Self {
            config: config.finder.clone(),
            ipv4_specs: config.ipv4_specs.clone(),
            ipv6_specs: config.ipv6_specs.clone(),
            client: build_client(HttpClientConfig::default())?,
        })
    }

    /// Try the specs of one family until one yields a matching address
    async fn find(&self, specs: &[[String; 2]], family: Family) -> Option<IpAddr> {
        for spec in specs {
            match self.run_spec(spec, family).await {
                Ok(ip) if self.config.is_match(&ip) => {
                    info!(finder = FINDER_NAME, "Found address {}", ip);
                    return Some(ip);
                }
                Ok(ip) => {
                    debug!(finder = FINDER_NAME, "Ignoring non-matching address {}", ip);
                }
                Err(e) => {
                    debug!(finder = FINDER_NAME, "Skipping address service: {}", e);
                }
            }
        }
        None
    }

    async fn run_spec(&self, spec: &[String; 2], family: Family) -> Result<IpAddr> {
        let [url, pattern] = spec;
        let pattern = Regex::new(pattern)
            .map_err(|e| Error::finder(format!("invalid regexp '{}': {}", pattern, e)))?;

        info!(finder = FINDER_NAME, "Querying address service '{}'...", url);
        let body = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| Error::finder(format!("failed to query url '{}': {}", url, e)))?
            .text()
            .await
            .map_err(|e| Error::finder(format!("failed to read url '{}': {}", url, e)))?;

        let ip = extract_address(&body, &pattern)
            .ok_or_else(|| Error::finder(format!("no address found in response of '{}'", url)))?;
        to_family(ip, family)
            .ok_or_else(|| Error::finder(format!("address {} has the wrong family", ip)))
    }
}

#[async_trait::async_trait]
impl AddressFinder for WebFinder {
    fn name(&self) -> &str {
        FINDER_NAME
    }

    async fn run(&self) -> Result<Vec<IpAddr>> {
        let mut found = Vec::new();
        if self.config.ipv4
            && let Some(ip) = self.find(&self.ipv4_specs, Family::V4).await
        {
            found.push(ip);
        }
        if self.config.ipv6
            && let Some(ip) = self.find(&self.ipv6_specs, Family::V6).await
        {
            found.push(ip);
        }
        Ok(found)
    }
}

/// Extract an address from a response body
///
/// Uses the first capture group if the pattern has one, else the whole match.
pub fn extract_address(body: &str, pattern: &Regex) -> Option<IpAddr> {
    let captures = pattern.captures(body)?;
    let text = captures.get(1).or_else(|| captures.get(0))?.as_str();
    text.trim().parse().ok()
}

fn to_family(ip: IpAddr, family: Family) -> Option<IpAddr> {
    match (normalize_ip(ip), family) {
        (v4 @ IpAddr::V4(_), Family::V4) => Some(v4),
        (v6 @ IpAddr::V6(_), Family::V6) => Some(v6),
        _ => None,
    }
}

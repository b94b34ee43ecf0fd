// # Interface Address Finder
//
// This crate provides an address finder reading the addresses assigned to
// the local network interfaces.
//
// ## Purpose
//
// On hosts holding their public address directly (or a global IPv6 prefix)
// no external service is needed: the address is on an interface.
//
// ## Matching
//
// Interfaces are selected by a shell-style pattern (`*` matches any run of
// characters, `?` exactly one). Every address of every selected interface
// passing the finder's match predicate is returned.

mod sys;

pub use sys::InterfaceAddress;

use ddns_core::config::InterfaceFinderConfig;
use ddns_core::traits::AddressFinder;
use ddns_core::{Error, FinderConfig, Result, normalize_ip};

use std::net::IpAddr;
use tracing::{debug, info};

/// Name of this finder in logs and configuration
pub const FINDER_NAME: &str = "address_interface";

/// Network interface address finder
pub struct InterfaceFinder {
    config: FinderConfig,
    pattern: String,
}

impl InterfaceFinder {
    /// Create a new interface finder
    pub fn new(config: &InterfaceFinderConfig) -> Self {
        Self {
            config: config.finder.clone(),
            pattern: config.interface.clone(),
        }
    }

    /// Keep the addresses of matching interfaces that pass the predicate
    fn select(&self, addresses: Vec<InterfaceAddress>) -> Vec<IpAddr> {
        let mut found = Vec::new();
        for address in addresses {
            if !pattern_matches(&self.pattern, &address.interface) {
                continue;
            }
            debug!(
                finder = FINDER_NAME,
                "Considering address {}:{}...", address.interface, address.ip
            );
            let ip = normalize_ip(address.ip);
            if self.config.is_match(&ip) {
                info!(finder = FINDER_NAME, "Found address {}", ip);
                found.push(ip);
            }
        }
        found
    }
}

#[async_trait::async_trait]
impl AddressFinder for InterfaceFinder {
    fn name(&self) -> &str {
        FINDER_NAME
    }

    async fn run(&self) -> Result<Vec<IpAddr>> {
        info!(finder = FINDER_NAME, "Checking interfaces '{}'...", self.pattern);
        let addresses = sys::interface_addresses()
            .map_err(|e| Error::finder(format!("failed to retrieve interfaces: {}", e)))?;
        Ok(self.select(addresses))
    }
}

/// Match an interface name against a shell-style pattern
///
/// `*` matches any (possibly empty) run of characters, `?` matches exactly
/// one character, everything else matches itself.
pub fn pattern_matches(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();

    let (mut p, mut n) = (0, 0);
    // Position of the last `*` and the name position it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, n));
                p += 1;
            }
            Some('?') => {
                p += 1;
                n += 1;
            }
            Some(c) if *c == name[n] => {
                p += 1;
                n += 1;
            }
            _ => match backtrack {
                Some((star, tried)) => {
                    p = star + 1;
                    n = tried + 1;
                    backtrack = Some((star, tried + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}

//! Address normalization
//!
//! Discovered addresses from all finders are merged into an [`AddressSet`]:
//! a deduplicated sequence ordered by the byte-lexicographic order of the
//! address octets. Two runs discovering the same addresses therefore always
//! produce the same sequence, which is what the change cache compares.

use std::cmp::Ordering;
use std::fmt;
use std::net::IpAddr;

/// Deduplicated, byte-ordered set of IP addresses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressSet {
    addresses: Vec<IpAddr>,
}

impl AddressSet {
    /// Create an empty address set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an address at its sorted position
    ///
    /// The address is placed before the first entry comparing greater, or
    /// appended if there is none. Inserting an address that is already
    /// present leaves the set unchanged.
    pub fn insert(&mut self, ip: IpAddr) {
        let mut insert_at = 0;
        for current in &self.addresses {
            match compare_octets(&ip, current) {
                Ordering::Equal => return,
                Ordering::Less => break,
                Ordering::Greater => insert_at += 1,
            }
        }
        self.addresses.insert(insert_at, ip);
    }

    /// Number of addresses in the set
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Iterate the addresses in canonical order
    pub fn iter(&self) -> std::slice::Iter<'_, IpAddr> {
        self.addresses.iter()
    }

    /// All 4-byte addresses, in canonical order
    pub fn ipv4(&self) -> impl Iterator<Item = &IpAddr> {
        self.addresses.iter().filter(|ip| ip.is_ipv4())
    }

    /// All 16-byte addresses, in canonical order
    pub fn ipv6(&self) -> impl Iterator<Item = &IpAddr> {
        self.addresses.iter().filter(|ip| ip.is_ipv6())
    }

    /// Textual form used for the change cache
    pub fn to_strings(&self) -> Vec<String> {
        self.addresses.iter().map(ToString::to_string).collect()
    }

    /// Compare against a cached textual form (length and content)
    pub fn matches_strings(&self, cached: &[String]) -> bool {
        self.addresses.len() == cached.len()
            && self
                .addresses
                .iter()
                .zip(cached)
                .all(|(ip, value)| ip.to_string() == *value)
    }
}

impl FromIterator<IpAddr> for AddressSet {
    fn from_iter<I: IntoIterator<Item = IpAddr>>(iter: I) -> Self {
        let mut set = AddressSet::new();
        for ip in iter {
            set.insert(ip);
        }
        set
    }
}

impl Extend<IpAddr> for AddressSet {
    fn extend<I: IntoIterator<Item = IpAddr>>(&mut self, iter: I) {
        for ip in iter {
            self.insert(ip);
        }
    }
}

impl<'a> IntoIterator for &'a AddressSet {
    type Item = &'a IpAddr;
    type IntoIter = std::slice::Iter<'a, IpAddr>;

    fn into_iter(self) -> Self::IntoIter {
        self.addresses.iter()
    }
}

impl fmt::Display for AddressSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.to_strings().join(", "))
    }
}

/// Collapse an IPv4-mapped IPv6 address back to its 4-byte form
pub fn normalize_ip(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => ip,
        },
        IpAddr::V4(_) => ip,
    }
}

/// Whether the address is shaped like a global unicast address
///
/// Rejects unspecified, loopback, multicast, link-local and the IPv4
/// limited broadcast address. Private ranges are *not* rejected here.
pub fn is_global_unicast(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !v4.is_unspecified()
                && !v4.is_loopback()
                && !v4.is_multicast()
                && !v4.is_link_local()
                && !v4.is_broadcast()
        }
        IpAddr::V6(v6) => {
            !v6.is_unspecified()
                && !v6.is_loopback()
                && !v6.is_multicast()
                && (v6.segments()[0] & 0xffc0) != 0xfe80
        }
    }
}

/// Whether the address lies in a private range (RFC 1918 / RFC 4193)
pub fn is_private(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private(),
        IpAddr::V6(v6) => (v6.segments()[0] & 0xfe00) == 0xfc00,
    }
}

fn octets(ip: &IpAddr) -> Vec<u8> {
    match ip {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    }
}

fn compare_octets(a: &IpAddr, b: &IpAddr) -> Ordering {
    octets(a).cmp(&octets(b))
}

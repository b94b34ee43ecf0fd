// # Interface Enumeration
//
// Platform layer listing the addresses assigned to local interfaces.
//
// ## Platform Support
//
// Enumeration is delegated to `if-addrs`, which covers unix (`getifaddrs`)
// and Windows (`GetAdaptersAddresses`). An enumeration failure is reported
// so the finder fails instead of silently returning nothing.

use std::net::IpAddr;

/// One address assigned to one interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddress {
    /// Interface name (e.g. `eth0`)
    pub interface: String,
    /// Assigned address
    pub ip: IpAddr,
}

/// List every address of every local interface
pub fn interface_addresses() -> std::io::Result<Vec<InterfaceAddress>> {
    Ok(if_addrs::get_if_addrs()?
        .into_iter()
        .map(|iface| InterfaceAddress {
            ip: iface.ip(),
            interface: iface.name,
        })
        .collect())
}

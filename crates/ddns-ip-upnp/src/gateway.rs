// # Gateway Traits
//
// Seam between the UPnP finder and the discovery protocol.
//
// ## Implementations
//
// - SSDP + SOAP: `ssdp` module
// - Test doubles: unit tests of the finder

use async_trait::async_trait;
use ddns_core::Result;

/// An Internet Gateway Device able to report its external address
#[async_trait]
pub trait Gateway: Send + Sync {
    /// URL of the device description
    fn location(&self) -> &str;

    /// Query the external address, as reported by the device
    async fn external_ip(&self) -> Result<String>;
}

/// Locates Internet Gateway Devices
#[async_trait]
pub trait GatewayDiscovery: Send + Sync {
    /// Discover a gateway on the local network
    async fn discover(&self) -> Result<Box<dyn Gateway>>;

    /// Connect to a gateway at a known description location
    async fn connect(&self, location: &str) -> Result<Box<dyn Gateway>>;
}

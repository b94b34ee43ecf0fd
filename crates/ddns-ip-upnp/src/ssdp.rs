//! SSDP discovery and SOAP queries of Internet Gateway Devices
//!
//! 1. `M-SEARCH` for an InternetGatewayDevice on the SSDP multicast group
//! 2. Fetch the device description from the answer's `LOCATION`
//! 3. Locate the `WANIPConnection` (or `WANPPPConnection`) control URL
//! 4. Call `GetExternalIPAddress` on it

use async_trait::async_trait;
use ddns_core::http::{HttpClientConfig, build_client};
use ddns_core::{Error, Result};
use reqwest::Url;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::gateway::{Gateway, GatewayDiscovery};

const SSDP_MULTICAST: &str = "239.255.255.250:1900";

const SEARCH_TARGETS: &[&str] = &[
    "urn:schemas-upnp-org:device:InternetGatewayDevice:1",
    "urn:schemas-upnp-org:device:InternetGatewayDevice:2",
];

const CONNECTION_SERVICES: &[&str] = &[
    "urn:schemas-upnp-org:service:WANIPConnection:",
    "urn:schemas-upnp-org:service:WANPPPConnection:",
];

/// SSDP based gateway discovery
pub struct SsdpDiscovery {
    timeout: Duration,
    client: reqwest::Client,
}

impl SsdpDiscovery {
    /// Create a discovery waiting at most `timeout` for SSDP answers
    ///
    /// The same timeout bounds every HTTP request to the device.
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            timeout,
            client: build_client(HttpClientConfig::with_timeout(timeout))?,
        })
    }

    async fn search(&self) -> Result<String> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        for target in SEARCH_TARGETS {
            let request = search_request(target, self.timeout);
            socket.send_to(request.as_bytes(), SSDP_MULTICAST).await?;
        }

        let deadline = Instant::now() + self.timeout;
        let mut buf = [0u8; 2048];
        loop {
            let received = tokio::time::timeout_at(deadline, socket.recv_from(&mut buf)).await;
            let (len, from) = match received {
                Ok(result) => result?,
                Err(_) => return Err(Error::finder("no UPnP device answered")),
            };
            let answer = String::from_utf8_lossy(&buf[..len]);
            trace!("SSDP answer from {}: {}", from, answer);
            if let Some(location) = parse_location(&answer) {
                return Ok(location);
            }
        }
    }

    async fn describe(&self, location: &str) -> Result<IgdDevice> {
        let base = Url::parse(location)
            .map_err(|e| Error::finder(format!("invalid IGD location '{}': {}", location, e)))?;
        let description = self
            .client
            .get(base.clone())
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| Error::finder(format!("failed to fetch '{}': {}", location, e)))?
            .text()
            .await
            .map_err(|e| Error::finder(format!("failed to read '{}': {}", location, e)))?;

        let (service_type, control_url) = find_connection_service(&description).ok_or_else(|| {
            Error::finder(format!("no WAN connection service at '{}'", location))
        })?;
        let base = match tag_text(&description, "URLBase").map(str::trim) {
            Some(url_base) if !url_base.is_empty() => Url::parse(url_base).unwrap_or(base),
            _ => base,
        };
        let control_url = base
            .join(&control_url)
            .map_err(|e| Error::finder(format!("invalid control URL '{}': {}", control_url, e)))?;
        debug!("IGD control URL {} ({})", control_url, service_type);

        Ok(IgdDevice {
            location: location.to_string(),
            service_type,
            control_url,
            client: self.client.clone(),
        })
    }
}

#[async_trait]
impl GatewayDiscovery for SsdpDiscovery {
    async fn discover(&self) -> Result<Box<dyn Gateway>> {
        let location = self.search().await?;
        debug!("IGD discovered at location '{}'", location);
        Ok(Box::new(self.describe(&location).await?))
    }

    async fn connect(&self, location: &str) -> Result<Box<dyn Gateway>> {
        Ok(Box::new(self.describe(location).await?))
    }
}

/// A described Internet Gateway Device
struct IgdDevice {
    location: String,
    service_type: String,
    control_url: Url,
    client: reqwest::Client,
}

#[async_trait]
impl Gateway for IgdDevice {
    fn location(&self) -> &str {
        &self.location
    }

    async fn external_ip(&self) -> Result<String> {
        let response = self
            .client
            .post(self.control_url.clone())
            .header("Content-Type", "text/xml; charset=\"utf-8\"")
            .header(
                "SOAPAction",
                format!("\"{}#GetExternalIPAddress\"", self.service_type),
            )
            .body(soap_request(&self.service_type))
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| Error::finder(format!("GetExternalIPAddress failed: {}", e)))?
            .text()
            .await
            .map_err(|e| Error::finder(format!("GetExternalIPAddress failed: {}", e)))?;

        tag_text(&response, "NewExternalIPAddress")
            .map(|ip| ip.trim().to_string())
            .ok_or_else(|| Error::finder("GetExternalIPAddress returned no address"))
    }
}

fn search_request(target: &str, timeout: Duration) -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\nHOST: {}\r\nST: {}\r\nMAN: \"ssdp:discover\"\r\nMX: {}\r\n\r\n",
        SSDP_MULTICAST,
        target,
        timeout.as_secs().clamp(1, 5)
    )
}

fn soap_request(service_type: &str) -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\"?>\r\n",
            "<s:Envelope xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\" ",
            "s:encodingStyle=\"http://schemas.xmlsoap.org/soap/encoding/\">",
            "<s:Body><u:GetExternalIPAddress xmlns:u=\"{}\"/></s:Body>",
            "</s:Envelope>\r\n"
        ),
        service_type
    )
}

/// Extract the `LOCATION` header of an SSDP answer
fn parse_location(answer: &str) -> Option<String> {
    answer.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case("location")
            .then(|| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Content of every element named `tag`, in document order
///
/// Elements are matched on their local name, so `<u:tag>` and
/// `<tag attr="..">` match as well. A self-closing element has empty
/// content. This is a scanner for the flat documents IGDs return, not an
/// XML parser: comments and CDATA sections are not recognized.
fn elements<'a>(xml: &'a str, tag: &'a str) -> impl Iterator<Item = &'a str> {
    let mut pos = 0;
    std::iter::from_fn(move || {
        while let Some(found) = xml[pos..].find('<') {
            let open = pos + found;
            let gt = open + xml[open..].find('>')?;
            pos = gt + 1;

            let inner = &xml[open + 1..gt];
            let name = inner
                .split(|c: char| c.is_whitespace() || c == '/')
                .next()
                .unwrap_or_default();
            if name.is_empty() || local_name(name) != tag {
                continue;
            }
            if inner.ends_with('/') {
                return Some("");
            }

            let close = format!("</{}", name);
            let mut search = pos;
            loop {
                let at = search + xml[search..].find(&close)?;
                let end = at + close.len();
                match xml[end..].chars().next() {
                    Some(c) if c == '>' || c.is_whitespace() => {
                        let content = &xml[pos..at];
                        pos = end;
                        return Some(content);
                    }
                    Some(_) => search = end,
                    None => return None,
                }
            }
        }
        None
    })
}

fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// Content of the first element named `tag`
fn tag_text<'a>(xml: &'a str, tag: &'a str) -> Option<&'a str> {
    elements(xml, tag).next()
}

/// Service type and control URL of the first WAN connection service
fn find_connection_service(description: &str) -> Option<(String, String)> {
    elements(description, "service").find_map(|block| {
        let service_type = tag_text(block, "serviceType")?.trim();
        let control_url = tag_text(block, "controlURL")?.trim();
        CONNECTION_SERVICES
            .iter()
            .any(|prefix| service_type.starts_with(prefix))
            .then(|| (service_type.to_string(), control_url.to_string()))
    })
}

//! Shared HTTP transport
//!
//! Every finder and updater talking HTTP builds its client here so that
//! timeouts, TLS verification and the user agent are handled the same way.

use std::time::Duration;

use crate::error::{Error, Result};

/// User agent sent with every request
pub fn user_agent() -> String {
    format!(
        "ddns-updater/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Transport settings of one client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Overall request timeout (none if unset)
    pub timeout: Option<Duration>,

    /// Accept invalid TLS certificates
    pub tls_skip_verify: bool,
}

impl HttpClientConfig {
    /// Settings with a request timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            tls_skip_verify: false,
        }
    }
}

/// Build a client for the given transport settings
pub fn build_client(config: HttpClientConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(user_agent())
        .danger_accept_invalid_certs(config.tls_skip_verify);
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| Error::http(format!("failed to prepare HTTP client: {}", e)))
}

//! Error types for ddns-updater
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ddns-updater
#[derive(Error, Debug)]
pub enum Error {
    /// Address finder errors (probe failed)
    #[error("address finder error: {0}")]
    Finder(String),

    /// DNS updater errors, tagged with the failing updater
    #[error("DNS updater '{updater}' failed: {message}")]
    Updater {
        /// Updater name
        updater: String,
        /// Error message including its cause
        message: String,
    },

    /// No hosted zone matches the configured host
    #[error("no hosted zone found matching host '{host}'")]
    ZoneNotFound {
        /// The configured host name
        host: String,
    },

    /// A record set would end up without any value
    #[error("no {record_type} records to update")]
    NoRecordsToUpdate {
        /// The record type (A or AAAA)
        record_type: String,
    },

    /// Change cache errors
    #[error("cache error: {0}")]
    Cache(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP and backend API errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML decoding errors
    #[error("TOML decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),

    /// TOML encoding errors
    #[error("TOML encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an address finder error
    pub fn finder(msg: impl Into<String>) -> Self {
        Self::Finder(msg.into())
    }

    /// Create a DNS updater error
    pub fn updater(updater: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Updater {
            updater: updater.into(),
            message: message.into(),
        }
    }

    /// Create a cache error
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconciler_errors_name_the_record_type() {
        let err = Error::NoRecordsToUpdate {
            record_type: "AAAA".to_string(),
        };
        assert_eq!(err.to_string(), "no AAAA records to update");

        let err = Error::ZoneNotFound {
            host: "www.example.com".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no hosted zone found matching host 'www.example.com'"
        );
    }

    #[test]
    fn updater_error_carries_the_updater_name() {
        let err = Error::updater("dns_route53", "backend unreachable");
        assert_eq!(
            err.to_string(),
            "DNS updater 'dns_route53' failed: backend unreachable"
        );
    }
}

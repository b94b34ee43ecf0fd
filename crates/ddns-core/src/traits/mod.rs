//! Core traits for ddns-updater
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`AddressFinder`]: Probe one source for the host's public addresses
//! - [`DnsUpdater`]: Reconcile an address set against one DNS backend
//! - [`ChangeCache`]: Key/value cache used for change detection

pub mod cache;
pub mod finder;
pub mod updater;

pub use cache::ChangeCache;
pub use finder::AddressFinder;
pub use updater::DnsUpdater;

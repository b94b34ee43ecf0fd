//! Command line arguments

use clap::Parser;
use ddns_core::config::{CacheMode, DEFAULT_CONFIG_FILE, DdnsConfig};
use std::path::PathBuf;

/// Update DNS records with the current public address(es) of this host
#[derive(Debug, Parser)]
#[command(name = "ddns-updater", version, about)]
pub struct Args {
    /// Configuration file
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Compute and log the changes without applying them
    #[arg(long, visible_alias = "pretend")]
    pub dry_run: bool,

    /// Update even if the addresses did not change
    #[arg(long)]
    pub force: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Enable colored output
    #[arg(long)]
    pub color: bool,

    /// Discard the cached state before running
    #[arg(long)]
    pub reset_cache: bool,
}

impl Args {
    /// Apply the command line overrides to the loaded configuration
    pub fn apply(&self, config: &mut DdnsConfig) {
        config.global.verbose |= self.verbose;
        config.global.debug |= self.debug;
        if self.reset_cache {
            config.global.cache = CacheMode::Reset;
        }
    }
}

// # ddns-updater
//
// One-shot command: discovers the public address(es) of this host and, if
// they changed since the last run, pushes them to the configured DNS
// backends. Scheduling is left to cron or a systemd timer.
//
// The binary is a thin integration layer:
// 1. Parse the command line and load the TOML configuration
// 2. Initialize logging and the runtime
// 3. Open the change cache and assemble finders and updaters
// 4. Run the engine once
//
// ## Example
//
// ```bash
// ddns-updater --config /etc/ddns-updater/ddns-updater.toml --verbose
// ddns-updater --dry-run --force --debug
// ```

mod assemble;
mod cli;
mod dummy;

use anyhow::{Context, Result};
use clap::Parser;
use ddns_core::{DdnsConfig, DdnsEngine, EngineOptions, RunOutcome, open_cache};
use std::process::ExitCode;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

use crate::cli::Args;

/// Exit codes for different termination scenarios
///
/// - 0: The run completed
/// - 1: Configuration or startup error
/// - 2: The run failed
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// The run completed (updated or not)
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// A finder, an updater or the cache failed
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match DdnsConfig::from_file(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };
    args.apply(&mut config);

    let log_level = log_level(&config);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_ansi(args.color)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    debug!("Configuration loaded from '{}'", args.config.display());

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let options = EngineOptions {
        force: args.force,
        dry_run: args.dry_run,
    };

    rt.block_on(async {
        let engine = match build_engine(&config, options).await {
            Ok(engine) => engine,
            Err(e) => {
                error!("{:#}", e);
                return DdnsExitCode::ConfigError;
            }
        };

        match engine.run().await {
            Ok(outcome) => {
                report(&outcome);
                DdnsExitCode::Success
            }
            Err(e) => {
                error!("{:#}", e);
                DdnsExitCode::RuntimeError
            }
        }
    })
    .into()
}

fn log_level(config: &DdnsConfig) -> Level {
    if config.global.debug {
        Level::DEBUG
    } else if config.global.verbose {
        Level::INFO
    } else {
        Level::WARN
    }
}

/// Open the cache and wire every enabled component into an engine
async fn build_engine(config: &DdnsConfig, options: EngineOptions) -> Result<DdnsEngine> {
    let cache = open_cache(&config.global)
        .await
        .context("failed to open the change cache")?;
    let finders = assemble::finders(config, &cache)?;
    let updaters = assemble::updaters(config)?;

    Ok(DdnsEngine::new(finders, updaters, cache, options))
}

fn report(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::NothingConfigured | RunOutcome::NoAddresses => {}
        RunOutcome::Unchanged(addresses) => {
            info!("Addresses unchanged ({})", addresses);
        }
        RunOutcome::Updated(addresses) => {
            info!("Addresses updated ({})", addresses);
        }
    }
}

//! Log output for the server binary.
//!
//! The library crates log through `log`; those records are forwarded into
//! `tracing` and printed by a `tracing-subscriber` formatter.

use anyhow::Context;
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global logger. `RUST_LOG` overrides `default_level`.
pub fn init(default_level: &str) -> anyhow::Result<()> {
    LogTracer::init().context("Failed to forward log records")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")?;
    Ok(())
}

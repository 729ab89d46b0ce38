// Copyright 2026 The Leabra Authors
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Initialize the global tracing subscriber with console output.
/// `RUST_LOG` takes precedence over the configured level when set.
/// Returns an error if a subscriber is already installed.
pub fn init_logging(cfg: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .with_context(|| format!("invalid log filter {:?}", cfg.level))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    match cfg.format {
        LogFormat::Full => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    }
    .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;
    tracing::info!(version = crate::VERSION, level = %cfg.level, "logging initialized");
    Ok(())
}

/// Initialize logging with the default configuration
pub fn init_default() -> Result<()> {
    init_logging(&LoggingConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails() {
        // only one global subscriber can be installed per process
        let _ = init_default();
        assert!(init_default().is_err());
    }

    #[test]
    fn bad_filter_is_an_error() {
        assert!(EnvFilter::try_new("not-a-level=.[").is_err());
    }
}

//! Tracing subscriber bootstrap for binaries embedding the ranking pipeline.

use tracing_subscriber::EnvFilter;

use crate::{AppConfig, ConfigError};

/// Install a global `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured `log_level` is used.
///
/// # Errors
///
/// Returns [`ConfigError::Tracing`] if the filter is invalid or a global
/// subscriber was already installed.
pub fn init_tracing(config: &AppConfig) -> Result<(), ConfigError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))
        .map_err(|e| ConfigError::Tracing(e.to_string()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .map_err(|e| ConfigError::Tracing(e.to_string()))
}

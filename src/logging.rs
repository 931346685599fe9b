//! Logging Setup
//!
//! Structured logging via the `tracing` crate. The level comes from
//! configuration and can be overridden with `RUST_LOG`.

use crate::config::LoggingConfig;
use crate::error::JexError;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level when set. Returns an error if
/// the configured level does not parse or a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), JexError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| JexError::Config(format!("invalid log level '{}': {e}", config.level)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| JexError::Config(format!("failed to initialize logging: {e}")))
}

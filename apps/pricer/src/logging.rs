//! Tracing subscriber setup.
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - Show debug messages (overrides the config filter)
//! - `RUST_LOG=promo_core=trace` - Trace the engine only
//! - Default: `logging.filter` from pricer.toml, `info` if unset
//!
//! Logs go to stderr so stdout stays machine-readable JSON.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;
use crate::error::{AppError, AppResult};

/// Builds the filter: `RUST_LOG` when set and valid, else the configured one.
pub fn env_filter(settings: &LoggingSettings) -> AppResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.filter)
            .map_err(|e| AppError::InvalidConfig(format!("logging.filter: {}", e))),
    }
}

/// Installs the global subscriber.
///
/// Fails if one is already installed.
pub fn init(settings: &LoggingSettings) -> AppResult<()> {
    let filter = env_filter(settings)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = if settings.json {
        builder
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .with_target(false)
            .try_init()
    } else {
        builder.with_target(true).try_init()
    };

    installed.map_err(|e| AppError::Logging(e.to_string()))
}

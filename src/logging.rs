//! Tracing subscriber setup. Logs go to stderr so stdout only carries results.

use crate::config::{Config, LogFormat};
use crate::error::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Level for the given number of `-v` flags
#[must_use]
pub const fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `-v` when set.
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("herfish={}", level_for(config.verbosity))));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match config.log_format {
        LogFormat::Text => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|e| Error::Logging(e.to_string()))
}

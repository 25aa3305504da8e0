//! Tracing subscriber setup.
//!
//! Log events go to stderr so command output on stdout stays clean. The
//! default level comes from `[logging]`; `RUST_LOG` overrides it.

use crate::config::{LogFormat, LoggingConfig};
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("invalid log level '{0}' (expected error, warn, info, debug, trace or off)")]
    Level(String),
    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Parse a `[logging] level` value.
pub fn parse_level(level: &str) -> Result<LevelFilter, TelemetryError> {
    level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| TelemetryError::Level(level.to_string()))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(logging: &LoggingConfig) -> Result<(), TelemetryError> {
    let level = parse_level(&logging.level)?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|err| TelemetryError::Install(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_levels() {
        assert_eq!(parse_level("info").unwrap(), LevelFilter::INFO);
        assert_eq!(parse_level(" DEBUG ").unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::OFF);
    }

    #[test]
    fn rejects_unknown_level() {
        let err = parse_level("loud").unwrap_err();
        assert!(err.to_string().contains("loud"));
    }
}

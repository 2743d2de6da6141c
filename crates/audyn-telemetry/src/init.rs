//! Tracing subscriber setup for the gateway process.
//!
//! Events go to stderr because stdout carries the response channel.

use std::io;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use once_cell::sync::OnceCell;
use tracing::info;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// First build identifier handed to [`init_logging`].
static BUILD_SHA: OnceCell<String> = OnceCell::new();

/// Install the global subscriber for `config`.
///
/// `RUST_LOG` takes precedence over `config.level`.
///
/// # Errors
///
/// Returns an error when a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let build_sha = BUILD_SHA.get_or_init(|| config.build_sha.to_string());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level));

    tracing_subscriber::registry()
        .with(stderr_layer(config.format))
        .with(filter)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))?;
    info!(
        build_sha = build_sha.as_str(),
        level = config.level,
        format = ?config.format,
        "logging initialised"
    );
    Ok(())
}

/// Build identifier recorded by the first [`init_logging`] call.
#[must_use]
pub fn build_sha() -> &'static str {
    BUILD_SHA.get().map_or("dev", String::as_str)
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Filter directive such as `info` or `audyn_gateway=debug`.
    pub level: &'a str,
    /// Event encoding.
    pub format: LogFormat,
    /// Build identifier logged at startup.
    pub build_sha: &'a str,
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            format: LogFormat::infer(),
            build_sha: build_sha(),
        }
    }
}

/// Event encoding on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Human-readable lines.
    Pretty,
}

impl LogFormat {
    /// Pretty in debug builds, JSON otherwise.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

impl FromStr for LogFormat {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            _ => Err("expected `json` or `pretty`"),
        }
    }
}

fn stderr_layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    let layer = fmt::layer().with_writer(io::stderr).with_target(false);
    match format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Pretty => layer.boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parses_known_names() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!(" Pretty ".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn default_config_uses_info_and_inferred_format() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.format, LogFormat::infer());
    }

    #[test]
    fn second_install_fails_and_keeps_first_build_sha() {
        let first = LoggingConfig {
            level: "debug",
            format: LogFormat::Json,
            build_sha: "abc123",
        };
        let _ = init_logging(&first);
        let second = LoggingConfig {
            build_sha: "def456",
            ..first.clone()
        };
        assert!(init_logging(&second).is_err());
        assert_eq!(build_sha(), "abc123");
    }
}

//! Error types for configuration loading.

use thiserror::Error;

/// Structured errors emitted while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained an invalid value.
    #[error("invalid value for '{var}': {reason}")]
    InvalidVar {
        /// Fully qualified variable name.
        var: String,
        /// Offending value.
        value: String,
        /// Static reason describing the failure.
        reason: &'static str,
    },
}

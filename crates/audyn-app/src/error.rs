//! # Design
//!
//! - Centralize application-level errors for bootstrap and serving.
//! - Keep error messages constant while carrying context fields for debugging.

use std::io;

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("configuration operation failed")]
    Config {
        /// Source configuration error.
        #[from]
        source: audyn_config::ConfigError,
    },
    /// Logging could not be installed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Failure detail reported by the subscriber.
        detail: String,
    },
    /// Reading requests or writing responses failed.
    #[error("io operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Source IO error.
        source: io::Error,
    },
}

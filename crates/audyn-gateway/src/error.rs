//! Caller-visible failure categories.

use audyn_torrent_core::TorrentError;
use thiserror::Error;

/// Coarse failure category reported to the caller alongside a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller error detected before anything was delegated.
    InvalidArgument,
    /// Delegation to the engine failed.
    Native,
    /// The method name is not recognized.
    NotImplemented,
}

impl ErrorCategory {
    /// Wire code for the category.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::Native => "ERROR",
            Self::NotImplemented => "NOT_IMPLEMENTED",
        }
    }
}

/// Errors produced while parsing or dispatching a gateway request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The method expects an argument bag but received something else.
    #[error("expected map arguments")]
    ExpectedMap,
    /// A required field is absent, not a string, or empty.
    #[error("{field} is required")]
    MissingField {
        /// Argument key.
        field: &'static str,
    },
    /// None of a set of alternative fields was supplied.
    #[error("one of {fields} is required")]
    MissingOneOf {
        /// Human-readable list of alternatives.
        fields: &'static str,
    },
    /// More than one of a set of mutually exclusive fields was supplied.
    #[error("only one of {fields} may be given")]
    ConflictingFields {
        /// Human-readable list of alternatives.
        fields: &'static str,
    },
    /// A field is present but its value is unusable.
    #[error("{field} {reason}")]
    InvalidValue {
        /// Argument key.
        field: &'static str,
        /// Static reason describing the problem.
        reason: &'static str,
    },
    /// The engine reported a failure.
    #[error("torrent engine request failed")]
    Native {
        /// Underlying engine error.
        #[source]
        source: TorrentError,
    },
    /// A snapshot could not be encoded for the caller.
    #[error("failed to encode response")]
    Encode {
        /// Underlying serializer error.
        #[source]
        source: serde_json::Error,
    },
    /// The method name is not recognized.
    #[error("method not implemented: {method}")]
    NotImplemented {
        /// Method name as received.
        method: String,
    },
}

impl GatewayError {
    /// Category the error is reported under.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::ExpectedMap
            | Self::MissingField { .. }
            | Self::MissingOneOf { .. }
            | Self::ConflictingFields { .. }
            | Self::InvalidValue { .. } => ErrorCategory::InvalidArgument,
            Self::Native { .. } | Self::Encode { .. } => ErrorCategory::Native,
            Self::NotImplemented { .. } => ErrorCategory::NotImplemented,
        }
    }

    /// Wire code for the error's category.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.category().code()
    }

    /// Caller-facing message; engine failures carry their full context chain.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Native { source } => source.detail(),
            Self::Encode { source } => format!("{self}: {source}"),
            _ => self.to_string(),
        }
    }
}

impl From<TorrentError> for GatewayError {
    fn from(source: TorrentError) -> Self {
        Self::Native { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_map_to_wire_codes() {
        let cases = [
            (GatewayError::ExpectedMap, "INVALID_ARGUMENT"),
            (
                GatewayError::MissingField { field: "savePath" },
                "INVALID_ARGUMENT",
            ),
            (
                GatewayError::Native {
                    source: TorrentError::NotFound {
                        handle: "x".into(),
                    },
                },
                "ERROR",
            ),
            (
                GatewayError::NotImplemented {
                    method: "fly".into(),
                },
                "NOT_IMPLEMENTED",
            ),
        ];
        for (err, code) in cases {
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn messages_name_the_field() {
        assert_eq!(
            GatewayError::MissingField { field: "filePath" }.message(),
            "filePath is required"
        );
        assert_eq!(
            GatewayError::InvalidValue {
                field: "infoHash",
                reason: "must be a 40-character hexadecimal info-hash",
            }
            .message(),
            "infoHash must be a 40-character hexadecimal info-hash"
        );
        assert_eq!(GatewayError::ExpectedMap.message(), "expected map arguments");
    }

    #[test]
    fn native_message_passes_engine_detail_through() {
        let err = GatewayError::from(TorrentError::NotFound {
            handle: "ubuntu.iso".into(),
        });
        assert_eq!(err.message(), "torrent not found: ubuntu.iso");
        assert_eq!(err.to_string(), "torrent engine request failed");
    }
}

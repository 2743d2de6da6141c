//! Error types for torrent core services.

use std::error::Error;

use thiserror::Error;

use crate::model::InfoHash;

/// Primary error type for torrent operations.
#[derive(Debug, Error)]
pub enum TorrentError {
    /// Operation is not supported by the underlying engine.
    #[error("torrent operation not supported")]
    Unsupported {
        /// Operation identifier.
        operation: &'static str,
    },
    /// Torrent was not found in the session.
    #[error("torrent not found")]
    NotFound {
        /// Handle (info-hash or name) that did not resolve.
        handle: String,
    },
    /// Torrent is already part of the session.
    #[error("torrent already present in session")]
    Duplicate {
        /// Info-hash of the existing torrent.
        info_hash: InfoHash,
    },
    /// Request carried a value the engine cannot act on.
    #[error("invalid torrent input")]
    InvalidInput {
        /// Field with the invalid value.
        field: &'static str,
        /// Static reason describing the invalid value.
        reason: &'static str,
    },
    /// Operation failed in the underlying engine.
    #[error("torrent operation failed")]
    OperationFailed {
        /// Operation identifier.
        operation: &'static str,
        /// Torrent identifier when available.
        info_hash: Option<InfoHash>,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl TorrentError {
    /// Whether the error reports a torrent the session does not know.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Render the error together with its source chain.
    #[must_use]
    pub fn detail(&self) -> String {
        let mut message = self.to_string();
        match self {
            Self::NotFound { handle } => {
                message.push_str(": ");
                message.push_str(handle);
            }
            Self::Duplicate { info_hash } => {
                message.push_str(": ");
                message.push_str(&info_hash.to_hex());
            }
            Self::InvalidInput { field, reason } => {
                message.push_str(&format!(": {field} {reason}"));
            }
            Self::Unsupported { operation } => {
                message.push_str(": ");
                message.push_str(operation);
            }
            Self::OperationFailed { operation, .. } => {
                message.push_str(" (");
                message.push_str(operation);
                message.push(')');
            }
        }
        let mut source = self.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

/// Failure to parse the textual form of an info-hash.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InfoHashError {
    /// Input was not exactly 40 characters long.
    #[error("info-hash must be 40 hexadecimal characters")]
    Length {
        /// Length of the rejected input.
        len: usize,
    },
    /// Input contained a character outside `[0-9a-fA-F]`.
    #[error("info-hash contains non-hexadecimal characters")]
    NotHex,
}

/// Convenience alias for torrent operation results.
pub type TorrentResult<T> = Result<T, TorrentError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn detail_includes_operation_and_source_chain() {
        let err = TorrentError::OperationFailed {
            operation: "add_torrent",
            info_hash: None,
            source: Box::new(io::Error::other("disk gone")),
        };
        assert_eq!(
            err.detail(),
            "torrent operation failed (add_torrent): disk gone"
        );
    }

    #[test]
    fn detail_names_missing_handle() {
        let err = TorrentError::NotFound {
            handle: "ubuntu.iso".into(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.detail(), "torrent not found: ubuntu.iso");
    }

    #[test]
    fn invalid_input_detail_names_field() {
        let err = TorrentError::InvalidInput {
            field: "piece_length",
            reason: "must be a power of two",
        };
        assert!(!err.is_not_found());
        assert_eq!(
            err.detail(),
            "invalid torrent input: piece_length must be a power of two"
        );
    }
}

//! # Design
//!
//! - Centralize engine error context without using `anyhow`.
//! - Keep error messages stable; store operational context in fields.
//! - Provide helpers to build `TorrentError` with structured sources.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use audyn_torrent_core::{InfoHash, TorrentError};

#[derive(Debug)]
/// Internal error details used by the in-process engine.
pub enum EngineError {
    /// A filesystem operation failed.
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Bencoded input could not be decoded.
    BencodeDecode {
        /// Underlying decoder error.
        source: serde_bencode::Error,
    },
    /// Metainfo could not be encoded.
    BencodeEncode {
        /// Underlying encoder error.
        source: serde_bencode::Error,
    },
    /// Metainfo decoded but violates structural rules.
    InvalidMetainfo {
        /// Static reason describing the violation.
        reason: &'static str,
    },
    /// An authoring request could not be honoured.
    InvalidRequest {
        /// Field with the invalid value.
        field: &'static str,
        /// Static reason describing the invalid value.
        reason: &'static str,
    },
    /// The background worker is gone.
    WorkerUnavailable {
        /// Operation that could not be serviced.
        operation: &'static str,
    },
    /// A blocking hashing task panicked or was cancelled.
    TaskFailed {
        /// Underlying join error.
        source: tokio::task::JoinError,
    },
}

impl Display for EngineError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io {
                operation, path, ..
            } => write!(formatter, "failed to {operation} at {}", path.display()),
            Self::BencodeDecode { .. } => formatter.write_str("failed to decode bencoded metainfo"),
            Self::BencodeEncode { .. } => formatter.write_str("failed to encode metainfo"),
            Self::InvalidMetainfo { reason } => write!(formatter, "invalid metainfo: {reason}"),
            Self::InvalidRequest { field, reason } => {
                write!(formatter, "invalid request: {field} {reason}")
            }
            Self::WorkerUnavailable { operation } => {
                let _ = operation;
                formatter.write_str("engine worker unavailable")
            }
            Self::TaskFailed { .. } => formatter.write_str("background hashing task failed"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::BencodeDecode { source } | Self::BencodeEncode { source } => Some(source),
            Self::TaskFailed { source } => Some(source),
            _ => None,
        }
    }
}

/// Build a torrent error with structured operation context.
pub fn op_failed(
    operation: &'static str,
    info_hash: Option<InfoHash>,
    source: impl Error + Send + Sync + 'static,
) -> TorrentError {
    TorrentError::OperationFailed {
        operation,
        info_hash,
        source: Box::new(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn engine_error_display_and_source() {
        let cases = vec![
            (
                EngineError::Io {
                    operation: "read metainfo",
                    path: PathBuf::from("a.torrent"),
                    source: io::Error::other("io"),
                },
                "failed to read metainfo at a.torrent",
                true,
            ),
            (
                EngineError::InvalidMetainfo {
                    reason: "piece length must be positive",
                },
                "invalid metainfo: piece length must be positive",
                false,
            ),
            (
                EngineError::InvalidRequest {
                    field: "source",
                    reason: "contains no data",
                },
                "invalid request: source contains no data",
                false,
            ),
            (
                EngineError::WorkerUnavailable { operation: "list" },
                "engine worker unavailable",
                false,
            ),
        ];

        for (err, message, has_source) in cases {
            assert_eq!(err.to_string(), message);
            assert_eq!(err.source().is_some(), has_source);
        }
    }

    #[test]
    fn op_failed_wraps_torrent_error() {
        let hash = InfoHash::from_bytes([1; 20]);
        let err = op_failed("add_torrent", Some(hash), io::Error::other("io"));
        match err {
            TorrentError::OperationFailed {
                operation,
                info_hash: Some(recorded),
                source,
            } => {
                assert_eq!(operation, "add_torrent");
                assert_eq!(recorded, hash);
                assert_eq!(source.to_string(), "io");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

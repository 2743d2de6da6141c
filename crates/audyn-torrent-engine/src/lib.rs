#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub)]

//! In-process torrent engine: metainfo parsing, authoring, piece
//! verification, and a session registry driven by a background worker.

mod adapter;
/// Torrent authoring from files and directories.
pub mod author;
mod command;
/// Engine-internal error types.
pub mod error;
/// Bencoded metainfo model and parser.
pub mod metainfo;
mod session;
/// Strongly typed settings and defaults.
pub mod types;
/// Piece verification against on-disk data.
pub mod verify;
mod worker;

pub use adapter::LocalTorrentEngine;
pub use author::{auto_piece_length, author};
pub use error::EngineError;
pub use metainfo::ParsedMetainfo;
pub use types::{DEFAULT_COMMENT, DEFAULT_CREATOR, EngineConfig, SessionSettings, Toggle};
pub use verify::{Verification, verify_pieces};

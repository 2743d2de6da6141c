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

//! Engine-agnostic torrent interfaces and DTOs.
//!
//! Layout: `model` (identifiers, requests, snapshots), `service` (the
//! `TorrentEngine` trait), `error` (`TorrentError`).

pub mod error;
pub mod model;
pub mod service;

pub use error::{InfoHashError, TorrentError, TorrentResult};
pub use model::{
    AddTorrent, AddTorrentFlags, CreateTorrent, CreatedTorrent, InfoHash, SwarmInfo,
    TorrentDescriptor, TorrentHandle, TorrentSource, TorrentState, TorrentStats,
};
pub use service::TorrentEngine;

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

//! Torrent session gateway: validates loosely typed method calls, turns them
//! into typed requests, and delegates to a [`TorrentEngine`].
//!
//! Layout: `args` (argument bag), `request` (typed requests and parsing),
//! `gateway` (dispatch), `response` (replies), `error` (failure categories).
//!
//! [`TorrentEngine`]: audyn_torrent_core::TorrentEngine

pub mod args;
pub mod error;
mod gateway;
pub mod request;
mod response;

pub use args::{ArgValue, ArgumentBag, Arguments};
pub use error::{ErrorCategory, GatewayError};
pub use gateway::TorrentGateway;
pub use request::GatewayRequest;
pub use response::Reply;

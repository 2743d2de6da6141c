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

//! Audyn gateway application wiring.
//!
//! Layout: `bootstrap.rs` (config, logging, engine wiring), `channel.rs`
//! (JSON-lines request channel), `error.rs` (`AppError`).

/// Application bootstrap and environment loading.
pub mod bootstrap;
/// JSON-lines request/response channel.
pub mod channel;
/// Application-level errors.
pub mod error;

pub use bootstrap::run_app;
pub use channel::serve;
pub use error::{AppError, AppResult};

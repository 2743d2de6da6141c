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

//! Environment-driven configuration for the Audyn gateway binary.
//!
//! Layout: `model.rs` (`AppConfig` and loading), `validate.rs` (value
//! parsers), `error.rs` (`ConfigError`).

pub mod error;
pub mod model;
mod validate;

pub use error::ConfigError;
pub use model::{AppConfig, DEFAULT_APP_DIR, ENV_PREFIX};

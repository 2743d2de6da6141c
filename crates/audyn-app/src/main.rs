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

//! Binary entrypoint that serves the torrent gateway over stdin/stdout.

use audyn_app::{AppResult, run_app};

/// Bootstraps the gateway and blocks until stdin closes.
#[tokio::main]
async fn main() -> AppResult<()> {
    run_app().await
}

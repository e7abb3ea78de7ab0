#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Binary entrypoint: reads engine events as JSON lines on stdin and raises
//! desktop notifications for them.

use tidings_app::{AppResult, run_app};

/// Bootstraps the Tidings application and blocks until input ends or the
/// process is interrupted.
#[tokio::main]
async fn main() -> AppResult<()> {
    run_app().await
}

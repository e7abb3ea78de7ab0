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

//! Tidings application wiring.
//!
//! Layout: `bootstrap.rs` (environment and service wiring), `feed.rs`
//! (JSON-lines engine event input), `orchestrator.rs` (event and signal
//! loop driving the notification manager), `error.rs`.

pub mod bootstrap;
pub mod error;
pub mod feed;
pub mod orchestrator;

pub use bootstrap::{BootstrapDependencies, run_app, run_app_with};
pub use error::{AppError, AppResult};
pub use feed::{parse_event_line, pump_events};
pub use orchestrator::{OrchestratorDeps, spawn_notification_orchestrator};

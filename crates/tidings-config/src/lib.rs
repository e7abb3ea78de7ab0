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

//! File-backed key-value settings for the Tidings client.
//!
//! Layout: `storage.rs` (`SettingsStorage` + `SettingsWatcher`),
//! `preferences.rs` (typed accessors over well-known keys), `error.rs`.

pub mod error;
pub mod preferences;
pub mod storage;

pub use error::{ConfigError, ConfigResult};
pub use preferences::{Preferences, keys};
pub use storage::{CONFIG_PATH_ENV, SettingsStorage, SettingsWatcher};

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

//! User-facing notification layer for the Tidings torrent client.
//!
//! Engine events are translated into [`Request`]s by the [`Manager`], handed
//! to a pluggable [`Notifier`] back end, and user interaction flows back as
//! [`NotifierSignal`]s that the manager turns into side effects such as
//! opening a finished download.
//!
//! Layout: `request.rs` (request value types), `notifier.rs` (back-end trait
//! and signal channel), `backends/` (no-op, D-Bus, tray), `registry.rs`
//! (runtime back-end selection), `opener.rs` (URL opening side effect),
//! `platform.rs` (headless and GUI variants), `templates.rs` (event to request
//! mapping), `manager.rs`, `error.rs`.

pub mod backends;
pub mod error;
pub mod manager;
pub mod notifier;
pub mod opener;
pub mod platform;
pub mod registry;
pub mod request;
pub mod templates;

pub use backends::{
    DBusNotifierProvider, NoopNotifier, SystemTrayNotifier, SystemTrayNotifierProvider, TrayIcon,
};
pub use error::{NotifyError, NotifyResult};
pub use manager::{ActionOutcome, Manager};
pub use notifier::{
    CloseReason, Notification, Notifier, NotifierSignal, NotifierSignals, SignalReceiver,
    signal_channel,
};
pub use opener::{DesktopOpener, DesktopServices, ProcessOpener, UrlOpener};
pub use platform::{GuiPlatform, HeadlessPlatform, Platform};
pub use registry::{NotifierProvider, NotifierRegistry};
pub use request::{
    Category, DEFAULT_ACTION, OPEN_ACTION, Request, RequestId, Severity, Timeout, Urgency,
};

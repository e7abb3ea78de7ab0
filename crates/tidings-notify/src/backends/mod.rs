//! Concrete notifier back ends.
//!
//! The no-op back end is always available. The D-Bus back end wraps the
//! freedesktop notification service and only exists with the `dbus` feature on
//! freedesktop platforms; its provider is always present and reports itself
//! unsupported elsewhere. The tray back end drives a toolkit tray icon through
//! the [`TrayIcon`] trait.

mod dbus;
mod noop;
mod tray;

pub use dbus::DBusNotifierProvider;
pub use noop::NoopNotifier;
pub use tray::{SystemTrayNotifier, SystemTrayNotifierProvider, TrayIcon};

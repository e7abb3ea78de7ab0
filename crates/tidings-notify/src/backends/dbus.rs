//! Freedesktop notification service back end.
//!
//! # Design
//! - Built on `notify-rust`; compiled only with the `dbus` feature on
//!   freedesktop platforms. Elsewhere the provider reports itself unsupported.
//! - The daemon is probed once through `GetServerInformation` when the
//!   provider is asked for support.
//! - Each shown notification parks a named thread in `wait_for_action` and
//!   forwards the outcome through the signal channel.

use std::sync::Arc;

use crate::error::NotifyResult;
use crate::notifier::Notifier;
use crate::registry::NotifierProvider;

const BACKEND: &str = "dbus";

/// Offers the D-Bus back end when a notification server answers.
#[derive(Debug, Clone)]
pub struct DBusNotifierProvider {
    app_name: String,
    app_icon: Option<String>,
}

impl DBusNotifierProvider {
    /// Provider that announces notifications as `app_name`, optionally with a
    /// fixed application icon (path or theme name).
    #[must_use]
    pub fn new(app_name: impl Into<String>, app_icon: Option<String>) -> Self {
        Self {
            app_name: app_name.into(),
            app_icon,
        }
    }
}

impl NotifierProvider for DBusNotifierProvider {
    fn name(&self) -> &'static str {
        BACKEND
    }

    fn is_supported(&self) -> bool {
        imp::server_available()
    }

    fn create(&self) -> NotifyResult<Arc<dyn Notifier>> {
        imp::create(&self.app_name, self.app_icon.clone())
    }
}

#[cfg(all(feature = "dbus", unix, not(target_os = "macos")))]
mod imp {
    use std::sync::Arc;

    use notify_rust::{Hint, Notification as DesktopNotification, Timeout as DesktopTimeout};
    use tracing::{debug, warn};

    use super::BACKEND;
    use crate::error::NotifyResult;
    use crate::notifier::{CloseReason, Notification, Notifier, NotifierSignals};
    use crate::request::{Category, Request, Severity, Timeout, Urgency};

    const CLOSED_ACTION: &str = "__closed";

    pub(super) fn server_available() -> bool {
        match notify_rust::get_server_information() {
            Ok(info) => {
                debug!(server = %info.name, vendor = %info.vendor, "notification server found");
                true
            }
            Err(error) => {
                debug!(error = %error, "no notification server on the session bus");
                false
            }
        }
    }

    #[allow(clippy::unnecessary_wraps)]
    pub(super) fn create(
        app_name: &str,
        app_icon: Option<String>,
    ) -> NotifyResult<Arc<dyn Notifier>> {
        Ok(Arc::new(DBusNotifier {
            app_name: app_name.to_string(),
            app_icon,
        }))
    }

    struct DBusNotifier {
        app_name: String,
        app_icon: Option<String>,
    }

    impl DBusNotifier {
        fn build(&self, request: &Request) -> DesktopNotification {
            let mut notification = DesktopNotification::new();
            notification
                .appname(&self.app_name)
                .summary(&request.title)
                .body(&request.message)
                .urgency(urgency(request.urgency))
                .timeout(timeout(request.timeout));
            if let Some(hint) = category_hint(request) {
                notification.hint(Hint::Category(hint.to_string()));
            }
            let icon = self
                .app_icon
                .as_deref()
                .or_else(|| severity_icon(request.severity));
            if let Some(icon) = icon {
                notification.icon(icon);
            }
            for (id, label) in &request.actions {
                notification.action(id, label);
            }
            notification
        }
    }

    impl Notifier for DBusNotifier {
        fn name(&self) -> &'static str {
            BACKEND
        }

        fn show_notification(&self, notification: &Notification, signals: NotifierSignals) {
            let id = notification.id();
            let desktop = self.build(notification.request());
            let spawned = std::thread::Builder::new()
                .name("tidings-dbus-notify".into())
                .spawn(move || match desktop.show() {
                    Ok(handle) => handle.wait_for_action(|action| {
                        if action == CLOSED_ACTION {
                            signals.closed(id, CloseReason::Dismissed);
                        } else {
                            signals.action_triggered(id, action);
                            signals.closed(id, CloseReason::Dismissed);
                        }
                    }),
                    Err(error) => {
                        warn!(request_id = %id, error = %error, "failed to show desktop notification");
                        signals.closed(id, CloseReason::ApplicationClosed);
                    }
                });
            if let Err(error) = spawned {
                warn!(request_id = %id, error = %error, "failed to spawn notification thread");
            }
        }
    }

    const fn urgency(urgency: Urgency) -> notify_rust::Urgency {
        match urgency {
            Urgency::Low => notify_rust::Urgency::Low,
            Urgency::Normal => notify_rust::Urgency::Normal,
            Urgency::High => notify_rust::Urgency::Critical,
        }
    }

    const fn timeout(timeout: Timeout) -> DesktopTimeout {
        match timeout {
            Timeout::Never => DesktopTimeout::Never,
            Timeout::Default => DesktopTimeout::Default,
            Timeout::After(ms) => DesktopTimeout::Milliseconds(ms),
        }
    }

    const fn severity_icon(severity: Severity) -> Option<&'static str> {
        match severity {
            Severity::None => None,
            Severity::Information => Some("dialog-information"),
            Severity::Warning => Some("dialog-warning"),
            Severity::Error => Some("dialog-error"),
        }
    }

    const fn category_hint(request: &Request) -> Option<&'static str> {
        match (request.category, request.severity) {
            (Category::Download, Severity::Error) => Some("transfer.error"),
            (Category::Download, _) => Some("transfer.complete"),
            (Category::Network, Severity::Error) => Some("network.error"),
            (Category::Network, _) => Some("network"),
            (Category::Generic, _) => None,
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn download_errors_use_transfer_error_hint() {
            let request = Request::new("I/O Error", "disk full")
                .with_category(Category::Download)
                .with_severity(Severity::Error);
            assert_eq!(category_hint(&request), Some("transfer.error"));
            assert_eq!(category_hint(&Request::new("t", "m")), None);
            assert_eq!(severity_icon(request.severity), Some("dialog-error"));
        }

        #[test]
        fn timeouts_translate_to_desktop_values() {
            assert_eq!(timeout(Timeout::Never), DesktopTimeout::Never);
            assert_eq!(timeout(Timeout::Default), DesktopTimeout::Default);
            assert_eq!(
                timeout(Timeout::After(750)),
                DesktopTimeout::Milliseconds(750)
            );
        }
    }
}

#[cfg(not(all(feature = "dbus", unix, not(target_os = "macos"))))]
mod imp {
    use std::sync::Arc;

    use super::BACKEND;
    use crate::error::{NotifyError, NotifyResult};
    use crate::notifier::Notifier;

    pub(super) const fn server_available() -> bool {
        false
    }

    pub(super) fn create(
        _app_name: &str,
        _app_icon: Option<String>,
    ) -> NotifyResult<Arc<dyn Notifier>> {
        Err(NotifyError::BackendUnavailable { backend: BACKEND })
    }
}

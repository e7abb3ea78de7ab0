//! Balloon notifications on a toolkit tray icon.
//!
//! # Design
//! - Exactly one balloon is tracked; a new message supersedes the previous one.
//! - The toolkit forwards balloon clicks and closes through
//!   [`SystemTrayNotifier::message_clicked`] and
//!   [`SystemTrayNotifier::message_closed`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::debug;

use crate::error::{NotifyError, NotifyResult};
use crate::notifier::{CloseReason, Notification, Notifier, NotifierSignals};
use crate::registry::NotifierProvider;
use crate::request::{DEFAULT_ACTION, RequestId, Severity};

/// Tray icon surface provided by the GUI toolkit.
pub trait TrayIcon: Send + Sync {
    /// Whether the desktop currently exposes a system tray.
    fn is_available(&self) -> bool;

    /// Show a balloon; `duration` of `None` uses the tray's own default.
    fn show_message(
        &self,
        title: &str,
        message: &str,
        severity: Severity,
        duration: Option<Duration>,
    );
}

struct Balloon {
    id: RequestId,
    signals: NotifierSignals,
}

/// Back end that shows notifications as tray balloons.
pub struct SystemTrayNotifier {
    tray: Arc<dyn TrayIcon>,
    current: Mutex<Option<Balloon>>,
}

impl SystemTrayNotifier {
    /// Back-end name reported in logs and metrics.
    pub const NAME: &'static str = "tray";

    /// Drive the given tray icon.
    #[must_use]
    pub fn new(tray: Arc<dyn TrayIcon>) -> Self {
        Self {
            tray,
            current: Mutex::new(None),
        }
    }

    /// Request currently shown in the balloon.
    #[must_use]
    pub fn current(&self) -> Option<RequestId> {
        self.lock().as_ref().map(|balloon| balloon.id)
    }

    /// The user clicked the balloon: trigger the default action on the
    /// current request, then report it dismissed.
    pub fn message_clicked(&self) {
        let Some(balloon) = self.lock().take() else {
            debug!("balloon click without an active notification");
            return;
        };
        balloon.signals.action_triggered(balloon.id, DEFAULT_ACTION);
        balloon.signals.closed(balloon.id, CloseReason::Dismissed);
    }

    /// The toolkit closed the balloon without a click.
    pub fn message_closed(&self, reason: CloseReason) {
        if let Some(balloon) = self.lock().take() {
            balloon.signals.closed(balloon.id, reason);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Balloon>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Notifier for SystemTrayNotifier {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn show_notification(&self, notification: &Notification, signals: NotifierSignals) {
        let request = notification.request();
        let previous = self.lock().replace(Balloon {
            id: notification.id(),
            signals,
        });
        if let Some(previous) = previous {
            previous
                .signals
                .closed(previous.id, CloseReason::Superseded);
        }
        self.tray.show_message(
            &request.title,
            &request.message,
            request.severity,
            request.timeout.duration(),
        );
    }
}

/// Offers the tray back end when the tray icon is available.
pub struct SystemTrayNotifierProvider {
    tray: Arc<dyn TrayIcon>,
}

impl SystemTrayNotifierProvider {
    /// Provider over the given tray icon.
    #[must_use]
    pub fn new(tray: Arc<dyn TrayIcon>) -> Self {
        Self { tray }
    }
}

impl NotifierProvider for SystemTrayNotifierProvider {
    fn name(&self) -> &'static str {
        SystemTrayNotifier::NAME
    }

    fn is_supported(&self) -> bool {
        self.tray.is_available()
    }

    fn create(&self) -> NotifyResult<Arc<dyn Notifier>> {
        if !self.tray.is_available() {
            return Err(NotifyError::BackendUnavailable {
                backend: SystemTrayNotifier::NAME,
            });
        }
        Ok(Arc::new(SystemTrayNotifier::new(Arc::clone(&self.tray))))
    }
}

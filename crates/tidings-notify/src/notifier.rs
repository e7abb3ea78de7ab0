//! Back-end capability trait and the signal channel back ends report through.
//!
//! # Design
//! - `show_notification` never blocks; back ends that wait for the user do so
//!   on their own thread and report through [`NotifierSignals`].
//! - Signals carry only the [`RequestId`]; the manager resolves it against its
//!   correlation table.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::trace;

use crate::request::{Request, RequestId};

/// A submitted request as seen by back ends.
#[derive(Debug, Clone)]
pub struct Notification {
    id: RequestId,
    request: Arc<Request>,
}

impl Notification {
    /// Pair a request with the identifier it was submitted under.
    #[must_use]
    pub const fn new(id: RequestId, request: Arc<Request>) -> Self {
        Self { id, request }
    }

    /// Identifier to report in signals.
    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// The immutable request.
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Shared handle to the request.
    #[must_use]
    pub fn shared_request(&self) -> Arc<Request> {
        Arc::clone(&self.request)
    }
}

/// Why a notification went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    /// The user dismissed it.
    Dismissed,
    /// Its display timeout elapsed.
    Expired,
    /// A newer notification replaced it.
    Superseded,
    /// The application closed it (shutdown, back-end reset).
    ApplicationClosed,
}

impl CloseReason {
    /// Label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dismissed => "dismissed",
            Self::Expired => "expired",
            Self::Superseded => "superseded",
            Self::ApplicationClosed => "application_closed",
        }
    }
}

/// Callback raised by a back end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierSignal {
    /// The user picked one of the request's actions.
    ActionTriggered {
        /// Request the action belongs to.
        id: RequestId,
        /// Action identifier.
        action: String,
    },
    /// The notification is gone.
    Closed {
        /// Request that closed.
        id: RequestId,
        /// Why it closed.
        reason: CloseReason,
    },
}

impl NotifierSignal {
    /// Request the signal refers to.
    #[must_use]
    pub const fn id(&self) -> RequestId {
        match self {
            Self::ActionTriggered { id, .. } | Self::Closed { id, .. } => *id,
        }
    }

    /// Label used in logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ActionTriggered { .. } => "action_triggered",
            Self::Closed { .. } => "closed",
        }
    }
}

/// Receiving half of the signal channel, drained by the orchestrator.
pub type SignalReceiver = mpsc::UnboundedReceiver<NotifierSignal>;

/// Sending half handed to back ends with every notification.
#[derive(Debug, Clone)]
pub struct NotifierSignals {
    sender: mpsc::UnboundedSender<NotifierSignal>,
}

/// Create a connected signal sender and receiver.
#[must_use]
pub fn signal_channel() -> (NotifierSignals, SignalReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (NotifierSignals { sender }, receiver)
}

impl NotifierSignals {
    /// Report that the user picked `action` on request `id`.
    pub fn action_triggered(&self, id: RequestId, action: impl Into<String>) {
        self.send(NotifierSignal::ActionTriggered {
            id,
            action: action.into(),
        });
    }

    /// Report that request `id` closed.
    pub fn closed(&self, id: RequestId, reason: CloseReason) {
        self.send(NotifierSignal::Closed { id, reason });
    }

    fn send(&self, signal: NotifierSignal) {
        if let Err(error) = self.sender.send(signal) {
            trace!(
                request_id = %error.0.id(),
                kind = error.0.kind(),
                "signal receiver gone; dropping notifier signal"
            );
        }
    }
}

/// A notification back end.
pub trait Notifier: Send + Sync {
    /// Back-end name for diagnostics and metrics.
    fn name(&self) -> &'static str;

    /// Display or enqueue the notification without blocking the caller.
    fn show_notification(&self, notification: &Notification, signals: NotifierSignals);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signals_reach_the_receiver_in_order() {
        let (signals, mut receiver) = signal_channel();
        let id = RequestId::new();
        signals.action_triggered(id, "default");
        signals.closed(id, CloseReason::Expired);

        assert_eq!(
            receiver.recv().await,
            Some(NotifierSignal::ActionTriggered {
                id,
                action: "default".into()
            })
        );
        let closed = receiver.recv().await;
        assert_eq!(
            closed,
            Some(NotifierSignal::Closed {
                id,
                reason: CloseReason::Expired
            })
        );
        assert_eq!(closed.map(|signal| signal.kind()), Some("closed"));
    }

    #[test]
    fn sending_after_receiver_drop_is_silent() {
        let (signals, receiver) = signal_channel();
        drop(receiver);
        signals.closed(RequestId::new(), CloseReason::Dismissed);
    }
}

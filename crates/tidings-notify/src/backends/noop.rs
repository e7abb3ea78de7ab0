use tracing::trace;

use crate::notifier::{Notification, Notifier, NotifierSignals};

/// Back end that drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl NoopNotifier {
    /// Back-end name reported in logs and metrics.
    pub const NAME: &'static str = "noop";
}

impl Notifier for NoopNotifier {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn show_notification(&self, notification: &Notification, _signals: NotifierSignals) {
        trace!(
            request_id = %notification.id(),
            title = %notification.request().title,
            "discarding notification"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::signal_channel;
    use crate::request::{Request, RequestId};
    use std::sync::Arc;

    #[test]
    fn noop_notifier_never_signals() {
        let (signals, mut receiver) = signal_channel();
        let notification = Notification::new(RequestId::new(), Arc::new(Request::new("t", "m")));
        NoopNotifier.show_notification(&notification, signals);
        assert!(receiver.try_recv().is_err());
        assert_eq!(NoopNotifier.name(), "noop");
    }
}

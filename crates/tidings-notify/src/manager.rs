//! Notification manager: turns engine events into requests and notifier
//! callbacks into side effects.
//!
//! # Design
//! - Explicitly constructed and owned by one orchestrator task; every method
//!   runs on that task, so no internal locking is needed.
//! - [`Manager::submit`] is the only path to a back end and enforces the global
//!   notification switch.
//! - Submitted requests stay in a bounded correlation table until the back end
//!   reports them closed, so late signals still resolve after a back-end reset.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tidings_config::Preferences;
use tidings_events::Event;
use tidings_telemetry::Metrics;
use tidings_torrent_core::{TorrentDescriptor, TorrentInspector};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::error::{NotifyError, NotifyResult};
use crate::notifier::{
    CloseReason, Notification, Notifier, NotifierSignal, NotifierSignals, SignalReceiver,
    signal_channel,
};
use crate::opener::UrlOpener;
use crate::platform::Platform;
use crate::request::{OPEN_ACTION, Request, RequestId};
use crate::templates;

/// Requests remembered for signal correlation before the oldest is evicted.
pub const CORRELATION_CAPACITY: usize = 256;

/// What a triggered action resulted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The path was handed to the URL opener.
    Opened(PathBuf),
    /// The request id is not (or no longer) known.
    UnknownRequest,
    /// The action has no behaviour attached.
    Unhandled,
    /// The request is not tied to a torrent.
    NoTorrent,
    /// The torrent is no longer known to the engine.
    TorrentMissing,
    /// The opener reported a failure.
    OpenFailed,
}

/// Central notification context.
pub struct Manager {
    preferences: Preferences,
    platform: Arc<dyn Platform>,
    inspector: Arc<dyn TorrentInspector>,
    opener: Arc<dyn UrlOpener>,
    notifier: Arc<dyn Notifier>,
    signals: NotifierSignals,
    pending: PendingRequests,
    metrics: Metrics,
}

impl Manager {
    /// Build a manager, resolving the initial back end through the platform's
    /// registry. The returned receiver must be drained by the owning task and
    /// fed back through [`Self::handle_signal`].
    #[must_use]
    pub fn new(
        preferences: Preferences,
        platform: Arc<dyn Platform>,
        inspector: Arc<dyn TorrentInspector>,
        metrics: Metrics,
    ) -> (Self, SignalReceiver) {
        let (signals, receiver) = signal_channel();
        let notifier = platform.registry(&preferences).resolve();
        let opener = platform.opener();
        info!(
            platform = platform.name(),
            backend = notifier.name(),
            "notification manager ready"
        );
        let manager = Self {
            preferences,
            platform,
            inspector,
            opener,
            notifier,
            signals,
            pending: PendingRequests::new(CORRELATION_CAPACITY),
            metrics,
        };
        (manager, receiver)
    }

    /// Whether notifications are shown at all.
    #[must_use]
    pub fn are_notifications_enabled(&self) -> bool {
        self.preferences.notifications_enabled()
    }

    /// Persist the global notification switch.
    pub fn set_notifications_enabled(&self, enabled: bool) {
        self.preferences.set_notifications_enabled(enabled);
    }

    /// Whether adding a torrent raises a notification.
    #[must_use]
    pub fn are_torrent_added_notifications_enabled(&self) -> bool {
        self.preferences.torrent_added_notifications_enabled()
    }

    /// Persist the torrent-added notification switch.
    pub fn set_torrent_added_notifications_enabled(&self, enabled: bool) {
        self.preferences
            .set_torrent_added_notifications_enabled(enabled);
    }

    /// Active back end.
    #[must_use]
    pub const fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Replace the active back end; `None` re-runs platform selection.
    ///
    /// Requests already delivered to the previous back end keep resolving
    /// through the correlation table.
    pub fn reset_notifier(&mut self, notifier: Option<Arc<dyn Notifier>>) {
        let next =
            notifier.unwrap_or_else(|| self.platform.registry(&self.preferences).resolve());
        info!(
            previous = self.notifier.name(),
            backend = next.name(),
            "notifier back end replaced"
        );
        self.metrics.inc_notifier_reset(next.name());
        self.notifier = next;
    }

    /// Request still awaiting a close signal.
    #[must_use]
    pub fn pending_request(&self, id: RequestId) -> Option<Arc<Request>> {
        self.pending.get(id)
    }

    /// Number of requests awaiting a close signal.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Hand a request to the active back end.
    ///
    /// Returns `None` without contacting any back end while notifications are
    /// disabled.
    pub fn submit(&mut self, request: Request) -> Option<RequestId> {
        if !self.are_notifications_enabled() {
            debug!(title = %request.title, "notifications disabled; dropping request");
            self.metrics.inc_notification_suppressed();
            return None;
        }

        let id = RequestId::new();
        let request = Arc::new(request);
        if let Some(evicted) = self.pending.insert(id, Arc::clone(&request)) {
            debug!(request_id = %evicted, "correlation table full; forgot oldest request");
        }
        self.metrics
            .inc_notification_submitted(request.category.as_str(), request.severity.as_str());
        debug!(
            request_id = %id,
            backend = self.notifier.name(),
            title = %request.title,
            "submitting notification"
        );
        self.notifier
            .show_notification(&Notification::new(id, request), self.signals.clone());
        Some(id)
    }

    /// Notify that the engine refused a torrent.
    pub fn on_add_torrent_failed(&mut self, error: &str) -> Option<RequestId> {
        self.submit(templates::add_torrent_failed(error))
    }

    /// Notify that a torrent was added, when the user opted in.
    pub fn on_torrent_added(&mut self, torrent: &TorrentDescriptor) -> Option<RequestId> {
        if !self.are_torrent_added_notifications_enabled() {
            return None;
        }
        self.submit(templates::torrent_added(torrent))
    }

    /// Notify that a torrent finished downloading.
    pub fn on_torrent_finished(&mut self, torrent: &TorrentDescriptor) -> Option<RequestId> {
        self.submit(templates::torrent_finished(torrent))
    }

    /// Notify that writing torrent data failed.
    pub fn on_full_disk_error(
        &mut self,
        torrent: &TorrentDescriptor,
        message: &str,
    ) -> Option<RequestId> {
        self.submit(templates::full_disk_error(torrent, message))
    }

    /// Notify that downloading a torrent from a URL failed.
    pub fn on_download_from_url_failed(&mut self, url: &str, reason: &str) -> Option<RequestId> {
        self.submit(templates::download_from_url_failed(url, reason))
    }

    /// Dispatch a bus event to the matching handler.
    pub fn handle_event(&mut self, event: &Event) -> Option<RequestId> {
        self.metrics.inc_event(event.kind());
        match event {
            Event::AddTorrentFailed { error } => self.on_add_torrent_failed(error),
            Event::TorrentAdded {
                torrent_id, name, ..
            } => self.on_torrent_added(&TorrentDescriptor {
                info_hash: *torrent_id,
                name: name.clone(),
            }),
            Event::TorrentFinished { torrent_id, name } => {
                self.on_torrent_finished(&TorrentDescriptor {
                    info_hash: *torrent_id,
                    name: name.clone(),
                })
            }
            Event::FullDiskError {
                torrent_id,
                name,
                message,
            } => self.on_full_disk_error(
                &TorrentDescriptor {
                    info_hash: *torrent_id,
                    name: name.clone(),
                },
                message,
            ),
            Event::DownloadFromUrlFailed { url, reason } => {
                self.on_download_from_url_failed(url, reason)
            }
            Event::FilesDiscovered { .. } | Event::TorrentRemoved { .. } => None,
        }
    }

    /// Dispatch a back-end signal.
    pub async fn handle_signal(&mut self, signal: NotifierSignal) -> Option<ActionOutcome> {
        self.metrics.inc_notifier_signal(signal.kind());
        match signal {
            NotifierSignal::ActionTriggered { id, action } => {
                Some(self.notifier_action_triggered(id, &action).await)
            }
            NotifierSignal::Closed { id, reason } => {
                self.notifier_closed(id, reason);
                None
            }
        }
    }

    /// React to the user picking `action` on request `id`.
    pub async fn notifier_action_triggered(
        &mut self,
        id: RequestId,
        action: &str,
    ) -> ActionOutcome {
        let Some(request) = self.pending.get(id) else {
            debug!(request_id = %id, action, "action for unknown request ignored");
            return ActionOutcome::UnknownRequest;
        };
        if action != OPEN_ACTION {
            debug!(request_id = %id, action, "no behaviour for action");
            return ActionOutcome::Unhandled;
        }
        let Some(info_hash) = request.torrent else {
            debug!(request_id = %id, action, "action on request without torrent ignored");
            return ActionOutcome::NoTorrent;
        };

        let snapshot = match self.inspector.get(&info_hash).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                warn!(request_id = %id, torrent = %info_hash, "torrent no longer known");
                return ActionOutcome::TorrentMissing;
            }
            Err(err) => {
                warn!(
                    request_id = %id,
                    torrent = %info_hash,
                    error = %err,
                    "torrent lookup failed"
                );
                return ActionOutcome::TorrentMissing;
            }
        };

        let target = snapshot.open_target();
        match self.open_path(&target) {
            Ok(()) => {
                info!(request_id = %id, path = %target.display(), "opened torrent payload");
                ActionOutcome::Opened(target)
            }
            Err(err) => {
                error!(
                    request_id = %id,
                    path = %target.display(),
                    error = %err,
                    "failed to open torrent payload"
                );
                ActionOutcome::OpenFailed
            }
        }
    }

    /// Forget request `id` once its notification is gone.
    pub fn notifier_closed(&mut self, id: RequestId, reason: CloseReason) {
        if self.pending.remove(id).is_some() {
            debug!(request_id = %id, reason = reason.as_str(), "notification closed");
        } else {
            debug!(request_id = %id, reason = reason.as_str(), "close for unknown request");
        }
    }

    fn open_path(&self, path: &Path) -> NotifyResult<()> {
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let url = Url::from_file_path(&absolute).map_err(|()| NotifyError::InvalidPath {
            path: absolute.display().to_string(),
        })?;
        self.opener.open(&url)
    }
}

struct PendingRequests {
    capacity: usize,
    order: VecDeque<RequestId>,
    requests: HashMap<RequestId, Arc<Request>>,
}

impl PendingRequests {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            requests: HashMap::with_capacity(capacity),
        }
    }

    fn insert(&mut self, id: RequestId, request: Arc<Request>) -> Option<RequestId> {
        let evicted = if self.order.len() >= self.capacity {
            self.order.pop_front().inspect(|oldest| {
                self.requests.remove(oldest);
            })
        } else {
            None
        };
        self.order.push_back(id);
        self.requests.insert(id, request);
        evicted
    }

    fn get(&self, id: RequestId) -> Option<Arc<Request>> {
        self.requests.get(&id).cloned()
    }

    fn remove(&mut self, id: RequestId) -> Option<Arc<Request>> {
        let removed = self.requests.remove(&id)?;
        self.order.retain(|existing| *existing != id);
        Some(removed)
    }

    fn len(&self) -> usize {
        self.requests.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_requests_evict_oldest_at_capacity() {
        let mut pending = PendingRequests::new(2);
        let ids = [RequestId::new(), RequestId::new(), RequestId::new()];
        let request = Arc::new(Request::new("t", "m"));

        assert_eq!(pending.insert(ids[0], Arc::clone(&request)), None);
        assert_eq!(pending.insert(ids[1], Arc::clone(&request)), None);
        assert_eq!(pending.insert(ids[2], Arc::clone(&request)), Some(ids[0]));

        assert!(pending.get(ids[0]).is_none());
        assert!(pending.get(ids[2]).is_some());
        assert_eq!(pending.len(), 2);
    }

    #[test]
    fn removal_frees_a_slot() {
        let mut pending = PendingRequests::new(2);
        let ids = [RequestId::new(), RequestId::new(), RequestId::new()];
        let request = Arc::new(Request::new("t", "m"));

        pending.insert(ids[0], Arc::clone(&request));
        pending.insert(ids[1], Arc::clone(&request));
        assert!(pending.remove(ids[0]).is_some());
        assert!(pending.remove(ids[0]).is_none());
        assert_eq!(pending.insert(ids[2], request), None);
        assert_eq!(pending.len(), 2);
    }
}

//! Event and signal loop driving the notification manager.
//!
//! # Design
//! - One task owns the [`Manager`]; bus events and notifier signals are
//!   handled strictly one at a time.
//! - Events update the torrent catalog before the manager sees them, so a
//!   notification action can always resolve the torrent it refers to.
//! - The loop drains ready events and signals before honouring shutdown and
//!   hands the manager back when it exits.

use std::sync::Arc;

use tidings_events::{EventBus, EventEnvelope};
use tidings_notify::{Manager, SignalReceiver};
use tidings_torrent_core::TorrentCatalog;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Collaborators owned by the orchestrator task.
pub struct OrchestratorDeps {
    /// Notification manager.
    pub manager: Manager,
    /// Signals raised by the manager's back ends.
    pub signals: SignalReceiver,
    /// Torrent catalog fed from the same event stream.
    pub catalog: Arc<TorrentCatalog>,
}

/// Spawn the orchestrator. It subscribes before returning, so every event
/// published afterwards is observed. Setting `shutdown` to `true` stops it.
#[must_use]
pub fn spawn_notification_orchestrator(
    events: &EventBus,
    deps: OrchestratorDeps,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<Manager> {
    let mut stream = events.subscribe(None);
    tokio::spawn(async move {
        let OrchestratorDeps {
            mut manager,
            mut signals,
            catalog,
        } = deps;
        info!("notification orchestrator started");
        loop {
            tokio::select! {
                biased;
                envelope = stream.next() => {
                    let Some(envelope) = envelope else {
                        debug!("event bus closed");
                        break;
                    };
                    process_envelope(&mut manager, &catalog, &envelope).await;
                }
                Some(signal) = signals.recv() => {
                    let request_id = signal.id();
                    if let Some(outcome) = manager.handle_signal(signal).await {
                        debug!(request_id = %request_id, outcome = ?outcome, "notification action handled");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("notification orchestrator stopped");
        manager
    })
}

async fn process_envelope(manager: &mut Manager, catalog: &TorrentCatalog, envelope: &EventEnvelope) {
    if let Err(err) = catalog.apply_event(&envelope.event).await {
        warn!(
            event_id = envelope.id,
            kind = envelope.event.kind(),
            error = %err,
            "failed to update torrent catalog"
        );
    }
    if let Some(request_id) = manager.handle_event(&envelope.event) {
        debug!(
            event_id = envelope.id,
            kind = envelope.event.kind(),
            request_id = %request_id,
            "notification submitted"
        );
    }
}

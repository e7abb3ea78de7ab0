//! Broadcast bus carrying engine events to subscribers.
//!
//! # Design
//! - `tokio::broadcast` fans events out; a bounded replay ring lets a
//!   subscriber resume from the last id it saw.
//! - A lagging subscriber refills its gap from the replay ring and logs how
//!   many events, if any, had already been evicted.
//! - Publishers that must not lose events call [`EventBus::wait_for_room`]
//!   first; it parks until every subscriber has room for one more event.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::Notify;
use tokio::sync::broadcast::{self, Sender};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::warn;

use crate::payloads::{DEFAULT_REPLAY_CAPACITY, Event, EventEnvelope, EventId};

type ReplayRing = Arc<Mutex<VecDeque<EventEnvelope>>>;

/// Shared event bus built on top of `tokio::broadcast`.
#[derive(Clone)]
pub struct EventBus {
    sender: Sender<EventEnvelope>,
    replay: ReplayRing,
    replay_capacity: usize,
    next_id: Arc<AtomicU64>,
    progress: Arc<Notify>,
}

impl EventBus {
    /// Construct a bus whose broadcast channel and replay ring hold `capacity` events.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "event bus capacity must be positive");
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            replay: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            replay_capacity: capacity,
            next_id: Arc::new(AtomicU64::new(1)),
            progress: Arc::new(Notify::new()),
        }
    }

    /// Construct a bus with the default replay capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPLAY_CAPACITY)
    }

    /// Publish an event, returning the identifier assigned to it.
    pub fn publish(&self, event: Event) -> EventId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let envelope = EventEnvelope {
            id,
            timestamp: Utc::now(),
            event,
        };
        {
            let mut replay = lock_ring(&self.replay);
            if replay.len() == self.replay_capacity {
                let _ = replay.pop_front();
            }
            replay.push_back(envelope.clone());
        }
        // No live subscribers is not an error; the replay ring still has the event.
        let _ = self.sender.send(envelope);
        id
    }

    /// Number of published events not yet received by every live subscriber.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.sender.len()
    }

    /// Wait until the slowest live subscriber has room for another event.
    ///
    /// Returns immediately when nobody is subscribed.
    pub async fn wait_for_room(&self) {
        loop {
            let progressed = self.progress.notified();
            if self.sender.len() < self.replay_capacity {
                return;
            }
            progressed.await;
        }
    }

    /// Subscribe to live events, first replaying buffered events newer than `since`.
    #[must_use]
    pub fn subscribe(&self, since: Option<EventId>) -> EventStream {
        // Subscribe before snapshotting the ring so nothing published in between is lost.
        let receiver = self.sender.subscribe();
        let backlog: VecDeque<EventEnvelope> = since.map_or_else(VecDeque::new, |id| {
            self.backlog_since(id).into_iter().collect()
        });
        let replayed_up_to = backlog.back().map(|env| env.id);
        let last_seen = replayed_up_to
            .or(since)
            .or_else(|| self.last_event_id())
            .unwrap_or(0);
        EventStream {
            backlog,
            replayed_up_to,
            last_seen,
            replay: Arc::clone(&self.replay),
            live: BroadcastStream::new(receiver),
            progress: ProgressSignal(Arc::clone(&self.progress)),
        }
    }

    /// Last event id held in the replay ring.
    #[must_use]
    pub fn last_event_id(&self) -> Option<EventId> {
        lock_ring(&self.replay).back().map(|env| env.id)
    }

    /// Buffered events emitted after `id`, oldest first.
    #[must_use]
    pub fn backlog_since(&self, id: EventId) -> Vec<EventEnvelope> {
        ring_since(&self.replay, id)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_ring(ring: &ReplayRing) -> MutexGuard<'_, VecDeque<EventEnvelope>> {
    ring.lock().unwrap_or_else(PoisonError::into_inner)
}

fn ring_since(ring: &ReplayRing, id: EventId) -> Vec<EventEnvelope> {
    lock_ring(ring)
        .iter()
        .filter(|env| env.id > id)
        .cloned()
        .collect()
}

/// Subscriber handle yielding replayed events first, then live ones.
pub struct EventStream {
    backlog: VecDeque<EventEnvelope>,
    replayed_up_to: Option<EventId>,
    last_seen: EventId,
    replay: ReplayRing,
    live: BroadcastStream<EventEnvelope>,
    // Declared after `live`: wakes publishers once the receiver has released its slots.
    progress: ProgressSignal,
}

struct ProgressSignal(Arc<Notify>);

impl Drop for ProgressSignal {
    fn drop(&mut self) {
        self.0.notify_waiters();
    }
}

impl EventStream {
    /// Receive the next event; `None` once the bus has been dropped.
    ///
    /// A lagged gap is refilled from the replay ring. Live events already
    /// delivered from a replayed backlog are filtered out.
    pub async fn next(&mut self) -> Option<EventEnvelope> {
        loop {
            if let Some(envelope) = self.backlog.pop_front() {
                self.last_seen = envelope.id;
                return Some(envelope);
            }

            let item = self.live.next().await;
            self.progress.0.notify_waiters();
            match item? {
                Ok(envelope) => {
                    if self.replayed_up_to.is_some_and(|last| envelope.id <= last) {
                        continue;
                    }
                    self.last_seen = envelope.id;
                    return Some(envelope);
                }
                Err(BroadcastStreamRecvError::Lagged(skipped)) => self.refill(skipped),
            }
        }
    }

    fn refill(&mut self, skipped: u64) {
        let recovered = ring_since(&self.replay, self.last_seen);
        let lost = recovered
            .first()
            .map_or(skipped, |env| env.id.saturating_sub(self.last_seen + 1));
        warn!(
            skipped,
            recovered = recovered.len(),
            lost,
            last_seen = self.last_seen,
            "event subscriber lagged"
        );
        if let Some(last) = recovered.last() {
            self.replayed_up_to = Some(last.id);
        }
        self.backlog.extend(recovered);
    }
}

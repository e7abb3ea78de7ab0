use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tidings_config::{Preferences, SettingsStorage};
use tidings_events::{Event, InfoHash};
use tidings_notify::{
    ActionOutcome, Category, CloseReason, DEFAULT_ACTION, Manager, NoopNotifier, Notification,
    Notifier, NotifierProvider, NotifierRegistry, NotifierSignal, NotifierSignals, NotifyResult,
    OPEN_ACTION, Platform, Request, Severity, SignalReceiver, Timeout, Urgency, UrlOpener,
};
use tidings_telemetry::Metrics;
use tidings_torrent_core::{TorrentCatalog, TorrentFile, TorrentSnapshot};
use url::Url;

#[derive(Default)]
struct RecordingNotifier {
    shown: Mutex<Vec<(Notification, NotifierSignals)>>,
}

impl RecordingNotifier {
    fn shown(&self) -> Vec<Notification> {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(notification, _)| notification.clone())
            .collect()
    }

    fn signals_for(&self, index: usize) -> Option<(Notification, NotifierSignals)> {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(index)
            .cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn show_notification(&self, notification: &Notification, signals: NotifierSignals) {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((notification.clone(), signals));
    }
}

#[derive(Default)]
struct RecordingOpener {
    opened: Mutex<Vec<Url>>,
}

impl RecordingOpener {
    fn opened(&self) -> Vec<Url> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl UrlOpener for RecordingOpener {
    fn open(&self, url: &Url) -> NotifyResult<()> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.clone());
        Ok(())
    }
}

struct FixedProvider {
    name: &'static str,
    supported: bool,
    notifier: Arc<dyn Notifier>,
}

impl NotifierProvider for FixedProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(&self) -> NotifyResult<Arc<dyn Notifier>> {
        Ok(Arc::clone(&self.notifier))
    }
}

struct TestPlatform {
    bus_supported: Arc<Mutex<bool>>,
    bus: Arc<RecordingNotifier>,
    opener: Arc<RecordingOpener>,
}

impl Platform for TestPlatform {
    fn name(&self) -> &'static str {
        "test"
    }

    fn registry(&self, _preferences: &Preferences) -> NotifierRegistry {
        let supported = *self
            .bus_supported
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        NotifierRegistry::new().with_provider(FixedProvider {
            name: "dbus",
            supported,
            notifier: self.bus.clone(),
        })
    }

    fn opener(&self) -> Arc<dyn UrlOpener> {
        self.opener.clone()
    }
}

struct Harness {
    manager: Manager,
    _signals: SignalReceiver,
    bus: Arc<RecordingNotifier>,
    bus_supported: Arc<Mutex<bool>>,
    opener: Arc<RecordingOpener>,
    catalog: Arc<TorrentCatalog>,
    preferences: Preferences,
    metrics: Metrics,
}

fn harness() -> anyhow::Result<Harness> {
    let preferences = Preferences::new(SettingsStorage::in_memory());
    let bus = Arc::new(RecordingNotifier::default());
    let bus_supported = Arc::new(Mutex::new(true));
    let opener = Arc::new(RecordingOpener::default());
    let catalog = Arc::new(TorrentCatalog::new());
    let metrics = Metrics::new()?;
    let platform = Arc::new(TestPlatform {
        bus_supported: Arc::clone(&bus_supported),
        bus: Arc::clone(&bus),
        opener: Arc::clone(&opener),
    });
    let (manager, signals) = Manager::new(
        preferences.clone(),
        platform,
        catalog.clone(),
        metrics.clone(),
    );
    Ok(Harness {
        manager,
        _signals: signals,
        bus,
        bus_supported,
        opener,
        catalog,
        preferences,
        metrics,
    })
}

fn hash(byte: u8) -> InfoHash {
    InfoHash::V1([byte; 20])
}

async fn finished_single_file(harness: &Harness, save_path: PathBuf) {
    harness
        .catalog
        .upsert(TorrentSnapshot {
            info_hash: hash(1),
            name: "movie.mkv".into(),
            save_path: save_path.clone(),
            root_path: save_path.join("movie.mkv"),
            files: vec![TorrentFile {
                path: "movie.mkv".into(),
                size_bytes: 4_096,
            }],
        })
        .await;
}

#[tokio::test]
async fn events_map_to_classified_requests() -> anyhow::Result<()> {
    let mut harness = harness()?;
    harness.preferences.set_torrent_added_notifications_enabled(true);
    let events = [
        Event::AddTorrentFailed {
            error: "bad bencode".into(),
        },
        Event::TorrentAdded {
            torrent_id: hash(2),
            name: "X".into(),
            save_path: "/srv".into(),
            root_path: "/srv/X".into(),
        },
        Event::TorrentFinished {
            torrent_id: hash(2),
            name: "X".into(),
        },
        Event::FullDiskError {
            torrent_id: hash(2),
            name: "X".into(),
            message: "disk full".into(),
        },
        Event::DownloadFromUrlFailed {
            url: "http://host/x.torrent".into(),
            reason: "404".into(),
        },
        Event::TorrentRemoved {
            torrent_id: hash(2),
        },
    ];
    for event in &events {
        harness.manager.handle_event(event);
    }

    let expected = [
        ("Error", Category::Generic, Severity::Error, Urgency::High, Timeout::Never),
        (
            "Torrent added",
            Category::Download,
            Severity::Information,
            Urgency::Normal,
            Timeout::Default,
        ),
        (
            "Download completion",
            Category::Download,
            Severity::Information,
            Urgency::Normal,
            Timeout::Never,
        ),
        ("I/O Error", Category::Download, Severity::Error, Urgency::High, Timeout::Never),
        (
            "Url download error",
            Category::Download,
            Severity::Error,
            Urgency::High,
            Timeout::Never,
        ),
    ];
    let shown = harness.bus.shown();
    assert_eq!(shown.len(), expected.len());
    for (notification, (title, category, severity, urgency, timeout)) in
        shown.iter().zip(expected)
    {
        let request = notification.request();
        assert_eq!(request.title, title);
        assert_eq!(request.category, category, "{title}");
        assert_eq!(request.severity, severity, "{title}");
        assert_eq!(request.urgency, urgency, "{title}");
        assert_eq!(request.timeout, timeout, "{title}");
    }
    assert_eq!(harness.metrics.snapshot().notifications_submitted_total, 5);
    Ok(())
}

#[tokio::test]
async fn torrent_added_requires_opt_in() -> anyhow::Result<()> {
    let mut harness = harness()?;
    let event = Event::TorrentAdded {
        torrent_id: hash(3),
        name: "quiet".into(),
        save_path: "/srv".into(),
        root_path: "/srv/quiet".into(),
    };
    assert!(harness.manager.handle_event(&event).is_none());
    assert!(harness.bus.shown().is_empty());
    Ok(())
}

#[tokio::test]
async fn disabled_notifications_reach_no_notifier() -> anyhow::Result<()> {
    let mut harness = harness()?;
    harness.manager.set_notifications_enabled(false);
    assert!(!harness.manager.are_notifications_enabled());

    assert!(harness.manager.on_add_torrent_failed("nope").is_none());
    assert!(
        harness
            .manager
            .submit(Request::new("manual", "message"))
            .is_none()
    );
    assert!(harness.bus.shown().is_empty());
    assert_eq!(harness.manager.pending_len(), 0);
    assert_eq!(harness.metrics.snapshot().notifications_suppressed_total, 2);
    Ok(())
}

#[tokio::test]
async fn finished_single_file_torrent_opens_the_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut harness = harness()?;
    finished_single_file(&harness, dir.path().to_path_buf()).await;

    let id = harness
        .manager
        .handle_event(&Event::TorrentFinished {
            torrent_id: hash(1),
            name: "movie.mkv".into(),
        })
        .ok_or_else(|| anyhow::anyhow!("request should be submitted"))?;

    let shown = harness.bus.shown();
    let request = shown[0].request();
    assert_eq!(request.category, Category::Download);
    assert_eq!(request.severity, Severity::Information);
    let actions: Vec<&str> = request.actions.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(actions, vec![OPEN_ACTION, DEFAULT_ACTION]);

    let expected = dir.path().join("movie.mkv");
    let outcome = harness
        .manager
        .notifier_action_triggered(id, OPEN_ACTION)
        .await;
    assert_eq!(outcome, ActionOutcome::Opened(expected.clone()));
    let url = Url::from_file_path(&expected)
        .map_err(|()| anyhow::anyhow!("temp path should be absolute"))?;
    assert_eq!(harness.opener.opened(), vec![url]);
    Ok(())
}

#[tokio::test]
async fn multi_file_torrent_opens_the_root_directory() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path().join("season");
    let mut harness = harness()?;
    harness
        .catalog
        .upsert(TorrentSnapshot {
            info_hash: hash(4),
            name: "season".into(),
            save_path: dir.path().to_path_buf(),
            root_path: root.clone(),
            files: vec![
                TorrentFile {
                    path: "season/e01.mkv".into(),
                    size_bytes: 1,
                },
                TorrentFile {
                    path: "season/e02.mkv".into(),
                    size_bytes: 1,
                },
            ],
        })
        .await;

    let id = harness
        .manager
        .handle_event(&Event::TorrentFinished {
            torrent_id: hash(4),
            name: "season".into(),
        })
        .ok_or_else(|| anyhow::anyhow!("request should be submitted"))?;
    let outcome = harness
        .manager
        .handle_signal(NotifierSignal::ActionTriggered {
            id,
            action: OPEN_ACTION.into(),
        })
        .await;

    assert_eq!(outcome, Some(ActionOutcome::Opened(root.clone())));
    let url =
        Url::from_file_path(&root).map_err(|()| anyhow::anyhow!("temp path should be absolute"))?;
    assert_eq!(harness.opener.opened(), vec![url]);
    Ok(())
}

#[tokio::test]
async fn unknown_actions_and_requests_have_no_side_effects() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut harness = harness()?;
    finished_single_file(&harness, dir.path().to_path_buf()).await;
    let id = harness
        .manager
        .on_torrent_finished(&tidings_torrent_core::TorrentDescriptor {
            info_hash: hash(1),
            name: "movie.mkv".into(),
        })
        .ok_or_else(|| anyhow::anyhow!("request should be submitted"))?;

    assert_eq!(
        harness.manager.notifier_action_triggered(id, "explode").await,
        ActionOutcome::Unhandled
    );
    assert_eq!(
        harness
            .manager
            .notifier_action_triggered(id, DEFAULT_ACTION)
            .await,
        ActionOutcome::Unhandled
    );
    assert_eq!(
        harness
            .manager
            .notifier_action_triggered(tidings_notify::RequestId::new(), OPEN_ACTION)
            .await,
        ActionOutcome::UnknownRequest
    );
    assert!(harness.opener.opened().is_empty());
    Ok(())
}

#[tokio::test]
async fn actions_on_requests_without_live_torrents_are_ignored() -> anyhow::Result<()> {
    let mut harness = harness()?;
    let generic = harness
        .manager
        .submit(Request::new("hello", "world").with_action(OPEN_ACTION, "Open"))
        .ok_or_else(|| anyhow::anyhow!("request should be submitted"))?;
    assert_eq!(
        harness
            .manager
            .notifier_action_triggered(generic, OPEN_ACTION)
            .await,
        ActionOutcome::NoTorrent
    );

    let gone = harness
        .manager
        .handle_event(&Event::TorrentFinished {
            torrent_id: hash(9),
            name: "gone".into(),
        })
        .ok_or_else(|| anyhow::anyhow!("request should be submitted"))?;
    assert_eq!(
        harness.manager.notifier_action_triggered(gone, OPEN_ACTION).await,
        ActionOutcome::TorrentMissing
    );
    assert!(harness.opener.opened().is_empty());
    Ok(())
}

#[tokio::test]
async fn closed_signals_release_correlation_entries() -> anyhow::Result<()> {
    let mut harness = harness()?;
    let id = harness
        .manager
        .submit(Request::new("t", "m").with_user_data(serde_json::json!({"k": 1})))
        .ok_or_else(|| anyhow::anyhow!("request should be submitted"))?;
    let carried = harness
        .manager
        .pending_request(id)
        .and_then(|request| request.user_data.clone());
    assert_eq!(carried, Some(serde_json::json!({"k": 1})));

    let outcome = harness
        .manager
        .handle_signal(NotifierSignal::Closed {
            id,
            reason: CloseReason::Dismissed,
        })
        .await;
    assert!(outcome.is_none());
    assert_eq!(harness.manager.pending_len(), 0);
    assert_eq!(
        harness.manager.notifier_action_triggered(id, OPEN_ACTION).await,
        ActionOutcome::UnknownRequest
    );
    Ok(())
}

#[tokio::test]
async fn back_end_signals_flow_through_the_receiver() -> anyhow::Result<()> {
    let preferences = Preferences::new(SettingsStorage::in_memory());
    let bus = Arc::new(RecordingNotifier::default());
    let platform = Arc::new(TestPlatform {
        bus_supported: Arc::new(Mutex::new(true)),
        bus: Arc::clone(&bus),
        opener: Arc::new(RecordingOpener::default()),
    });
    let (mut manager, mut receiver) = Manager::new(
        preferences,
        platform,
        Arc::new(TorrentCatalog::new()),
        Metrics::new()?,
    );
    let id = manager
        .submit(Request::new("t", "m"))
        .ok_or_else(|| anyhow::anyhow!("request should be submitted"))?;

    let (notification, signals) = bus
        .signals_for(0)
        .ok_or_else(|| anyhow::anyhow!("notification should be shown"))?;
    assert_eq!(notification.id(), id);
    signals.closed(id, CloseReason::Expired);

    let signal = receiver
        .recv()
        .await
        .ok_or_else(|| anyhow::anyhow!("signal expected"))?;
    assert_eq!(
        signal,
        NotifierSignal::Closed {
            id,
            reason: CloseReason::Expired
        }
    );
    manager.handle_signal(signal).await;
    assert_eq!(manager.pending_len(), 0);
    Ok(())
}

#[tokio::test]
async fn reset_notifier_follows_registry_or_explicit_choice() -> anyhow::Result<()> {
    let mut harness = harness()?;
    assert_eq!(harness.manager.notifier().name(), "recording");

    *harness
        .bus_supported
        .lock()
        .unwrap_or_else(PoisonError::into_inner) = false;
    harness.manager.reset_notifier(None);
    assert_eq!(harness.manager.notifier().name(), NoopNotifier::NAME);

    *harness
        .bus_supported
        .lock()
        .unwrap_or_else(PoisonError::into_inner) = true;
    harness.manager.reset_notifier(None);
    let bus: Arc<dyn Notifier> = harness.bus.clone();
    assert!(Arc::ptr_eq(harness.manager.notifier(), &bus));

    let explicit: Arc<dyn Notifier> = Arc::new(RecordingNotifier::default());
    harness.manager.reset_notifier(Some(Arc::clone(&explicit)));
    assert!(Arc::ptr_eq(harness.manager.notifier(), &explicit));
    Ok(())
}

#[tokio::test]
async fn late_signals_resolve_after_a_reset() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut harness = harness()?;
    finished_single_file(&harness, dir.path().to_path_buf()).await;
    let id = harness
        .manager
        .handle_event(&Event::TorrentFinished {
            torrent_id: hash(1),
            name: "movie.mkv".into(),
        })
        .ok_or_else(|| anyhow::anyhow!("request should be submitted"))?;

    harness
        .manager
        .reset_notifier(Some(Arc::new(NoopNotifier)));
    let outcome = harness
        .manager
        .notifier_action_triggered(id, OPEN_ACTION)
        .await;
    assert_eq!(outcome, ActionOutcome::Opened(dir.path().join("movie.mkv")));
    Ok(())
}

//! Environment loading and service wiring for the `tidings` binary.
//!
//! # Design
//! - `from_env` resolves every collaborator from the process environment;
//!   `run_app_with` only consumes injected dependencies so tests can drive the
//!   whole boot sequence with in-memory settings and a byte-slice feed.
//! - Logging is installed once in `run_app`, before anything else logs.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use directories::ProjectDirs;
use tidings_config::{Preferences, SettingsStorage};
use tidings_events::EventBus;
use tidings_icons::{FreedesktopIconTheme, IconProvider};
use tidings_notify::{HeadlessPlatform, Manager, Platform};
use tidings_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig, Metrics};
use tidings_torrent_core::{TorrentCatalog, TorrentInspector};
use tokio::io::{AsyncBufRead, BufReader};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::feed::pump_events;
use crate::orchestrator::{OrchestratorDeps, spawn_notification_orchestrator};

const LOG_FORMAT_ENV: &str = "TIDINGS_LOG_FORMAT";
const ICON_ROOT_ENV: &str = "TIDINGS_ICON_ROOT";
const ICON_THEME_ENV: &str = "TIDINGS_ICON_THEME";
const DEFAULT_ICON_THEME: &str = "hicolor";
const APP_ICON_ID: &str = "tidings";

/// Dependencies required to bootstrap the notification service.
pub struct BootstrapDependencies {
    /// Subscriber configuration applied by [`run_app`].
    pub logging: LoggingConfig<'static>,
    /// Persistent settings store.
    pub storage: SettingsStorage,
    /// Bus the engine feed publishes into.
    pub events: EventBus,
    /// Torrent metadata used to resolve notification actions.
    pub catalog: Arc<TorrentCatalog>,
    /// Icon lookup shared with the notification back ends.
    pub icons: Arc<IconProvider>,
    /// Metrics registry.
    pub metrics: Metrics,
    /// Platform variant supplying back ends and the URL opener.
    pub platform: Arc<dyn Platform>,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be read or the metrics
    /// registry cannot be built.
    pub fn from_env() -> AppResult<Self> {
        let logging = LoggingConfig {
            format: env::var(LOG_FORMAT_ENV)
                .map_or_else(|_| LogFormat::infer(), |name| LogFormat::from_name(&name)),
            build_sha: option_env!("TIDINGS_BUILD_SHA").unwrap_or("dev"),
            ..LoggingConfig::default()
        };

        let storage = match SettingsStorage::default_path() {
            Some(path) => SettingsStorage::open(path)
                .map_err(|err| AppError::config("settings.open", err))?,
            None => SettingsStorage::in_memory(),
        };

        let dirs = ProjectDirs::from("org", "tidings", "tidings");
        let bundled_root = env::var_os(ICON_ROOT_ENV).map_or_else(
            || {
                dirs.as_ref().map_or_else(
                    || PathBuf::from("icons"),
                    |dirs| dirs.data_dir().join("icons"),
                )
            },
            PathBuf::from,
        );
        let cache_dir = dirs.as_ref().map_or_else(
            || env::temp_dir().join("tidings-icons"),
            |dirs| dirs.cache_dir().join("icons"),
        );
        let theme_name =
            env::var(ICON_THEME_ENV).unwrap_or_else(|_| DEFAULT_ICON_THEME.to_string());
        let icons = Arc::new(IconProvider::new(
            bundled_root,
            cache_dir,
            Arc::new(FreedesktopIconTheme::new(theme_name)),
        ));
        icons.configure(&Preferences::new(storage.clone()));

        let metrics = Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
        let platform = HeadlessPlatform::new()
            .with_app_icon(icons.icon_path(APP_ICON_ID).display().to_string());

        Ok(Self {
            logging,
            storage,
            events: EventBus::new(),
            catalog: Arc::new(TorrentCatalog::new()),
            icons,
            metrics,
            platform: Arc::new(platform),
        })
    }
}

/// Entry point for the `tidings` binary: install logging, then serve the
/// engine event feed read from standard input.
///
/// # Errors
///
/// Returns an error if dependency construction, logging setup or the
/// service run fails.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    tidings_telemetry::init_logging(&dependencies.logging)
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    run_app_with(dependencies, BufReader::new(tokio::io::stdin())).await
}

/// Boot sequence over injected dependencies. Runs until `input` is exhausted
/// or Ctrl-C is received, then drains the orchestrator and flushes settings.
///
/// # Errors
///
/// Returns an error if reading the feed fails, the orchestrator task panics,
/// or the settings cannot be written back.
pub async fn run_app_with<R>(dependencies: BootstrapDependencies, input: R) -> AppResult<()>
where
    R: AsyncBufRead + Unpin + Send,
{
    let BootstrapDependencies {
        logging: _,
        storage,
        events,
        catalog,
        icons,
        metrics,
        platform,
    } = dependencies;
    let _context = GlobalContextGuard::new(platform.name());
    info!("tidings starting");

    let preferences = Preferences::new(storage.clone());
    let icon_watch = icons.spawn_preference_watch(preferences.clone());

    let inspector: Arc<dyn TorrentInspector> = catalog.clone();
    let (manager, signals) = Manager::new(preferences, platform, inspector, metrics.clone());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let orchestrator = spawn_notification_orchestrator(
        &events,
        OrchestratorDeps {
            manager,
            signals,
            catalog,
        },
        shutdown_rx,
    );

    let feed_result = tokio::select! {
        result = pump_events(input, &events) => result.map(|published| {
            info!(published, "event feed exhausted");
        }),
        signal = tokio::signal::ctrl_c() => {
            if let Err(err) = signal {
                warn!(error = %err, "failed to listen for Ctrl-C");
            }
            info!("interrupt received");
            Ok(())
        }
    };

    let _ = shutdown_tx.send(true);
    let manager = orchestrator.await.map_err(|source| AppError::Task {
        task: "notification_orchestrator",
        source,
    })?;
    icon_watch.abort();
    drop(manager);

    storage
        .flush()
        .map_err(|err| AppError::config("settings.flush", err))?;

    let snapshot = metrics.snapshot();
    info!(
        notifications_submitted = snapshot.notifications_submitted_total,
        notifications_suppressed = snapshot.notifications_suppressed_total,
        "tidings stopped"
    );
    feed_result
}

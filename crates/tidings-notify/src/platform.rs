//! Headless and GUI platform variants.
//!
//! # Design
//! - A variant supplies the back-end registry the manager resolves against and
//!   the one URL opener actions may use.
//! - The headless variant only offers the D-Bus back end while notifications
//!   are enabled; the GUI variant prefers D-Bus, then the tray.

use std::sync::Arc;

use tidings_config::Preferences;

use crate::backends::{DBusNotifierProvider, SystemTrayNotifierProvider, TrayIcon};
use crate::opener::{DesktopOpener, DesktopServices, ProcessOpener, UrlOpener};
use crate::registry::NotifierRegistry;

/// Application name announced to desktop notification services.
pub const APP_NAME: &str = "tidings";

/// Platform-specific collaborators of the notification manager.
pub trait Platform: Send + Sync {
    /// Variant name for logs (`headless`, `gui`).
    fn name(&self) -> &'static str;

    /// Back-end providers in priority order for the current preferences.
    fn registry(&self, preferences: &Preferences) -> NotifierRegistry;

    /// Side-effect primitive used by notification actions.
    fn opener(&self) -> Arc<dyn UrlOpener>;
}

/// Daemon build without a toolkit.
#[derive(Clone)]
pub struct HeadlessPlatform {
    opener: Arc<dyn UrlOpener>,
    dbus: DBusNotifierProvider,
}

impl HeadlessPlatform {
    /// Headless variant using the platform's opener process.
    #[must_use]
    pub fn new() -> Self {
        Self::with_opener(Arc::new(ProcessOpener::platform_default()))
    }

    /// Headless variant using a custom opener.
    #[must_use]
    pub fn with_opener(opener: Arc<dyn UrlOpener>) -> Self {
        Self {
            opener,
            dbus: DBusNotifierProvider::new(APP_NAME, None),
        }
    }

    /// Application icon (path or theme name) shown by the D-Bus back end.
    #[must_use]
    pub fn with_app_icon(mut self, icon: impl Into<String>) -> Self {
        self.dbus = DBusNotifierProvider::new(APP_NAME, Some(icon.into()));
        self
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for HeadlessPlatform {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn registry(&self, preferences: &Preferences) -> NotifierRegistry {
        let registry = NotifierRegistry::new();
        if preferences.notifications_enabled() {
            registry.with_provider(self.dbus.clone())
        } else {
            registry
        }
    }

    fn opener(&self) -> Arc<dyn UrlOpener> {
        Arc::clone(&self.opener)
    }
}

/// Desktop build backed by a GUI toolkit.
#[derive(Clone)]
pub struct GuiPlatform {
    tray: Arc<dyn TrayIcon>,
    desktop: Arc<dyn DesktopServices>,
    app_icon: Option<String>,
}

impl GuiPlatform {
    /// GUI variant over the toolkit's tray icon and desktop services.
    #[must_use]
    pub fn new(tray: Arc<dyn TrayIcon>, desktop: Arc<dyn DesktopServices>) -> Self {
        Self {
            tray,
            desktop,
            app_icon: None,
        }
    }

    /// Application icon shown by the D-Bus back end.
    #[must_use]
    pub fn with_app_icon(mut self, icon: impl Into<String>) -> Self {
        self.app_icon = Some(icon.into());
        self
    }
}

impl Platform for GuiPlatform {
    fn name(&self) -> &'static str {
        "gui"
    }

    fn registry(&self, _preferences: &Preferences) -> NotifierRegistry {
        NotifierRegistry::new()
            .with_provider(DBusNotifierProvider::new(APP_NAME, self.app_icon.clone()))
            .with_provider(SystemTrayNotifierProvider::new(Arc::clone(&self.tray)))
    }

    fn opener(&self) -> Arc<dyn UrlOpener> {
        Arc::new(DesktopOpener::new(Arc::clone(&self.desktop)))
    }
}

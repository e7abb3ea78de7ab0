//! Typed accessors over the well-known settings keys.

use crate::storage::{SettingsStorage, SettingsWatcher};

/// Settings keys owned by the notification, icon, and network layers.
pub mod keys {
    /// Global notification switch.
    pub const NOTIFICATIONS_ENABLED: &str = "Notifications/Enabled";
    /// Opt-in notification when a torrent is added.
    pub const NOTIFICATIONS_TORRENT_ADDED: &str = "Notifications/TorrentAdded";
    /// Prefer the desktop icon theme over bundled icons.
    pub const USE_SYSTEM_ICON_THEME: &str = "Preferences/Advanced/useSystemIconTheme";
    /// UPnP / NAT-PMP port forwarding switch.
    pub const PORT_FORWARDING_ENABLED: &str = "Network/PortForwardingEnabled";
}

/// Typed facade over [`SettingsStorage`].
#[derive(Clone)]
pub struct Preferences {
    storage: SettingsStorage,
}

impl Preferences {
    /// Wrap a settings store.
    #[must_use]
    pub const fn new(storage: SettingsStorage) -> Self {
        Self { storage }
    }

    /// Underlying store.
    #[must_use]
    pub const fn storage(&self) -> &SettingsStorage {
        &self.storage
    }

    /// Subscribe to changes of any preference.
    #[must_use]
    pub fn subscribe(&self) -> SettingsWatcher {
        self.storage.subscribe()
    }

    /// Whether notifications are shown at all. Defaults to `true`.
    #[must_use]
    pub fn notifications_enabled(&self) -> bool {
        self.storage.load_bool(keys::NOTIFICATIONS_ENABLED, true)
    }

    /// Persist the global notification switch.
    pub fn set_notifications_enabled(&self, enabled: bool) {
        self.storage.store_value(keys::NOTIFICATIONS_ENABLED, enabled);
    }

    /// Whether adding a torrent raises a notification. Defaults to `false`.
    #[must_use]
    pub fn torrent_added_notifications_enabled(&self) -> bool {
        self.storage
            .load_bool(keys::NOTIFICATIONS_TORRENT_ADDED, false)
    }

    /// Persist the torrent-added notification switch.
    pub fn set_torrent_added_notifications_enabled(&self, enabled: bool) {
        self.storage
            .store_value(keys::NOTIFICATIONS_TORRENT_ADDED, enabled);
    }

    /// Whether icons come from the desktop theme. Defaults to `true`.
    #[must_use]
    pub fn use_system_icon_theme(&self) -> bool {
        self.storage.load_bool(keys::USE_SYSTEM_ICON_THEME, true)
    }

    /// Persist the icon theme preference.
    pub fn set_use_system_icon_theme(&self, enabled: bool) {
        self.storage.store_value(keys::USE_SYSTEM_ICON_THEME, enabled);
    }

    /// Whether UPnP / NAT-PMP forwarding is requested. Defaults to `true`.
    #[must_use]
    pub fn port_forwarding_enabled(&self) -> bool {
        self.storage.load_bool(keys::PORT_FORWARDING_ENABLED, true)
    }

    /// Persist the port forwarding switch.
    pub fn set_port_forwarding_enabled(&self, enabled: bool) {
        self.storage
            .store_value(keys::PORT_FORWARDING_ENABLED, enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_client_behaviour() {
        let preferences = Preferences::new(SettingsStorage::in_memory());
        assert!(preferences.notifications_enabled());
        assert!(!preferences.torrent_added_notifications_enabled());
        assert!(preferences.use_system_icon_theme());
        assert!(preferences.port_forwarding_enabled());
    }

    #[test]
    fn setters_write_through_to_storage() {
        let preferences = Preferences::new(SettingsStorage::in_memory());
        preferences.set_notifications_enabled(false);
        preferences.set_torrent_added_notifications_enabled(true);
        preferences.set_use_system_icon_theme(false);
        preferences.set_port_forwarding_enabled(false);

        assert!(!preferences.notifications_enabled());
        assert!(preferences.torrent_added_notifications_enabled());
        assert!(!preferences.use_system_icon_theme());
        assert!(!preferences.port_forwarding_enabled());
        assert_eq!(
            preferences
                .storage()
                .load_value(keys::NOTIFICATIONS_ENABLED),
            Some(serde_json::Value::Bool(false))
        );
        assert_eq!(preferences.storage().revision(), 4);
    }
}

use tidings_config::{ConfigError, Preferences, SettingsStorage, keys};

#[test]
fn settings_survive_flush_and_reopen() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("settings.json");

    let storage = SettingsStorage::open(&path)?;
    let preferences = Preferences::new(storage.clone());
    preferences.set_notifications_enabled(false);
    preferences.set_use_system_icon_theme(false);
    storage.flush()?;
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    let reopened = Preferences::new(SettingsStorage::open(&path)?);
    assert!(!reopened.notifications_enabled());
    assert!(!reopened.use_system_icon_theme());
    assert!(reopened.port_forwarding_enabled());
    Ok(())
}

#[test]
fn dropping_last_handle_flushes_pending_writes() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("settings.json");

    {
        let storage = SettingsStorage::open(&path)?;
        storage.store_value(keys::NOTIFICATIONS_TORRENT_ADDED, true);
    }

    let reopened = Preferences::new(SettingsStorage::open(&path)?);
    assert!(reopened.torrent_added_notifications_enabled());
    Ok(())
}

#[test]
fn string_booleans_from_legacy_files_are_honoured() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{"Notifications/Enabled": "false"}"#)?;

    let preferences = Preferences::new(SettingsStorage::open(&path)?);
    assert!(!preferences.notifications_enabled());
    Ok(())
}

#[test]
fn malformed_files_are_rejected() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "{not json")?;
    assert!(matches!(
        SettingsStorage::open(&broken),
        Err(ConfigError::Json {
            operation: "settings.parse",
            ..
        })
    ));

    let array = dir.path().join("array.json");
    std::fs::write(&array, "[1, 2]")?;
    assert!(matches!(
        SettingsStorage::open(&array),
        Err(ConfigError::NotAnObject { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn preference_watchers_see_every_effective_change() {
    let preferences = Preferences::new(SettingsStorage::in_memory());
    let mut watcher = preferences.subscribe();

    preferences.set_notifications_enabled(false);
    assert_eq!(watcher.changed().await, Some(1));

    preferences.set_notifications_enabled(false);
    preferences.set_port_forwarding_enabled(false);
    assert_eq!(watcher.changed().await, Some(2));
}

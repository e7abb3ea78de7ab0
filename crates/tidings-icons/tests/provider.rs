use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tidings_config::{Preferences, SettingsStorage};
use tidings_icons::{Icon, IconProvider, IconResult, IconTheme, THEME_ICON_SIZE};

#[derive(Default)]
struct CountingTheme {
    loads: AtomicUsize,
}

impl IconTheme for CountingTheme {
    fn is_available(&self) -> bool {
        true
    }

    fn load_png(&self, id: &str, size: u32) -> IconResult<Option<Vec<u8>>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        assert_eq!(size, THEME_ICON_SIZE);
        Ok((id == "known").then(|| b"png".to_vec()))
    }
}

#[test]
fn theme_icons_are_rendered_once_into_the_cache() -> anyhow::Result<()> {
    let bundled = tempfile::tempdir()?;
    let cache = tempfile::tempdir()?;
    let theme = Arc::new(CountingTheme::default());
    let provider = IconProvider::new(bundled.path(), cache.path().join("icons"), theme.clone());

    let first = provider.icon_path("known");
    let second = provider.icon_path("known");

    assert_eq!(first, cache.path().join("icons").join("known.png"));
    assert_eq!(first, second);
    assert_eq!(std::fs::read(&first)?, b"png");
    assert_eq!(theme.loads.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn missing_theme_icons_fall_back_to_bundled_files() -> anyhow::Result<()> {
    let bundled = tempfile::tempdir()?;
    let cache = tempfile::tempdir()?;
    let provider = IconProvider::new(
        bundled.path(),
        cache.path(),
        Arc::new(CountingTheme::default()),
    );

    assert_eq!(
        provider.icon_path("unknown"),
        bundled.path().join("qbt-theme").join("unknown.png")
    );
    assert_eq!(
        provider.icon("unknown"),
        Icon::Themed {
            id: "unknown".into(),
            fallback: bundled.path().join("qbt-theme").join("unknown.png"),
        }
    );
    Ok(())
}

#[test]
fn preference_disables_the_system_theme() -> anyhow::Result<()> {
    let bundled = tempfile::tempdir()?;
    let cache = tempfile::tempdir()?;
    let preferences = Preferences::new(SettingsStorage::in_memory());
    let provider = IconProvider::new(
        bundled.path(),
        cache.path(),
        Arc::new(CountingTheme::default()),
    );

    preferences.set_use_system_icon_theme(false);
    provider.configure(&preferences);

    assert!(!provider.use_system_theme());
    assert_eq!(
        provider.icon_path("known"),
        bundled.path().join("qbt-theme").join("known.png")
    );
    Ok(())
}

#[tokio::test]
async fn preference_watch_follows_settings_changes() -> anyhow::Result<()> {
    let bundled = tempfile::tempdir()?;
    let cache = tempfile::tempdir()?;
    let preferences = Preferences::new(SettingsStorage::in_memory());
    let provider = Arc::new(IconProvider::new(
        bundled.path(),
        cache.path(),
        Arc::new(CountingTheme::default()),
    ));
    let watch = provider.spawn_preference_watch(preferences.clone());

    preferences.set_use_system_icon_theme(false);
    tokio::time::timeout(Duration::from_secs(2), async {
        while provider.use_system_theme() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await?;

    preferences.set_use_system_icon_theme(true);
    tokio::time::timeout(Duration::from_secs(2), async {
        while !provider.use_system_theme() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await?;

    watch.abort();
    Ok(())
}

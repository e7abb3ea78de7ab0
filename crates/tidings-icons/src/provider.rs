//! Symbolic icon id resolution.
//!
//! # Design
//! - The system theme is used only when the user preference allows it and the
//!   host theme reports itself available; otherwise bundled icons are used.
//! - Theme icons needed as files are written once into the cache directory and
//!   reused afterwards. Any failure falls back to the bundled file.
//! - A watch task re-derives the theme switch whenever settings change.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tidings_config::Preferences;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{IconError, IconResult};
use crate::theme::IconTheme;

/// Directory under the bundled root holding the built-in icon set.
pub const BUNDLED_THEME_DIR: &str = "qbt-theme";

/// Pixel size theme icons are rendered at for file-based consumers.
pub const THEME_ICON_SIZE: u32 = 32;

const FLAGS_DIR: &str = "flags";

/// A resolved icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Icon {
    /// Icon from the desktop theme, with the bundled file as fallback.
    Themed {
        /// Theme icon id.
        id: String,
        /// Bundled file used when the theme lacks the icon.
        fallback: PathBuf,
    },
    /// Bundled icon file.
    Bundled(PathBuf),
}

/// Resolves icon ids against the host theme or the bundled icon set.
pub struct IconProvider {
    bundled_root: PathBuf,
    cache_dir: PathBuf,
    theme: Arc<dyn IconTheme>,
    use_system_theme: AtomicBool,
}

impl IconProvider {
    /// Provider over `bundled_root` that caches rendered theme icons in
    /// `cache_dir`. The system theme starts enabled when available; call
    /// [`Self::configure`] to apply the user's preference.
    #[must_use]
    pub fn new(
        bundled_root: impl Into<PathBuf>,
        cache_dir: impl Into<PathBuf>,
        theme: Arc<dyn IconTheme>,
    ) -> Self {
        let available = theme.is_available();
        Self {
            bundled_root: bundled_root.into(),
            cache_dir: cache_dir.into(),
            theme,
            use_system_theme: AtomicBool::new(available),
        }
    }

    /// Whether icons currently come from the system theme.
    #[must_use]
    pub fn use_system_theme(&self) -> bool {
        self.use_system_theme.load(Ordering::Acquire)
    }

    /// Re-read the theme preference.
    pub fn configure(&self, preferences: &Preferences) {
        let enabled = preferences.use_system_icon_theme() && self.theme.is_available();
        let previous = self.use_system_theme.swap(enabled, Ordering::AcqRel);
        if previous != enabled {
            info!(use_system_theme = enabled, "icon source changed");
        }
    }

    /// Resolve `id` to an icon.
    #[must_use]
    pub fn icon(&self, id: &str) -> Icon {
        let bundled = self.bundled_icon_path(id);
        if self.use_system_theme() {
            Icon::Themed {
                id: id.to_string(),
                fallback: bundled,
            }
        } else {
            Icon::Bundled(bundled)
        }
    }

    /// Resolve `id` to an icon file.
    #[must_use]
    pub fn icon_path(&self, id: &str) -> PathBuf {
        if self.use_system_theme() {
            match self.cached_theme_icon(id) {
                Ok(Some(path)) => return path,
                Ok(None) => debug!(icon = id, "theme lacks icon; using bundled copy"),
                Err(err) => warn!(icon = id, error = %err, "failed to cache theme icon"),
            }
        }
        self.bundled_icon_path(id)
    }

    /// Bundled file for `id`, regardless of the theme setting.
    #[must_use]
    pub fn bundled_icon_path(&self, id: &str) -> PathBuf {
        self.bundled_root
            .join(BUNDLED_THEME_DIR)
            .join(format!("{id}.png"))
    }

    /// Flag icon for an ISO 3166 country code; `None` for an empty code.
    #[must_use]
    pub fn flag_icon_path(&self, country_iso: &str) -> Option<PathBuf> {
        let code = country_iso.trim();
        if code.is_empty() {
            return None;
        }
        Some(
            self.bundled_root
                .join(FLAGS_DIR)
                .join(format!("{}.png", code.to_ascii_lowercase())),
        )
    }

    /// Directory rendered theme icons are written to.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Re-run [`Self::configure`] on every settings change until the settings
    /// store goes away.
    #[must_use]
    pub fn spawn_preference_watch(self: &Arc<Self>, preferences: Preferences) -> JoinHandle<()> {
        let provider = Arc::clone(self);
        let mut watcher = preferences.subscribe();
        tokio::spawn(async move {
            provider.configure(&preferences);
            while watcher.changed().await.is_some() {
                provider.configure(&preferences);
            }
            debug!("settings store closed; icon preference watch stopped");
        })
    }

    fn cached_theme_icon(&self, id: &str) -> IconResult<Option<PathBuf>> {
        let cached = self.cache_dir.join(format!("{id}.png"));
        if cached.is_file() {
            return Ok(Some(cached));
        }
        let Some(bytes) = self.theme.load_png(id, THEME_ICON_SIZE)? else {
            return Ok(None);
        };
        fs::create_dir_all(&self.cache_dir)
            .map_err(|source| IconError::io("icons.cache_dir", &self.cache_dir, source))?;
        fs::write(&cached, bytes)
            .map_err(|source| IconError::io("icons.cache_write", &cached, source))?;
        Ok(Some(cached))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptyTheme;

    impl IconTheme for EmptyTheme {
        fn is_available(&self) -> bool {
            false
        }

        fn load_png(&self, _id: &str, _size: u32) -> IconResult<Option<Vec<u8>>> {
            Ok(None)
        }
    }

    #[test]
    fn unavailable_theme_yields_bundled_icons() {
        let provider = IconProvider::new("/opt/tidings", "/tmp/tidings-icons", Arc::new(EmptyTheme));
        assert!(!provider.use_system_theme());
        assert_eq!(
            provider.icon("media-playback-start"),
            Icon::Bundled(PathBuf::from("/opt/tidings/qbt-theme/media-playback-start.png"))
        );
        assert_eq!(
            provider.icon_path("media-playback-start"),
            PathBuf::from("/opt/tidings/qbt-theme/media-playback-start.png")
        );
    }

    #[test]
    fn flag_paths_lowercase_and_reject_empty_codes() {
        let provider = IconProvider::new("/opt/tidings", "/tmp/tidings-icons", Arc::new(EmptyTheme));
        assert_eq!(
            provider.flag_icon_path("DE"),
            Some(PathBuf::from("/opt/tidings/flags/de.png"))
        );
        assert_eq!(provider.flag_icon_path(""), None);
        assert_eq!(provider.flag_icon_path("  "), None);
    }
}

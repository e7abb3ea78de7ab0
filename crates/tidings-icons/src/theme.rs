//! Host icon theme lookup.
//!
//! # Design
//! - [`IconTheme`] abstracts the desktop's icon theme so the provider can be
//!   driven by a toolkit theme engine or by the plain freedesktop lookup here.
//! - The freedesktop lookup only understands fixed-size PNG directories
//!   (`<theme>/<size>x<size>/<context>/<id>.png`) and falls back to `hicolor`
//!   and `/usr/share/pixmaps`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use tracing::trace;
use walkdir::WalkDir;

use crate::error::{IconError, IconResult};

const FALLBACK_THEME: &str = "hicolor";
const DEFAULT_DATA_DIRS: &str = "/usr/local/share:/usr/share";
const PIXMAPS_DIR: &str = "/usr/share/pixmaps";

/// Desktop icon theme.
pub trait IconTheme: Send + Sync {
    /// Whether the host exposes a usable theme.
    fn is_available(&self) -> bool;

    /// PNG bytes for `id` at `size` pixels, `Ok(None)` when the theme has no
    /// such icon.
    ///
    /// # Errors
    ///
    /// Returns an error when a matching icon exists but cannot be read.
    fn load_png(&self, id: &str, size: u32) -> IconResult<Option<Vec<u8>>>;
}

/// Icon theme lookup following the freedesktop directory layout.
#[derive(Debug, Clone)]
pub struct FreedesktopIconTheme {
    theme: String,
    icon_dirs: Vec<PathBuf>,
    pixmap_dirs: Vec<PathBuf>,
}

impl FreedesktopIconTheme {
    /// Theme `theme` searched in the standard XDG data directories.
    #[must_use]
    pub fn new(theme: impl Into<String>) -> Self {
        let mut data_dirs: Vec<PathBuf> = BaseDirs::new()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .into_iter()
            .collect();
        let system = env::var("XDG_DATA_DIRS")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIRS.to_string());
        data_dirs.extend(env::split_paths(&system));

        Self {
            theme: theme.into(),
            icon_dirs: data_dirs.into_iter().map(|dir| dir.join("icons")).collect(),
            pixmap_dirs: vec![PathBuf::from(PIXMAPS_DIR)],
        }
    }

    /// Theme `theme` searched only under the given icon roots.
    #[must_use]
    pub fn with_icon_dirs(theme: impl Into<String>, icon_dirs: Vec<PathBuf>) -> Self {
        Self {
            theme: theme.into(),
            icon_dirs,
            pixmap_dirs: Vec::new(),
        }
    }

    /// Name of the preferred theme.
    #[must_use]
    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Locate the icon file without reading it.
    #[must_use]
    pub fn find(&self, id: &str, size: u32) -> Option<PathBuf> {
        let file_name = format!("{id}.png");
        let size_dir = format!("{size}x{size}");
        let mut themes = vec![self.theme.as_str()];
        if self.theme != FALLBACK_THEME {
            themes.push(FALLBACK_THEME);
        }

        for theme in themes {
            for root in &self.icon_dirs {
                if let Some(found) = search_size_dir(&root.join(theme).join(&size_dir), &file_name)
                {
                    return Some(found);
                }
            }
        }
        self.pixmap_dirs
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|candidate| candidate.is_file())
    }
}

impl IconTheme for FreedesktopIconTheme {
    fn is_available(&self) -> bool {
        cfg!(all(unix, not(target_os = "macos")))
            && self
                .icon_dirs
                .iter()
                .chain(&self.pixmap_dirs)
                .any(|dir| dir.is_dir())
    }

    fn load_png(&self, id: &str, size: u32) -> IconResult<Option<Vec<u8>>> {
        let Some(path) = self.find(id, size) else {
            trace!(icon = id, theme = %self.theme, "icon not in theme");
            return Ok(None);
        };
        fs::read(&path)
            .map(Some)
            .map_err(|source| IconError::io("theme.read", path, source))
    }
}

fn search_size_dir(size_dir: &Path, file_name: &str) -> Option<PathBuf> {
    if !size_dir.is_dir() {
        return None;
    }
    let mut matches: Vec<PathBuf> = WalkDir::new(size_dir)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == file_name)
        .map(walkdir::DirEntry::into_path)
        .collect();
    matches.sort();
    matches.into_iter().next()
}

//! JSON-file settings store with change notification.
//!
//! # Design
//! - Reads and writes hit an in-memory map; `flush` persists it atomically
//!   (temp file + rename). Dropping the last handle flushes pending writes.
//! - Every effective write bumps a revision published on a `tokio::watch`
//!   channel so dependents can re-derive cached state.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use directories::ProjectDirs;
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{ConfigError, ConfigResult};

/// Environment variable overriding the settings file location.
pub const CONFIG_PATH_ENV: &str = "TIDINGS_CONFIG";

const SETTINGS_FILE_NAME: &str = "settings.json";

/// Shared handle to the key-value settings store.
#[derive(Clone)]
pub struct SettingsStorage {
    inner: Arc<StorageInner>,
}

struct StorageInner {
    path: Option<PathBuf>,
    values: RwLock<BTreeMap<String, Value>>,
    dirty: AtomicBool,
    revision: watch::Sender<u64>,
}

impl SettingsStorage {
    /// Open the store backed by `path`. A missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is not a
    /// JSON object.
    pub fn open(path: impl Into<PathBuf>) -> ConfigResult<Self> {
        let path = path.into();
        let values = match fs::read(&path) {
            Ok(bytes) => parse_settings(&path, &bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(ConfigError::Io {
                    operation: "settings.open",
                    path,
                    source,
                });
            }
        };
        debug!(path = %path.display(), keys = values.len(), "settings loaded");
        Ok(Self::with_values(Some(path), values))
    }

    /// Store that lives only in memory; `flush` is a no-op.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_values(None, BTreeMap::new())
    }

    /// Settings file location: `$TIDINGS_CONFIG`, else the platform config directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("org", "tidings", "tidings")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE_NAME))
    }

    fn with_values(path: Option<PathBuf>, values: BTreeMap<String, Value>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(StorageInner {
                path,
                values: RwLock::new(values),
                dirty: AtomicBool::new(false),
                revision,
            }),
        }
    }

    /// Backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    /// Raw value stored under `key`.
    #[must_use]
    pub fn load_value(&self, key: &str) -> Option<Value> {
        self.inner
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Boolean stored under `key`, or `default` when absent or not boolean-like.
    ///
    /// Accepts JSON booleans as well as the strings `"true"` and `"false"`.
    #[must_use]
    pub fn load_bool(&self, key: &str, default: bool) -> bool {
        match self.load_value(key) {
            Some(Value::Bool(value)) => value,
            Some(Value::String(raw)) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => true,
                "false" => false,
                _ => default,
            },
            _ => default,
        }
    }

    /// Store `value` under `key`. Writing an identical value is a no-op.
    pub fn store_value(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let changed = {
            let mut values = self
                .inner
                .values
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if values.get(key) == Some(&value) {
                false
            } else {
                values.insert(key.to_string(), value);
                true
            }
        };
        if changed {
            self.mark_changed(key);
        }
    }

    /// Remove `key` from the store.
    pub fn remove_value(&self, key: &str) {
        let removed = self
            .inner
            .values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some();
        if removed {
            self.mark_changed(key);
        }
    }

    /// Current revision; starts at zero and grows with every effective write.
    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.inner.revision.borrow()
    }

    /// Subscribe to revision changes.
    #[must_use]
    pub fn subscribe(&self) -> SettingsWatcher {
        SettingsWatcher {
            receiver: self.inner.revision.subscribe(),
        }
    }

    /// Persist pending writes to the backing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory, temp file, or rename fails.
    pub fn flush(&self) -> ConfigResult<()> {
        self.inner.flush()
    }

    fn mark_changed(&self, key: &str) {
        self.inner.dirty.store(true, Ordering::Release);
        self.inner.revision.send_modify(|revision| *revision += 1);
        debug!(key, revision = self.revision(), "setting changed");
    }
}

impl StorageInner {
    fn flush(&self) -> ConfigResult<()> {
        let Some(path) = self.path.as_deref() else {
            self.dirty.store(false, Ordering::Release);
            return Ok(());
        };
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        let result = self.write_file(path);
        if result.is_err() {
            self.dirty.store(true, Ordering::Release);
        }
        result
    }

    fn write_file(&self, path: &Path) -> ConfigResult<()> {
        let document: Map<String, Value> = self
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let rendered =
            serde_json::to_vec_pretty(&Value::Object(document)).map_err(|source| {
                ConfigError::Json {
                    operation: "settings.render",
                    path: path.to_path_buf(),
                    source,
                }
            })?;

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                operation: "settings.create_dir",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let staging = path.with_extension("json.tmp");
        fs::write(&staging, rendered).map_err(|source| ConfigError::Io {
            operation: "settings.write_staging",
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, path).map_err(|source| ConfigError::Io {
            operation: "settings.rename",
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "settings flushed");
        Ok(())
    }
}

impl Drop for StorageInner {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            warn!(error = %err, "failed to flush settings on shutdown");
        }
    }
}

fn parse_settings(path: &Path, bytes: &[u8]) -> ConfigResult<BTreeMap<String, Value>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(BTreeMap::new());
    }
    let document: Value = serde_json::from_slice(bytes).map_err(|source| ConfigError::Json {
        operation: "settings.parse",
        path: path.to_path_buf(),
        source,
    })?;
    match document {
        Value::Object(map) => Ok(map.into_iter().collect()),
        _ => Err(ConfigError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}

/// Receiver side of the settings revision channel.
pub struct SettingsWatcher {
    receiver: watch::Receiver<u64>,
}

impl SettingsWatcher {
    /// Wait for the next revision. Returns `None` once the store is dropped.
    pub async fn changed(&mut self) -> Option<u64> {
        self.receiver.changed().await.ok()?;
        Some(*self.receiver.borrow_and_update())
    }
}

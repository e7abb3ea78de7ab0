//! In-memory torrent catalog fed by engine events.
//!
//! # Design
//! - The engine bridge publishes `TorrentAdded`, `FilesDiscovered` and
//!   `TorrentRemoved`; the catalog folds them into snapshots.
//! - Implements [`TorrentInspector`] so notification actions can resolve
//!   torrents without talking to the engine directly.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tidings_events::{Event, InfoHash};
use tokio::sync::RwLock;

use crate::error::{TorrentError, TorrentResult};
use crate::model::{TorrentFile, TorrentSnapshot};
use crate::service::TorrentInspector;

/// Event-fed catalog of torrent snapshots.
#[derive(Default)]
pub struct TorrentCatalog {
    entries: RwLock<HashMap<InfoHash, TorrentSnapshot>>,
}

impl TorrentCatalog {
    /// Construct an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a snapshot.
    pub async fn upsert(&self, snapshot: TorrentSnapshot) {
        self.entries
            .write()
            .await
            .insert(snapshot.info_hash, snapshot);
    }

    /// Number of tracked torrents.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the catalog tracks no torrents.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Fold an engine event into the catalog.
    ///
    /// Events that do not describe torrent metadata are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TorrentError::NotFound`] when a file listing arrives for a
    /// torrent the catalog has never seen.
    pub async fn apply_event(&self, event: &Event) -> TorrentResult<()> {
        match event {
            Event::TorrentAdded {
                torrent_id,
                name,
                save_path,
                root_path,
            } => {
                let mut entries = self.entries.write().await;
                let files = entries
                    .remove(torrent_id)
                    .map(|existing| existing.files)
                    .unwrap_or_default();
                entries.insert(
                    *torrent_id,
                    TorrentSnapshot {
                        info_hash: *torrent_id,
                        name: name.clone(),
                        save_path: PathBuf::from(save_path),
                        root_path: PathBuf::from(root_path),
                        files,
                    },
                );
            }
            Event::FilesDiscovered { torrent_id, files } => {
                let mut entries = self.entries.write().await;
                let entry = entries
                    .get_mut(torrent_id)
                    .ok_or(TorrentError::NotFound {
                        operation: "catalog.files_discovered",
                        torrent_id: *torrent_id,
                    })?;
                entry.files = files
                    .iter()
                    .map(|file| TorrentFile {
                        path: PathBuf::from(&file.path),
                        size_bytes: file.size_bytes,
                    })
                    .collect();
            }
            Event::TorrentRemoved { torrent_id } => {
                let _ = self.entries.write().await.remove(torrent_id);
            }
            Event::AddTorrentFailed { .. }
            | Event::TorrentFinished { .. }
            | Event::FullDiskError { .. }
            | Event::DownloadFromUrlFailed { .. } => {}
        }
        Ok(())
    }
}

#[async_trait]
impl TorrentInspector for TorrentCatalog {
    async fn list(&self) -> anyhow::Result<Vec<TorrentSnapshot>> {
        let mut torrents: Vec<_> = self.entries.read().await.values().cloned().collect();
        torrents.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(torrents)
    }

    async fn get(&self, info_hash: &InfoHash) -> anyhow::Result<Option<TorrentSnapshot>> {
        Ok(self.entries.read().await.get(info_hash).cloned())
    }
}

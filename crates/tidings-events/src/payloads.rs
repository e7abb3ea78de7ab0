//! Event payload types published by the torrent engine bridge.

use chrono::{DateTime, Utc};

use crate::ids::InfoHash;

/// Identifier assigned to each event published on the bus.
pub type EventId = u64;

/// Default buffer size for the in-memory replay ring.
pub const DEFAULT_REPLAY_CAPACITY: usize = 1_024;

/// Typed domain events emitted by the torrent engine.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A torrent was admitted by the engine.
    TorrentAdded {
        /// Info hash of the admitted torrent.
        torrent_id: InfoHash,
        /// Display name from the torrent metadata.
        name: String,
        /// Directory the payload is saved under.
        save_path: String,
        /// Top-level path of the payload (file or directory).
        root_path: String,
    },
    /// Torrent metadata resolved into a file listing.
    FilesDiscovered {
        /// Info hash of the torrent that produced the listing.
        torrent_id: InfoHash,
        /// Files relative to the save path.
        files: Vec<DiscoveredFile>,
    },
    /// The engine refused to add a torrent.
    AddTorrentFailed {
        /// Human-readable failure reported by the engine.
        error: String,
    },
    /// A torrent finished downloading all wanted pieces.
    TorrentFinished {
        /// Info hash of the finished torrent.
        torrent_id: InfoHash,
        /// Display name of the finished torrent.
        name: String,
    },
    /// Writing torrent data failed, typically because the disk is full.
    FullDiskError {
        /// Info hash of the affected torrent.
        torrent_id: InfoHash,
        /// Display name of the affected torrent.
        name: String,
        /// Engine-provided failure detail.
        message: String,
    },
    /// Fetching a `.torrent` file or magnet target from a URL failed.
    DownloadFromUrlFailed {
        /// URL that could not be downloaded.
        url: String,
        /// Engine-provided failure detail.
        reason: String,
    },
    /// A torrent was removed from the session.
    TorrentRemoved {
        /// Info hash of the removed torrent.
        torrent_id: InfoHash,
    },
}

impl Event {
    /// Machine-friendly discriminator used in logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::TorrentAdded { .. } => "torrent_added",
            Self::FilesDiscovered { .. } => "files_discovered",
            Self::AddTorrentFailed { .. } => "add_torrent_failed",
            Self::TorrentFinished { .. } => "torrent_finished",
            Self::FullDiskError { .. } => "full_disk_error",
            Self::DownloadFromUrlFailed { .. } => "download_from_url_failed",
            Self::TorrentRemoved { .. } => "torrent_removed",
        }
    }

    /// Torrent the event refers to, when it concerns a single torrent.
    #[must_use]
    pub const fn torrent_id(&self) -> Option<&InfoHash> {
        match self {
            Self::TorrentAdded { torrent_id, .. }
            | Self::FilesDiscovered { torrent_id, .. }
            | Self::TorrentFinished { torrent_id, .. }
            | Self::FullDiskError { torrent_id, .. }
            | Self::TorrentRemoved { torrent_id } => Some(torrent_id),
            Self::AddTorrentFailed { .. } | Self::DownloadFromUrlFailed { .. } => None,
        }
    }
}

/// Metadata wrapper around events. Each envelope tracks the event id and emission timestamp.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct EventEnvelope {
    /// Monotonic identifier assigned to the wrapped event.
    pub id: EventId,
    /// Timestamp recording when the envelope was produced.
    pub timestamp: DateTime<Utc>,
    /// Wrapped event payload.
    pub event: Event,
}

/// Individual file discovered within a torrent.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Path relative to the torrent's save path.
    pub path: String,
    /// File size in bytes.
    pub size_bytes: u64,
}

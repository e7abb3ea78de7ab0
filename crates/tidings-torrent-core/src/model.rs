//! Torrent snapshots and port-mapping DTOs exchanged with engine adapters.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tidings_events::InfoHash;

/// Minimal identity of a torrent, enough to describe it in a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentDescriptor {
    /// Content hash of the torrent.
    pub info_hash: InfoHash,
    /// Display name.
    pub name: String,
}

/// Single file inside a torrent payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentFile {
    /// Path relative to the torrent's save path.
    pub path: PathBuf,
    /// File size in bytes.
    pub size_bytes: u64,
}

/// Point-in-time view of a torrent as tracked by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentSnapshot {
    /// Content hash of the torrent.
    pub info_hash: InfoHash,
    /// Display name.
    pub name: String,
    /// Directory the payload is saved under.
    pub save_path: PathBuf,
    /// Top-level payload path (the file itself or the torrent's directory).
    pub root_path: PathBuf,
    /// Files in payload order.
    pub files: Vec<TorrentFile>,
}

impl TorrentSnapshot {
    /// Identity used when building notifications.
    #[must_use]
    pub fn descriptor(&self) -> TorrentDescriptor {
        TorrentDescriptor {
            info_hash: self.info_hash,
            name: self.name.clone(),
        }
    }

    /// Path the user expects to see when opening the finished torrent.
    ///
    /// A single-file torrent opens the file itself, resolved against the save
    /// path; anything else opens the root directory.
    #[must_use]
    pub fn open_target(&self) -> PathBuf {
        match self.files.as_slice() {
            [only] => absolute_or_joined(&self.save_path, &only.path),
            _ => self.root_path.clone(),
        }
    }
}

fn absolute_or_joined(base: &Path, relative: &Path) -> PathBuf {
    let joined = base.join(relative);
    std::path::absolute(&joined).unwrap_or(joined)
}

/// Transport protocol for a NAT port mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortProtocol {
    /// TCP mapping.
    Tcp,
    /// UDP mapping.
    Udp,
}

/// Engine-issued handle for one UPnP or NAT-PMP mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortMappingHandle(pub i32);

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(files: &[&str]) -> TorrentSnapshot {
        TorrentSnapshot {
            info_hash: InfoHash::V1([3; 20]),
            name: "demo".into(),
            save_path: PathBuf::from("/downloads"),
            root_path: PathBuf::from("/downloads/demo"),
            files: files
                .iter()
                .map(|path| TorrentFile {
                    path: PathBuf::from(path),
                    size_bytes: 10,
                })
                .collect(),
        }
    }

    #[test]
    fn single_file_torrent_opens_the_file() {
        let torrent = snapshot(&["movie.mkv"]);
        assert_eq!(torrent.open_target(), PathBuf::from("/downloads/movie.mkv"));
    }

    #[test]
    fn multi_file_torrent_opens_root() {
        let torrent = snapshot(&["demo/a.txt", "demo/b.txt"]);
        assert_eq!(torrent.open_target(), PathBuf::from("/downloads/demo"));
    }

    #[test]
    fn relative_save_path_is_made_absolute() {
        let mut torrent = snapshot(&["movie.mkv"]);
        torrent.save_path = PathBuf::from("relative/dir");
        assert!(torrent.open_target().is_absolute());
        assert!(torrent.open_target().ends_with("relative/dir/movie.mkv"));
    }

    #[test]
    fn descriptor_copies_identity() {
        let torrent = snapshot(&[]);
        let descriptor = torrent.descriptor();
        assert_eq!(descriptor.info_hash, torrent.info_hash);
        assert_eq!(descriptor.name, "demo");
    }
}

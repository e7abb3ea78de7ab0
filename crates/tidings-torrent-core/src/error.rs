//! Error types for torrent core services.

use thiserror::Error;
use tidings_events::InfoHash;

/// Primary error type for torrent operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TorrentError {
    /// Torrent was not found.
    #[error("torrent not found")]
    NotFound {
        /// Operation identifier.
        operation: &'static str,
        /// Missing torrent identifier.
        torrent_id: InfoHash,
    },
}

/// Convenience alias for torrent operation results.
pub type TorrentResult<T> = Result<T, TorrentError>;

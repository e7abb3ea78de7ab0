//! Error types for icon resolution.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for icon operations.
pub type IconResult<T> = Result<T, IconError>;

/// Errors raised while reading theme icons or writing the icon cache.
#[derive(Debug, Error)]
pub enum IconError {
    /// Filesystem access failed.
    #[error("icon filesystem operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl IconError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

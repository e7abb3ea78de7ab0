//! Error types for notification back ends and side effects.

use std::io;

use thiserror::Error;

/// Result alias for notification operations.
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Errors raised while constructing back ends or performing side effects.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The back end is not available in this build or on this host.
    #[error("notification back end unavailable")]
    BackendUnavailable {
        /// Back-end name.
        backend: &'static str,
    },
    /// The back end is available but failed to initialise.
    #[error("notification back end failed to initialise")]
    BackendInit {
        /// Back-end name.
        backend: &'static str,
        /// Underlying failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The platform opener could not be launched.
    #[error("failed to launch opener")]
    OpenerSpawn {
        /// Program that failed to start.
        program: &'static str,
        /// Target that was being opened.
        target: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The desktop service declined to open the target.
    #[error("desktop service refused to open target")]
    OpenRejected {
        /// Target that was being opened.
        target: String,
    },
    /// A filesystem path could not be expressed as a `file://` URL.
    #[error("path cannot be converted to a file url")]
    InvalidPath {
        /// Offending path.
        path: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn messages_are_constant_and_sources_preserved() {
        let spawn = NotifyError::OpenerSpawn {
            program: "xdg-open",
            target: "file:///tmp".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(spawn.to_string(), "failed to launch opener");
        assert!(spawn.source().is_some());

        let init = NotifyError::BackendInit {
            backend: "dbus",
            source: "no server".into(),
        };
        assert_eq!(init.to_string(), "notification back end failed to initialise");
        assert!(init.source().is_some());

        let rejected = NotifyError::OpenRejected {
            target: "file:///tmp".into(),
        };
        assert!(rejected.source().is_none());
    }
}

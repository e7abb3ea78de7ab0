//! The single "open URL" side effect available to notification actions.
//!
//! # Design
//! - Headless builds launch the platform's default opener and never wait on
//!   it; a detached thread reaps the child.
//! - GUI builds delegate to the toolkit's desktop services.

use std::process::{Command, Stdio};
use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use crate::error::{NotifyError, NotifyResult};

/// Opens URLs (including `file://` URLs) with the user's default handler.
pub trait UrlOpener: Send + Sync {
    /// Open `url`.
    ///
    /// # Errors
    ///
    /// Returns an error when the platform refuses or fails to open the URL.
    fn open(&self, url: &Url) -> NotifyResult<()>;
}

/// Launches an external opener process.
#[derive(Debug, Clone)]
pub struct ProcessOpener {
    program: &'static str,
    leading_args: Vec<&'static str>,
}

impl ProcessOpener {
    /// Opener for the current platform (`xdg-open`, `open`, or
    /// `cmd /C start`).
    #[must_use]
    pub fn platform_default() -> Self {
        if cfg!(target_os = "windows") {
            Self::with_program("cmd", vec!["/C", "start", ""])
        } else if cfg!(target_os = "macos") {
            Self::with_program("open", Vec::new())
        } else {
            Self::with_program("xdg-open", Vec::new())
        }
    }

    /// Opener running `program`, with `leading_args` placed before the URL.
    #[must_use]
    pub const fn with_program(program: &'static str, leading_args: Vec<&'static str>) -> Self {
        Self {
            program,
            leading_args,
        }
    }

    /// Program this opener launches.
    #[must_use]
    pub const fn program(&self) -> &'static str {
        self.program
    }
}

impl Default for ProcessOpener {
    fn default() -> Self {
        Self::platform_default()
    }
}

impl UrlOpener for ProcessOpener {
    fn open(&self, url: &Url) -> NotifyResult<()> {
        let mut child = Command::new(self.program)
            .args(&self.leading_args)
            .arg(url.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| NotifyError::OpenerSpawn {
                program: self.program,
                target: url.to_string(),
                source,
            })?;

        let program = self.program;
        let reaper = std::thread::Builder::new()
            .name("tidings-opener-reaper".into())
            .spawn(move || match child.wait() {
                Ok(status) if status.success() => {}
                Ok(status) => debug!(program, status = %status, "opener exited unsuccessfully"),
                Err(error) => warn!(program, error = %error, "failed to reap opener process"),
            });
        if let Err(error) = reaper {
            warn!(program, error = %error, "failed to spawn opener reaper thread");
        }
        Ok(())
    }
}

/// Toolkit open-URL service used by GUI builds.
pub trait DesktopServices: Send + Sync {
    /// Ask the desktop to open `url`; `false` means it declined.
    fn open_url(&self, url: &Url) -> bool;
}

/// [`UrlOpener`] over the toolkit's desktop services.
#[derive(Clone)]
pub struct DesktopOpener {
    services: Arc<dyn DesktopServices>,
}

impl DesktopOpener {
    /// Wrap the toolkit service.
    #[must_use]
    pub fn new(services: Arc<dyn DesktopServices>) -> Self {
        Self { services }
    }
}

impl UrlOpener for DesktopOpener {
    fn open(&self, url: &Url) -> NotifyResult<()> {
        if self.services.open_url(url) {
            Ok(())
        } else {
            Err(NotifyError::OpenRejected {
                target: url.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Refusing;

    impl DesktopServices for Refusing {
        fn open_url(&self, _url: &Url) -> bool {
            false
        }
    }

    #[test]
    fn desktop_refusal_becomes_an_error() -> anyhow::Result<()> {
        let opener = DesktopOpener::new(Arc::new(Refusing));
        let url = Url::parse("file:///srv/media")?;
        assert!(matches!(
            opener.open(&url),
            Err(NotifyError::OpenRejected { target }) if target == "file:///srv/media"
        ));
        Ok(())
    }

    #[test]
    fn missing_opener_program_reports_spawn_failure() -> anyhow::Result<()> {
        let opener = ProcessOpener::with_program("tidings-no-such-opener", Vec::new());
        let url = Url::parse("https://example.invalid/")?;
        assert!(matches!(
            opener.open(&url),
            Err(NotifyError::OpenerSpawn {
                program: "tidings-no-such-opener",
                ..
            })
        ));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn process_opener_launches_without_waiting() -> anyhow::Result<()> {
        let opener = ProcessOpener::with_program("true", Vec::new());
        opener.open(&Url::parse("file:///tmp")?)?;
        Ok(())
    }

    #[test]
    fn platform_default_picks_a_known_program() {
        let program = ProcessOpener::platform_default().program();
        assert!(["xdg-open", "open", "cmd"].contains(&program));
    }
}

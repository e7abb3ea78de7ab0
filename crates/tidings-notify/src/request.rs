//! Notification request value types.
//!
//! # Design
//! - A [`Request`] is a plain value assembled with `with_*` helpers and moved
//!   into [`crate::Manager::submit`]; after submission it is shared read-only.
//! - Actions keep insertion order because back ends display them in that order.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tidings_events::InfoHash;
use uuid::Uuid;

/// Action identifier for the notification's primary click.
pub const DEFAULT_ACTION: &str = "default";

/// Action identifier that opens a finished torrent's payload.
pub const OPEN_ACTION: &str = "document-open";

/// Identifier assigned to a request when it is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Allocate a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Broad grouping used by back ends for filtering and styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Anything not tied to a transfer or the network.
    #[default]
    Generic,
    /// Torrent transfer lifecycle.
    Download,
    /// Connectivity and port forwarding.
    Network,
}

impl Category {
    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Download => "download",
            Self::Network => "network",
        }
    }
}

/// How insistently the back end should present the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Informational, may be collapsed.
    Low,
    /// Regular notification.
    #[default]
    Normal,
    /// Needs the user's attention.
    High,
}

/// Outcome classification shown as the notification's icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// No icon.
    #[default]
    None,
    /// Informational icon.
    Information,
    /// Warning icon.
    Warning,
    /// Error icon.
    Error,
}

impl Severity {
    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Information => "information",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// How long a notification stays on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeout {
    /// Stay until the user dismisses it.
    Never,
    /// Let the back end decide.
    #[default]
    Default,
    /// Expire after the given number of milliseconds.
    After(u32),
}

impl Timeout {
    /// Decode the wire representation: `0` never expires, positive values are
    /// milliseconds, negative values defer to the back end.
    #[must_use]
    pub fn from_millis(value: i64) -> Self {
        match value {
            0 => Self::Never,
            v if v > 0 => Self::After(u32::try_from(v).unwrap_or(u32::MAX)),
            _ => Self::Default,
        }
    }

    /// Wire representation, inverse of [`Self::from_millis`].
    #[must_use]
    pub fn as_millis(self) -> i64 {
        match self {
            Self::Never => 0,
            Self::Default => -1,
            Self::After(ms) => i64::from(ms),
        }
    }

    /// Explicit duration, if any.
    #[must_use]
    pub fn duration(self) -> Option<Duration> {
        match self {
            Self::After(ms) => Some(Duration::from_millis(u64::from(ms))),
            Self::Never | Self::Default => None,
        }
    }
}

/// One user-facing notification.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Request {
    /// Summary line.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Grouping for back-end styling.
    pub category: Category,
    /// Presentation urgency.
    pub urgency: Urgency,
    /// Outcome classification.
    pub severity: Severity,
    /// Torrent the notification refers to.
    pub torrent: Option<InfoHash>,
    /// Action identifiers and labels in display order.
    pub actions: Vec<(String, String)>,
    /// Display duration.
    pub timeout: Timeout,
    /// Caller payload carried through to callbacks untouched.
    pub user_data: Option<Value>,
}

impl Request {
    /// Start a request with the given title and message and default
    /// classification.
    #[must_use]
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    /// Set the category.
    #[must_use]
    pub const fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Set the urgency.
    #[must_use]
    pub const fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    /// Set the severity.
    #[must_use]
    pub const fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Associate the request with a torrent.
    #[must_use]
    pub const fn with_torrent(mut self, torrent: InfoHash) -> Self {
        self.torrent = Some(torrent);
        self
    }

    /// Set the display duration.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Timeout) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attach an opaque payload.
    #[must_use]
    pub fn with_user_data(mut self, user_data: Value) -> Self {
        self.user_data = Some(user_data);
        self
    }

    /// Append an action, or relabel it in place if the id is already present.
    #[must_use]
    pub fn with_action(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.add_action(id, label);
        self
    }

    /// In-place variant of [`Self::with_action`].
    pub fn add_action(&mut self, id: impl Into<String>, label: impl Into<String>) {
        let id = id.into();
        let label = label.into();
        if let Some(slot) = self.actions.iter_mut().find(|(existing, _)| *existing == id) {
            slot.1 = label;
        } else {
            self.actions.push((id, label));
        }
    }

    /// Label of the given action, if present.
    #[must_use]
    pub fn action_label(&self, id: &str) -> Option<&str> {
        self.actions
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, label)| label.as_str())
    }

    /// Whether the request offers the primary-click action.
    #[must_use]
    pub fn has_default_action(&self) -> bool {
        self.action_label(DEFAULT_ACTION).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_wire_values_round_trip_and_clamp() {
        assert_eq!(Timeout::from_millis(0), Timeout::Never);
        assert_eq!(Timeout::from_millis(-1), Timeout::Default);
        assert_eq!(Timeout::from_millis(-42), Timeout::Default);
        assert_eq!(Timeout::from_millis(5_000), Timeout::After(5_000));
        assert_eq!(
            Timeout::from_millis(i64::MAX),
            Timeout::After(u32::MAX)
        );
        assert_eq!(Timeout::Never.as_millis(), 0);
        assert_eq!(Timeout::Default.as_millis(), -1);
        assert_eq!(
            Timeout::After(250).duration(),
            Some(Duration::from_millis(250))
        );
        assert_eq!(Timeout::Never.duration(), None);
    }

    #[test]
    fn actions_keep_insertion_order_and_relabel_in_place() {
        let request = Request::new("t", "m")
            .with_action(OPEN_ACTION, "Open")
            .with_action(DEFAULT_ACTION, "View")
            .with_action(OPEN_ACTION, "Show");

        let ids: Vec<&str> = request.actions.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec![OPEN_ACTION, DEFAULT_ACTION]);
        assert_eq!(request.action_label(OPEN_ACTION), Some("Show"));
        assert!(request.has_default_action());
        assert_eq!(request.action_label("missing"), None);
    }

    #[test]
    fn new_requests_use_neutral_classification() {
        let request = Request::new("title", "message");
        assert_eq!(request.category, Category::Generic);
        assert_eq!(request.urgency, Urgency::Normal);
        assert_eq!(request.severity, Severity::None);
        assert_eq!(request.timeout, Timeout::Default);
        assert!(request.torrent.is_none());
        assert!(request.user_data.is_none());
    }

    #[test]
    fn request_ids_are_unique_and_display_as_uuid() {
        let first = RequestId::new();
        let second = RequestId::new();
        assert_ne!(first, second);
        assert_eq!(first.to_string(), first.as_uuid().to_string());
    }
}

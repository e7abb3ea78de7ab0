//! JSON-lines engine event input.
//!
//! Each non-empty line is one [`Event`] tagged by `type`. Malformed lines are
//! logged and skipped so a single bad record never stops the feed. Reading
//! pauses while a subscriber is a full channel behind, so no event is evicted
//! before it is handled.

use tidings_events::{Event, EventBus};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};

/// Parse one feed line; `Ok(None)` for blank lines.
///
/// # Errors
///
/// Returns the JSON error when the line is not a valid event.
pub fn parse_event_line(line: &str) -> Result<Option<Event>, serde_json::Error> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(trimmed).map(Some)
}

/// Publish every event read from `reader` until end of input and return how
/// many were published.
///
/// # Errors
///
/// Returns an error when reading from `reader` fails.
pub async fn pump_events<R>(reader: R, events: &EventBus) -> AppResult<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_number = 0_usize;
    let mut published = 0_usize;
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|err| AppError::io("feed.read_line", err))?
    {
        line_number += 1;
        match parse_event_line(&line) {
            Ok(Some(event)) => {
                let kind = event.kind();
                events.wait_for_room().await;
                let id = events.publish(event);
                debug!(line = line_number, event_id = id, kind, "event published");
                published += 1;
            }
            Ok(None) => {}
            Err(err) => warn!(line = line_number, error = %err, "skipping malformed event line"),
        }
    }
    Ok(published)
}

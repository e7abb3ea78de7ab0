//! Requests raised for engine events.
//!
//! Each function builds exactly one request with a fixed classification; the
//! manager decides whether it is shown.

use tidings_torrent_core::TorrentDescriptor;

use crate::request::{Category, DEFAULT_ACTION, OPEN_ACTION, Request, Severity, Timeout, Urgency};

/// The engine refused to add a torrent.
#[must_use]
pub fn add_torrent_failed(error: &str) -> Request {
    Request::new("Error", format!("Failed to add torrent: {error}"))
        .with_category(Category::Generic)
        .with_severity(Severity::Error)
        .with_urgency(Urgency::High)
        .with_timeout(Timeout::Never)
}

/// A torrent was added (opt-in).
#[must_use]
pub fn torrent_added(torrent: &TorrentDescriptor) -> Request {
    Request::new("Torrent added", format!("'{}' was added.", torrent.name))
        .with_category(Category::Download)
        .with_severity(Severity::Information)
        .with_urgency(Urgency::Normal)
        .with_timeout(Timeout::Default)
        .with_torrent(torrent.info_hash)
}

/// A torrent finished downloading; offers to open the payload.
#[must_use]
pub fn torrent_finished(torrent: &TorrentDescriptor) -> Request {
    Request::new(
        "Download completion",
        format!("{} has finished downloading.", torrent.name),
    )
    .with_category(Category::Download)
    .with_severity(Severity::Information)
    .with_timeout(Timeout::Never)
    .with_torrent(torrent.info_hash)
    .with_action(OPEN_ACTION, "Open")
    .with_action(DEFAULT_ACTION, "View")
}

/// Writing torrent data failed.
#[must_use]
pub fn full_disk_error(torrent: &TorrentDescriptor, message: &str) -> Request {
    Request::new(
        "I/O Error",
        format!(
            "An I/O error occurred for torrent {}.\n Reason: {message}",
            torrent.name
        ),
    )
    .with_category(Category::Download)
    .with_severity(Severity::Error)
    .with_urgency(Urgency::High)
    .with_timeout(Timeout::Never)
    .with_torrent(torrent.info_hash)
}

/// Downloading a torrent from a URL failed.
#[must_use]
pub fn download_from_url_failed(url: &str, reason: &str) -> Request {
    Request::new(
        "Url download error",
        format!("Couldn't download file at url: {url}, reason: {reason}."),
    )
    .with_category(Category::Download)
    .with_severity(Severity::Error)
    .with_urgency(Urgency::High)
    .with_timeout(Timeout::Never)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidings_events::InfoHash;

    fn descriptor(name: &str) -> TorrentDescriptor {
        TorrentDescriptor {
            info_hash: InfoHash::V1([7; 20]),
            name: name.into(),
        }
    }

    #[test]
    fn classification_matches_event_table() {
        let torrent = descriptor("X");
        let cases = [
            (
                add_torrent_failed("bad file"),
                Category::Generic,
                Severity::Error,
                Urgency::High,
                Timeout::Never,
            ),
            (
                torrent_added(&torrent),
                Category::Download,
                Severity::Information,
                Urgency::Normal,
                Timeout::Default,
            ),
            (
                torrent_finished(&torrent),
                Category::Download,
                Severity::Information,
                Urgency::Normal,
                Timeout::Never,
            ),
            (
                full_disk_error(&torrent, "disk full"),
                Category::Download,
                Severity::Error,
                Urgency::High,
                Timeout::Never,
            ),
            (
                download_from_url_failed("http://host/a.torrent", "404"),
                Category::Download,
                Severity::Error,
                Urgency::High,
                Timeout::Never,
            ),
        ];

        for (request, category, severity, urgency, timeout) in cases {
            assert_eq!(request.category, category, "{}", request.title);
            assert_eq!(request.severity, severity, "{}", request.title);
            assert_eq!(request.urgency, urgency, "{}", request.title);
            assert_eq!(request.timeout, timeout, "{}", request.title);
        }
    }

    #[test]
    fn messages_embed_event_details() {
        let torrent = descriptor("movie.mkv");
        assert_eq!(
            add_torrent_failed("bad file").message,
            "Failed to add torrent: bad file"
        );
        assert_eq!(torrent_added(&torrent).message, "'movie.mkv' was added.");
        assert_eq!(
            torrent_finished(&torrent).message,
            "movie.mkv has finished downloading."
        );
        assert_eq!(
            full_disk_error(&torrent, "disk full").message,
            "An I/O error occurred for torrent movie.mkv.\n Reason: disk full"
        );
        assert_eq!(
            download_from_url_failed("http://host/a.torrent", "404").message,
            "Couldn't download file at url: http://host/a.torrent, reason: 404."
        );
    }

    #[test]
    fn finished_torrent_offers_open_then_default() {
        let request = torrent_finished(&descriptor("movie.mkv"));
        assert_eq!(
            request.actions,
            vec![
                (OPEN_ACTION.to_string(), "Open".to_string()),
                (DEFAULT_ACTION.to_string(), "View".to_string()),
            ]
        );
        assert_eq!(request.torrent, Some(InfoHash::V1([7; 20])));
        assert!(add_torrent_failed("x").torrent.is_none());
    }
}

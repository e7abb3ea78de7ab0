#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Engine event bus for the Tidings notification layer.
//!
//! The torrent engine bridge publishes typed [`Event`]s; the notification
//! orchestrator consumes them. The bus assigns sequential identifiers and keeps
//! a bounded replay ring so late subscribers can catch up from a known id.
//!
//! Layout: `ids.rs` (torrent info hashes), `payloads.rs` (event types),
//! `routing.rs` (broadcast bus and subscriber streams), `error.rs`.

pub mod error;
pub mod ids;
pub mod payloads;
pub mod routing;

pub use error::InfoHashError;
pub use ids::InfoHash;
pub use payloads::{DEFAULT_REPLAY_CAPACITY, DiscoveredFile, Event, EventEnvelope, EventId};
pub use routing::{EventBus, EventStream};

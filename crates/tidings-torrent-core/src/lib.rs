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

//! Engine-agnostic torrent interfaces and DTOs.
//!
//! Layout: `model.rs` (torrent snapshots and port-mapping types),
//! `service.rs` (traits implemented by engine adapters), `catalog.rs`
//! (event-fed in-memory inspector), `error.rs`.

pub mod catalog;
pub mod error;
pub mod model;
pub mod service;

pub use catalog::TorrentCatalog;
pub use error::{TorrentError, TorrentResult};
pub use model::{
    PortMappingHandle, PortProtocol, TorrentDescriptor, TorrentFile, TorrentSnapshot,
};
pub use service::{PortMappingSession, TorrentInspector};

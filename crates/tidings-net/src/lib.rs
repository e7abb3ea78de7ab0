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

//! UPnP / NAT-PMP port forwarding bookkeeping over the engine session.
//!
//! Layout: `forwarder.rs` (enable gate and port to handle table).

pub mod forwarder;

pub use forwarder::PortForwarder;

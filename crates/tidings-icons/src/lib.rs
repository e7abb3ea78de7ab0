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

//! Icon resolution for notifications and the client UI.
//!
//! Symbolic icon ids resolve to the desktop icon theme when the user allows it
//! and the host has one, and to the bundled icon set otherwise.
//!
//! Layout: `provider.rs` (id to icon/path resolution and preference watch),
//! `theme.rs` (host theme trait and freedesktop lookup), `error.rs`.

pub mod error;
pub mod provider;
pub mod theme;

pub use error::{IconError, IconResult};
pub use provider::{BUNDLED_THEME_DIR, Icon, IconProvider, THEME_ICON_SIZE};
pub use theme::{FreedesktopIconTheme, IconTheme};

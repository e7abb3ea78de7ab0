//! Traits implemented by torrent engine adapters.

use async_trait::async_trait;
use tidings_events::InfoHash;

use crate::model::{PortMappingHandle, PortProtocol, TorrentSnapshot};

/// Read-only view over the torrents known to the engine.
#[async_trait]
pub trait TorrentInspector: Send + Sync {
    /// List every known torrent.
    async fn list(&self) -> anyhow::Result<Vec<TorrentSnapshot>>;

    /// Look up a torrent by info hash.
    async fn get(&self, info_hash: &InfoHash) -> anyhow::Result<Option<TorrentSnapshot>>;
}

/// Port-mapping primitives of the engine session (UPnP and NAT-PMP).
#[async_trait]
pub trait PortMappingSession: Send + Sync {
    /// Switch the engine's UPnP and NAT-PMP clients on or off.
    async fn set_nat_enabled(&self, upnp: bool, natpmp: bool) -> anyhow::Result<()>;

    /// Request a mapping; the engine returns one handle per active mapper.
    async fn add_port_mapping(
        &self,
        protocol: PortProtocol,
        external_port: u16,
        local_port: u16,
    ) -> anyhow::Result<Vec<PortMappingHandle>>;

    /// Remove a mapping previously returned by [`Self::add_port_mapping`].
    async fn delete_port_mapping(&self, handle: PortMappingHandle) -> anyhow::Result<()>;
}

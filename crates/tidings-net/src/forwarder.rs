//! Port forwarder over the engine's port-mapping primitives.
//!
//! # Design
//! - The forwarder owns the set of ports the client wants reachable and the
//!   engine handles currently mapping them.
//! - Disabling keeps the port set and drops the handles, so a later enable
//!   restores every mapping.
//! - Engine failures are logged and counted; the port set is updated anyway so
//!   bookkeeping never diverges from what callers asked for.

use std::collections::BTreeMap;
use std::sync::Arc;

use tidings_config::Preferences;
use tidings_telemetry::Metrics;
use tidings_torrent_core::{PortMappingHandle, PortMappingSession, PortProtocol};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Default)]
struct ForwarderState {
    active: bool,
    ports: BTreeMap<u16, Vec<PortMappingHandle>>,
}

impl ForwarderState {
    fn handle_count(&self) -> usize {
        self.ports.values().map(Vec::len).sum()
    }
}

/// UPnP / NAT-PMP port forwarder.
pub struct PortForwarder {
    session: Arc<dyn PortMappingSession>,
    preferences: Preferences,
    metrics: Metrics,
    state: Mutex<ForwarderState>,
}

impl PortForwarder {
    /// Build the forwarder and start it when the port forwarding preference
    /// is set.
    pub async fn new(
        session: Arc<dyn PortMappingSession>,
        preferences: Preferences,
        metrics: Metrics,
    ) -> Self {
        let forwarder = Self {
            session,
            preferences,
            metrics,
            state: Mutex::new(ForwarderState::default()),
        };
        if forwarder.preferences.port_forwarding_enabled() {
            let mut state = forwarder.state.lock().await;
            forwarder.start(&mut state).await;
        }
        forwarder
    }

    /// Whether forwarding is active.
    pub async fn is_enabled(&self) -> bool {
        self.state.lock().await.active
    }

    /// Turn forwarding on or off and persist the choice.
    pub async fn set_enabled(&self, enabled: bool) {
        let mut state = self.state.lock().await;
        if state.active == enabled {
            return;
        }
        if enabled {
            self.start(&mut state).await;
        } else {
            self.stop(&mut state).await;
        }
        self.preferences.set_port_forwarding_enabled(enabled);
    }

    /// Forward `port`; mapped immediately when forwarding is active.
    pub async fn add_port(&self, port: u16) {
        let mut state = self.state.lock().await;
        if state.ports.contains_key(&port) {
            debug!(port, "port already forwarded");
            return;
        }
        let handles = if state.active {
            self.map_port(port).await
        } else {
            Vec::new()
        };
        state.ports.insert(port, handles);
        self.publish(&state);
    }

    /// Stop forwarding `port`, unmapping its handles when active.
    pub async fn delete_port(&self, port: u16) {
        let mut state = self.state.lock().await;
        let Some(handles) = state.ports.remove(&port) else {
            debug!(port, "port was not forwarded");
            return;
        };
        if state.active {
            self.unmap(port, &handles).await;
        }
        self.publish(&state);
    }

    /// Forwarded ports and the engine handles currently mapping them.
    pub async fn mapped_ports(&self) -> BTreeMap<u16, Vec<PortMappingHandle>> {
        self.state.lock().await.ports.clone()
    }

    async fn start(&self, state: &mut ForwarderState) {
        info!("starting UPnP / NAT-PMP port forwarding");
        if let Err(err) = self.session.set_nat_enabled(true, true).await {
            warn!(error = %err, "failed to enable NAT port mappers");
            self.metrics.inc_port_mapping_failure();
        }
        state.active = true;
        let ports: Vec<u16> = state.ports.keys().copied().collect();
        for port in ports {
            let handles = self.map_port(port).await;
            state.ports.insert(port, handles);
        }
        self.publish(state);
    }

    async fn stop(&self, state: &mut ForwarderState) {
        info!("stopping UPnP / NAT-PMP port forwarding");
        if let Err(err) = self.session.set_nat_enabled(false, false).await {
            warn!(error = %err, "failed to disable NAT port mappers");
            self.metrics.inc_port_mapping_failure();
        }
        state.active = false;
        for handles in state.ports.values_mut() {
            handles.clear();
        }
        self.publish(state);
    }

    async fn map_port(&self, port: u16) -> Vec<PortMappingHandle> {
        match self
            .session
            .add_port_mapping(PortProtocol::Tcp, port, port)
            .await
        {
            Ok(handles) => {
                debug!(port, mappings = handles.len(), "port mapped");
                handles
            }
            Err(err) => {
                warn!(port, error = %err, "failed to map port");
                self.metrics.inc_port_mapping_failure();
                Vec::new()
            }
        }
    }

    async fn unmap(&self, port: u16, handles: &[PortMappingHandle]) {
        for handle in handles {
            if let Err(err) = self.session.delete_port_mapping(*handle).await {
                warn!(port, handle = handle.0, error = %err, "failed to remove port mapping");
                self.metrics.inc_port_mapping_failure();
            }
        }
        debug!(port, "port unmapped");
    }

    fn publish(&self, state: &ForwarderState) {
        self.metrics.set_port_mappings_active(state.handle_count());
    }
}

//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes the counters/gauges the notification pipeline and the port
//!   forwarder report against.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use prometheus::{
    Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder, core::Collector,
};
use serde::Serialize;

use crate::error::{Result, TelemetryError};

/// Prometheus-backed metrics registry shared across the workspace.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    notifications_submitted_total: IntCounterVec,
    notifications_submitted_sum: AtomicU64,
    notifications_suppressed_total: IntCounter,
    notifier_signals_total: IntCounterVec,
    notifier_resets_total: IntCounterVec,
    events_received_total: IntCounterVec,
    port_mappings_active: IntGauge,
    port_mapping_failures_total: IntCounter,
}

/// Snapshot of selected gauges and counters for health reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Notifications handed to a notifier, across all categories.
    pub notifications_submitted_total: u64,
    /// Requests dropped because notifications are disabled.
    pub notifications_suppressed_total: u64,
    /// Port mappings currently held by the forwarder.
    pub port_mappings_active: i64,
    /// Port mapping operations that failed.
    pub port_mapping_failures_total: u64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be built or
    /// registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let notifications_submitted_total = counter_vec(
            "notifications_submitted_total",
            "Notifications handed to the active notifier",
            &["category", "severity"],
        )?;
        let notifications_suppressed_total = counter(
            "notifications_suppressed_total",
            "Notification requests dropped while notifications are disabled",
        )?;
        let notifier_signals_total = counter_vec(
            "notifier_signals_total",
            "Signals raised by notifier back ends",
            &["kind"],
        )?;
        let notifier_resets_total = counter_vec(
            "notifier_resets_total",
            "Notifier replacements by back end name",
            &["backend"],
        )?;
        let events_received_total = counter_vec(
            "events_received_total",
            "Torrent events observed by the notification manager",
            &["type"],
        )?;
        let port_mappings_active = IntGauge::with_opts(Opts::new(
            "port_mappings_active",
            "Port mappings currently registered with the session",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "port_mappings_active",
            source,
        })?;
        let port_mapping_failures_total = counter(
            "port_mapping_failures_total",
            "Port mapping operations that failed",
        )?;

        register(
            &registry,
            "notifications_submitted_total",
            notifications_submitted_total.clone(),
        )?;
        register(
            &registry,
            "notifications_suppressed_total",
            notifications_suppressed_total.clone(),
        )?;
        register(
            &registry,
            "notifier_signals_total",
            notifier_signals_total.clone(),
        )?;
        register(
            &registry,
            "notifier_resets_total",
            notifier_resets_total.clone(),
        )?;
        register(
            &registry,
            "events_received_total",
            events_received_total.clone(),
        )?;
        register(
            &registry,
            "port_mappings_active",
            port_mappings_active.clone(),
        )?;
        register(
            &registry,
            "port_mapping_failures_total",
            port_mapping_failures_total.clone(),
        )?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                notifications_submitted_total,
                notifications_submitted_sum: AtomicU64::new(0),
                notifications_suppressed_total,
                notifier_signals_total,
                notifier_resets_total,
                events_received_total,
                port_mappings_active,
                port_mapping_failures_total,
            }),
        })
    }

    /// Count a notification handed to a notifier.
    pub fn inc_notification_submitted(&self, category: &str, severity: &str) {
        self.inner
            .notifications_submitted_total
            .with_label_values(&[category, severity])
            .inc();
        self.inner
            .notifications_submitted_sum
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Count a request dropped by the global notification switch.
    pub fn inc_notification_suppressed(&self) {
        self.inner.notifications_suppressed_total.inc();
    }

    /// Count a notifier signal (`action_triggered`, `closed`).
    pub fn inc_notifier_signal(&self, kind: &str) {
        self.inner
            .notifier_signals_total
            .with_label_values(&[kind])
            .inc();
    }

    /// Count a notifier replacement.
    pub fn inc_notifier_reset(&self, backend: &str) {
        self.inner
            .notifier_resets_total
            .with_label_values(&[backend])
            .inc();
    }

    /// Count an event observed on the bus.
    pub fn inc_event(&self, event_type: &str) {
        self.inner
            .events_received_total
            .with_label_values(&[event_type])
            .inc();
    }

    /// Set the number of active port mappings.
    pub fn set_port_mappings_active(&self, count: usize) {
        self.inner
            .port_mappings_active
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Count a failed port mapping operation.
    pub fn inc_port_mapping_failure(&self) {
        self.inner.port_mapping_failures_total.inc();
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }

    /// Take a point-in-time snapshot of the most relevant gauges and counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            notifications_submitted_total: self
                .inner
                .notifications_submitted_sum
                .load(Ordering::Relaxed),
            notifications_suppressed_total: self.inner.notifications_suppressed_total.get(),
            port_mappings_active: self.inner.port_mappings_active.get(),
            port_mapping_failures_total: self.inner.port_mapping_failures_total.get(),
        }
    }
}

fn counter(name: &'static str, help: &str) -> Result<IntCounter> {
    IntCounter::with_opts(Opts::new(name, help))
        .map_err(|source| TelemetryError::MetricsCollector { name, source })
}

fn counter_vec(name: &'static str, help: &str, labels: &[&str]) -> Result<IntCounterVec> {
    IntCounterVec::new(Opts::new(name, help), labels)
        .map_err(|source| TelemetryError::MetricsCollector { name, source })
}

fn register<C>(registry: &Registry, name: &'static str, collector: C) -> Result<()>
where
    C: Collector + 'static,
{
    registry
        .register(Box::new(collector))
        .map_err(|source| TelemetryError::MetricsRegister { name, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_snapshot_reflects_updates() -> anyhow::Result<()> {
        let metrics = Metrics::new()?;
        metrics.inc_notification_submitted("download", "information");
        metrics.inc_notification_submitted("error", "critical");
        metrics.inc_notification_suppressed();
        metrics.inc_notifier_signal("closed");
        metrics.inc_notifier_reset("noop");
        metrics.inc_event("torrent_finished");
        metrics.set_port_mappings_active(3);
        metrics.inc_port_mapping_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(
            snapshot,
            MetricsSnapshot {
                notifications_submitted_total: 2,
                notifications_suppressed_total: 1,
                port_mappings_active: 3,
                port_mapping_failures_total: 1,
            }
        );

        let rendered = metrics.render()?;
        assert!(rendered.contains("notifications_submitted_total"));
        assert!(rendered.contains("notifier_resets_total"));
        assert!(rendered.contains("port_mappings_active 3"));
        Ok(())
    }

    #[test]
    fn fresh_registry_reports_zeroes() -> anyhow::Result<()> {
        let metrics = Metrics::new()?;
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
        Ok(())
    }
}

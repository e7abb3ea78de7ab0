//! Telemetry failures: subscriber installation and the Prometheus registry.

use prometheus::Error as PrometheusError;
use thiserror::Error;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors raised while installing logging or maintaining metrics.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed, or installation failed.
    #[error("failed to install tracing subscriber")]
    SubscriberInstall {
        /// Underlying subscriber error.
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
    /// A counter or gauge could not be constructed.
    #[error("failed to build metrics collector")]
    MetricsCollector {
        /// Metric name.
        name: &'static str,
        /// Underlying Prometheus error.
        #[source]
        source: PrometheusError,
    },
    /// The registry rejected a collector (usually a duplicate name).
    #[error("failed to register metrics collector")]
    MetricsRegister {
        /// Metric name.
        name: &'static str,
        /// Underlying Prometheus error.
        #[source]
        source: PrometheusError,
    },
    /// The text exposition encoder failed.
    #[error("failed to encode metrics")]
    MetricsEncode {
        /// Underlying Prometheus error.
        #[source]
        source: PrometheusError,
    },
    /// Encoded exposition was not UTF-8.
    #[error("metrics output was not valid utf-8")]
    MetricsUtf8 {
        /// Underlying conversion error.
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl TelemetryError {
    /// Metric the failure is tied to, when there is one.
    #[must_use]
    pub const fn metric(&self) -> Option<&'static str> {
        match self {
            Self::MetricsCollector { name, .. } | Self::MetricsRegister { name, .. } => Some(*name),
            Self::SubscriberInstall { .. } | Self::MetricsEncode { .. } | Self::MetricsUtf8 { .. } => {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    fn prometheus(message: &str) -> PrometheusError {
        PrometheusError::Msg(message.to_string())
    }

    #[test]
    fn collector_failures_name_their_metric() {
        let err = TelemetryError::MetricsRegister {
            name: "tidings_notifications_submitted_total",
            source: prometheus("duplicate"),
        };
        assert_eq!(err.to_string(), "failed to register metrics collector");
        assert_eq!(err.metric(), Some("tidings_notifications_submitted_total"));
        assert!(err.source().is_some());
    }

    #[test]
    fn encoding_failures_carry_no_metric() -> anyhow::Result<()> {
        let utf8 = String::from_utf8(vec![0, 159])
            .err()
            .ok_or_else(|| anyhow::anyhow!("expected utf8 error"))?;
        let cases = [
            (
                TelemetryError::MetricsEncode {
                    source: prometheus("encode"),
                },
                "failed to encode metrics",
            ),
            (
                TelemetryError::MetricsUtf8 { source: utf8 },
                "metrics output was not valid utf-8",
            ),
        ];
        for (err, message) in cases {
            assert_eq!(err.to_string(), message);
            assert_eq!(err.metric(), None);
            assert!(err.source().is_some());
        }
        Ok(())
    }
}

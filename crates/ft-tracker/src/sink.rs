//! Alert sinks: where assembled readings and their alerts are handed off.

use async_trait::async_trait;
use ft_protocol::{Alert, TelemetryReading};

/// Consumer of each poll cycle's output (storage, notification, ...).
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn publish(&self, reading: &TelemetryReading, alerts: &[Alert]);
}

/// Writes alerts to the structured log; readings at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl AlertSink for LogSink {
    async fn publish(&self, reading: &TelemetryReading, alerts: &[Alert]) {
        match serde_json::to_string(reading) {
            Ok(json) => tracing::debug!(vehicle_id = reading.vehicle_id, reading = %json, "reading"),
            Err(e) => tracing::warn!(error = %e, "failed to serialize reading"),
        }

        for alert in alerts {
            tracing::warn!(
                vehicle_id = alert.vehicle_id,
                alert_type = %alert.alert_type,
                severity = %alert.severity,
                trigger_value = ?alert.trigger_value,
                threshold_value = ?alert.threshold_value,
                "{}",
                alert.message
            );
        }
    }
}

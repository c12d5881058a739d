//! Per-vehicle poll loop and the cooldown sweeper.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use ft_alerts::{AlertEvaluator, CooldownStore};
use ft_protocol::Alert;
use tokio::time;

use crate::assemble::assemble;
use crate::sink::AlertSink;
use crate::source::{SensorSource, SourceError, SourceResult};

/// Polls one vehicle's source, evaluates each reading and hands the result
/// to the sink.
pub struct VehicleTracker {
    vehicle_id: i64,
    source: Arc<dyn SensorSource>,
    evaluator: Arc<AlertEvaluator>,
    sink: Arc<dyn AlertSink>,
}

impl VehicleTracker {
    pub fn new(
        vehicle_id: i64,
        source: Arc<dyn SensorSource>,
        evaluator: Arc<AlertEvaluator>,
        sink: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            vehicle_id,
            source,
            evaluator,
            sink,
        }
    }

    pub fn vehicle_id(&self) -> i64 {
        self.vehicle_id
    }

    /// Run one cycle at the current time.
    pub async fn poll_once(&self) -> SourceResult<Vec<Alert>> {
        self.poll_once_at(Utc::now()).await
    }

    /// Run one cycle as of `now`: read, assemble, evaluate, publish.
    pub async fn poll_once_at(&self, now: DateTime<Utc>) -> SourceResult<Vec<Alert>> {
        let sample = self.source.next_sample().await?;
        let reading = assemble(self.vehicle_id, &sample, now);
        let alerts = self.evaluator.evaluate_at(self.vehicle_id, &reading, now);
        self.sink.publish(&reading, &alerts).await;
        Ok(alerts)
    }

    /// Poll at `interval` until the source is exhausted.
    ///
    /// Other source errors are logged and the loop keeps going.
    pub async fn run(&self, interval: Duration) {
        tracing::info!(
            vehicle_id = self.vehicle_id,
            source = self.source.name(),
            interval_ms = interval.as_millis() as u64,
            "tracker started"
        );

        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        let mut cycles: u64 = 0;

        loop {
            ticker.tick().await;

            match self.poll_once().await {
                Ok(alerts) => {
                    cycles += 1;
                    tracing::debug!(
                        vehicle_id = self.vehicle_id,
                        cycle = cycles,
                        alerts = alerts.len(),
                        "cycle complete"
                    );
                }
                Err(SourceError::Exhausted) => break,
                Err(e) => {
                    tracing::warn!(vehicle_id = self.vehicle_id, error = %e, "sensor read failed");
                }
            }
        }

        tracing::info!(vehicle_id = self.vehicle_id, cycles, "tracker stopped");
    }
}

/// Sweep expired cooldown entries every `interval`.
///
/// Runs forever; intended to be spawned as a background task.
pub async fn run_sweeper(store: Arc<CooldownStore>, interval: Duration) {
    let mut ticker = time::interval(interval);
    // Skip the first tick (fires immediately).
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let removed = store.sweep(Utc::now());
        tracing::debug!(removed, remaining = store.len(), "cooldown sweep finished");
    }
}

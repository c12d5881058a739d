//! Fleet tracker: replays per-vehicle sensor captures through the decoding
//! and alerting pipeline.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

use ft_alerts::AlertEvaluator;
use ft_tracker::config::TrackerConfig;
use ft_tracker::{AlertSink, LogSink, ReplaySource, SensorSource, VehicleTracker, run_sweeper};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ft-tracker starting");

    // ── Load config ─────────────────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/fleet-telematics/tracker.toml".to_string());

    let config = TrackerConfig::from_file(&config_path)?;
    tracing::info!(
        path = %config_path,
        vehicles = config.vehicles.len(),
        geofences = config.geofences.len(),
        "config loaded"
    );

    // ── Shared evaluator ────────────────────────────────────────
    let evaluator = Arc::new(
        AlertEvaluator::new(config.alerts.clone())?.with_geofences(config.geofences.clone())?,
    );
    let sink: Arc<dyn AlertSink> = Arc::new(LogSink);

    // ── One tracker task per vehicle ────────────────────────────
    let mut trackers = JoinSet::new();
    for vehicle in &config.vehicles {
        let source = ReplaySource::open(&vehicle.capture)
            .await?
            .looping(vehicle.looping);
        tracing::info!(vehicle_id = vehicle.id, cycles = source.len(), "capture loaded");

        let source: Arc<dyn SensorSource> = Arc::new(source);
        let tracker = VehicleTracker::new(vehicle.id, source, evaluator.clone(), sink.clone());
        let interval = config.poll_interval();
        trackers.spawn(async move { tracker.run(interval).await });
    }

    let sweeper = tokio::spawn(run_sweeper(
        evaluator.cooldowns().clone(),
        config.sweep_interval(),
    ));

    tracing::info!("ft-tracker ready");

    tokio::select! {
        () = async { while trackers.join_next().await.is_some() {} } => {
            tracing::info!("all captures finished");
        }
        // Graceful shutdown on SIGINT/SIGTERM
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    trackers.abort_all();
    sweeper.abort();
    tracing::info!("ft-tracker stopped");
    Ok(())
}

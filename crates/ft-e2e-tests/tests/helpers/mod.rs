//! Shared test harness for E2E integration tests.
//!
//! Wires one shared `AlertEvaluator` to a `MemorySink`, the way the tracker
//! binary wires it to `LogSink`, so suites exercise the real pipeline from
//! raw bytes to published alerts.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use ft_alerts::{AlertEvaluator, AlertThresholds};
use ft_protocol::GeofenceDefinition;
use ft_tracker::{MemorySink, SensorSource, VehicleTracker};

/// Depot fence centered on the capture's starting position.
pub const DEPOT_LAT: f64 = 48.1173;
pub const DEPOT_LON: f64 = 11.516667;

/// Four poll cycles of one vehicle:
/// 1. cruising inside the depot fence
/// 2. speeding, overheating and outside the fence
/// 3. stored DTCs (misfire + lost ECM comms) and a hard stop
/// 4. speeding again
pub const DRIVE_CAPTURE: &str = "\
# cycle 1: normal
pid 010D 32
pid 010C 1F40
pid 0105 82
pid 012F 80
3C0#E83540
$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47
---
# cycle 2: speeding + overheat, 42 km north of the depot
pid 010D A0
pid 0105 9B
$GPGGA,123600,4830.000,N,01131.000,E,1,09,0.9,540.0,M,46.9,M,,
---
# cycle 3: DTCs and harsh braking
dtc 43 02 03 01 C1 00
accel 0.0 -9.2 9.8
---
# cycle 4: speeding inside the cooldown window
pid 010D A0
";

/// End-to-end harness: shared evaluator plus a recording sink.
pub struct TestHarness {
    pub evaluator: Arc<AlertEvaluator>,
    pub sink: Arc<MemorySink>,
}

impl TestHarness {
    /// Default thresholds, no geofences.
    pub fn new() -> Self {
        Self::with_geofences(Vec::new())
    }

    /// Default thresholds plus a 2 km depot fence around the capture start.
    pub fn with_depot() -> Self {
        Self::with_geofences(vec![GeofenceDefinition::new(
            "depot", DEPOT_LAT, DEPOT_LON, 2000.0,
        )])
    }

    pub fn with_geofences(fences: Vec<GeofenceDefinition>) -> Self {
        let evaluator = AlertEvaluator::new(AlertThresholds::default())
            .expect("default thresholds are valid")
            .with_geofences(fences)
            .expect("harness fences are valid");
        Self {
            evaluator: Arc::new(evaluator),
            sink: Arc::new(MemorySink::new()),
        }
    }

    /// Tracker for `vehicle_id` wired to this harness.
    pub fn tracker(&self, vehicle_id: i64, source: Arc<dyn SensorSource>) -> VehicleTracker {
        VehicleTracker::new(vehicle_id, source, self.evaluator.clone(), self.sink.clone())
    }
}

/// Fixed reference time for deterministic cooldown checks.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 14, 7, 30, 0).unwrap()
}

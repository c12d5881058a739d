use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Speed above which a vehicle counts as moving (km/h).
pub const MOVING_SPEED_KMH: f64 = 5.0;

/// Canonical merged snapshot of one poll cycle for one vehicle.
///
/// Every physical quantity is independently optional: a missing sensor
/// leaves its field `None`, it never invents a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReading {
    pub vehicle_id: i64,
    pub timestamp: DateTime<Utc>,

    // ── GPS ────────────────────────────────────────────────────
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Metres above mean sea level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// Course over ground in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    /// Ground speed reported by the GPS receiver (km/h).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gps_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub satellites: Option<u32>,

    // ── Engine / OBD-II ────────────────────────────────────────
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_rpm: Option<f64>,
    /// Vehicle speed from the ECU (km/h).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throttle_position: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_load: Option<f64>,
    /// Engine coolant temperature (°C).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coolant_temp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intake_air_temp: Option<f64>,
    /// Mass air flow (g/s).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mass_air_flow: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intake_pressure: Option<f64>,
    /// Fuel level (%).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_pressure: Option<f64>,
    /// Fuel consumption (L/h).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_consumption_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_voltage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_oil_temp: Option<f64>,

    // ── Accelerometer (m/s²) ───────────────────────────────────
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceleration_x: Option<f64>,
    /// Longitudinal axis: negative is braking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceleration_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceleration_z: Option<f64>,

    // ── Diagnostics ────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dtc_codes: Vec<String>,
    /// Every decoded CAN signal of the cycle, keyed by signal name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub can_signals: BTreeMap<String, SignalValue>,
}

impl TelemetryReading {
    /// Empty reading: every quantity absent.
    pub fn new(vehicle_id: i64, timestamp: DateTime<Utc>) -> Self {
        Self {
            vehicle_id,
            timestamp,
            ..Self::default()
        }
    }

    /// ECU speed, falling back to GPS ground speed.
    pub fn effective_speed(&self) -> Option<f64> {
        self.vehicle_speed.or(self.gps_speed)
    }

    /// Latitude/longitude pair, only when both are known.
    pub fn position(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    pub fn status(&self) -> VehicleStatus {
        match self.effective_speed() {
            Some(speed) if speed > MOVING_SPEED_KMH => VehicleStatus::InTransit,
            _ => VehicleStatus::Idle,
        }
    }

    /// Fold a GPS fix into the reading. Absent fix fields leave existing values alone.
    pub fn apply_fix(&mut self, fix: &GpsFix) {
        self.latitude = fix.latitude.or(self.latitude);
        self.longitude = fix.longitude.or(self.longitude);
        self.altitude = fix.altitude.or(self.altitude);
        self.heading = fix.heading.or(self.heading);
        self.gps_speed = fix.speed_kmh.or(self.gps_speed);
        self.satellites = fix.satellites.or(self.satellites);
    }
}

/// Motion status derived from a reading's speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Idle,
    InTransit,
}

/// One decoded CAN signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalValue {
    /// Physical value (`raw * scale + offset`).
    pub value: f64,
    pub unit: String,
    /// Raw extracted bits.
    pub raw: u64,
}

/// Best-effort GPS fix assembled from NMEA sentences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_kmh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub satellites: Option<u32>,
}

impl GpsFix {
    pub fn has_position(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

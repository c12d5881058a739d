//! Threshold evaluation of telemetry readings into debounced alerts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ft_canbus::dtc_db;
use ft_protocol::{Alert, AlertSeverity, AlertType, GeofenceDefinition, TelemetryReading};

use crate::config::AlertThresholds;
use crate::cooldown::{CooldownKey, CooldownStore};
use crate::error::{ConfigError, ConfigResult};

/// Only the first few trouble codes of a reading raise alerts.
pub const MAX_DTC_ALERTS: usize = 5;

/// Evaluates readings against fixed thresholds.
///
/// Categories run in a fixed order: speed, engine temperature, RPM, fuel,
/// battery, driving behavior, DTCs, geofences. Every candidate alert passes
/// through the shared [`CooldownStore`] before it is returned.
#[derive(Debug)]
pub struct AlertEvaluator {
    thresholds: AlertThresholds,
    cooldowns: Arc<CooldownStore>,
    geofences: Vec<GeofenceDefinition>,
}

impl AlertEvaluator {
    /// Validate `thresholds` and build an evaluator with its own cooldown store.
    pub fn new(thresholds: AlertThresholds) -> ConfigResult<Self> {
        thresholds.validate()?;
        let cooldowns = Arc::new(CooldownStore::new(thresholds.cooldown()));
        Ok(Self {
            thresholds,
            cooldowns,
            geofences: Vec::new(),
        })
    }

    /// Build an evaluator sharing an existing cooldown store.
    pub fn with_cooldown_store(
        thresholds: AlertThresholds,
        cooldowns: Arc<CooldownStore>,
    ) -> ConfigResult<Self> {
        thresholds.validate()?;
        Ok(Self {
            thresholds,
            cooldowns,
            geofences: Vec::new(),
        })
    }

    /// Fences checked as the last category of every evaluation.
    ///
    /// Every fence must pass [`validate_geofence`].
    pub fn with_geofences(mut self, geofences: Vec<GeofenceDefinition>) -> ConfigResult<Self> {
        for fence in &geofences {
            validate_geofence(fence)?;
        }
        self.geofences = geofences;
        Ok(self)
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    pub fn cooldowns(&self) -> &Arc<CooldownStore> {
        &self.cooldowns
    }

    pub fn geofences(&self) -> &[GeofenceDefinition] {
        &self.geofences
    }

    /// Evaluate a reading at the current time.
    pub fn evaluate(&self, vehicle_id: i64, reading: &TelemetryReading) -> Vec<Alert> {
        self.evaluate_at(vehicle_id, reading, Utc::now())
    }

    /// Evaluate a reading as of `now`.
    pub fn evaluate_at(
        &self,
        vehicle_id: i64,
        reading: &TelemetryReading,
        now: DateTime<Utc>,
    ) -> Vec<Alert> {
        let t = &self.thresholds;
        let mut candidates = Vec::new();

        if let Some(speed) = reading.effective_speed() {
            if speed >= t.speed_limit_critical {
                candidates.push(Candidate::new(
                    AlertType::Speeding,
                    AlertSeverity::Critical,
                    format!(
                        "CRITICAL SPEEDING: {speed:.0} km/h (limit: {})",
                        t.speed_limit_critical
                    ),
                    speed,
                    t.speed_limit_critical,
                ));
            } else if speed >= t.speed_limit_warning {
                candidates.push(Candidate::new(
                    AlertType::Speeding,
                    AlertSeverity::Warning,
                    format!(
                        "Speed warning: {speed:.0} km/h (limit: {})",
                        t.speed_limit_warning
                    ),
                    speed,
                    t.speed_limit_warning,
                ));
            }
        }

        if let Some(temp) = reading.coolant_temp {
            if temp >= t.engine_temp_critical {
                candidates.push(Candidate::new(
                    AlertType::EngineOverheat,
                    AlertSeverity::Critical,
                    format!(
                        "ENGINE OVERHEAT: {temp:.1}°C (limit: {}°C)",
                        t.engine_temp_critical
                    ),
                    temp,
                    t.engine_temp_critical,
                ));
            } else if temp >= t.engine_temp_warning {
                candidates.push(Candidate::new(
                    AlertType::EngineOverheat,
                    AlertSeverity::Warning,
                    format!(
                        "Engine temp high: {temp:.1}°C (warning: {}°C)",
                        t.engine_temp_warning
                    ),
                    temp,
                    t.engine_temp_warning,
                ));
            }
        }

        if let Some(rpm) = reading.engine_rpm {
            if rpm >= t.rpm_critical {
                candidates.push(Candidate::new(
                    AlertType::EngineOverRev,
                    AlertSeverity::Critical,
                    format!("Engine over-revving: {rpm:.0} RPM (limit: {})", t.rpm_critical),
                    rpm,
                    t.rpm_critical,
                ));
            }
        }

        if let Some(fuel) = reading.fuel_level {
            if fuel <= t.fuel_low_critical {
                candidates.push(Candidate::new(
                    AlertType::LowFuel,
                    AlertSeverity::Critical,
                    format!("FUEL CRITICAL: {fuel:.1}% remaining"),
                    fuel,
                    t.fuel_low_critical,
                ));
            } else if fuel <= t.fuel_low_warning {
                candidates.push(Candidate::new(
                    AlertType::LowFuel,
                    AlertSeverity::Warning,
                    format!("Low fuel warning: {fuel:.1}% remaining"),
                    fuel,
                    t.fuel_low_warning,
                ));
            }
        }

        if let Some(voltage) = reading.battery_voltage {
            if voltage < t.battery_low_warning {
                candidates.push(Candidate::new(
                    AlertType::LowBattery,
                    AlertSeverity::Warning,
                    format!("Low battery voltage: {voltage:.2}V"),
                    voltage,
                    t.battery_low_warning,
                ));
            }
        }

        if let Some(accel_y) = reading.acceleration_y {
            if accel_y <= t.harsh_brake_threshold {
                candidates.push(Candidate::new(
                    AlertType::HarshBraking,
                    AlertSeverity::Warning,
                    format!("Harsh braking detected: {accel_y:.1} m/s²"),
                    accel_y,
                    t.harsh_brake_threshold,
                ));
            }
            if accel_y >= t.harsh_accel_threshold {
                candidates.push(Candidate::new(
                    AlertType::HarshAcceleration,
                    AlertSeverity::Warning,
                    format!("Harsh acceleration detected: {accel_y:.1} m/s²"),
                    accel_y,
                    t.harsh_accel_threshold,
                ));
            }
        }

        for code in reading.dtc_codes.iter().take(MAX_DTC_ALERTS) {
            let code = code.trim().to_uppercase();
            let details = match dtc_db::lookup(&code) {
                Some(entry) => format!("{code}: {} ({})", entry.description, entry.severity),
                None => format!("{code}: not in DTC table"),
            };
            candidates.push(Candidate {
                alert_type: AlertType::DtcDetected,
                severity: AlertSeverity::Warning,
                message: format!("DTC Detected: {code}"),
                details: Some(details),
                trigger_value: None,
                threshold_value: None,
            });
        }

        if let Some((lat, lon)) = reading.position() {
            candidates.extend(geofence_candidates(lat, lon, &self.geofences));
        }

        self.emit(vehicle_id, candidates, reading.position(), now)
    }

    /// Check a position against externally supplied fences at the current time.
    pub fn check_geofences(
        &self,
        vehicle_id: i64,
        lat: f64,
        lon: f64,
        fences: &[GeofenceDefinition],
    ) -> Vec<Alert> {
        self.check_geofences_at(vehicle_id, lat, lon, fences, Utc::now())
    }

    /// Check a position against externally supplied fences as of `now`.
    ///
    /// Outside a fence with `alert_on_exit` raises a warning; inside a fence
    /// with `alert_on_entry` raises an info alert. Inactive fences and fences
    /// failing [`validate_geofence`] are skipped.
    pub fn check_geofences_at(
        &self,
        vehicle_id: i64,
        lat: f64,
        lon: f64,
        fences: &[GeofenceDefinition],
        now: DateTime<Utc>,
    ) -> Vec<Alert> {
        let candidates = geofence_candidates(lat, lon, fences);
        self.emit(vehicle_id, candidates, Some((lat, lon)), now)
    }

    fn emit(
        &self,
        vehicle_id: i64,
        candidates: Vec<Candidate>,
        position: Option<(f64, f64)>,
        now: DateTime<Utc>,
    ) -> Vec<Alert> {
        candidates
            .into_iter()
            .filter_map(|c| {
                let key = CooldownKey::new(vehicle_id, c.alert_type, c.severity);
                if !self.cooldowns.try_fire(key, now) {
                    tracing::debug!(
                        vehicle_id,
                        alert_type = %c.alert_type,
                        severity = %c.severity,
                        "alert suppressed by cooldown"
                    );
                    return None;
                }
                tracing::info!(
                    vehicle_id,
                    alert_type = %c.alert_type,
                    severity = %c.severity,
                    summary = %c.message,
                    "alert raised"
                );
                Some(Alert {
                    vehicle_id,
                    alert_type: c.alert_type,
                    severity: c.severity,
                    message: c.message,
                    details: c.details,
                    latitude: position.map(|p| p.0),
                    longitude: position.map(|p| p.1),
                    trigger_value: c.trigger_value,
                    threshold_value: c.threshold_value,
                    created_at: now,
                })
            })
            .collect()
    }
}

/// An alert that has met its condition but not yet cleared the cooldown.
struct Candidate {
    alert_type: AlertType,
    severity: AlertSeverity,
    message: String,
    details: Option<String>,
    trigger_value: Option<f64>,
    threshold_value: Option<f64>,
}

impl Candidate {
    fn new(
        alert_type: AlertType,
        severity: AlertSeverity,
        message: String,
        trigger: f64,
        threshold: f64,
    ) -> Self {
        Self {
            alert_type,
            severity,
            message,
            details: None,
            trigger_value: Some(trigger),
            threshold_value: Some(threshold),
        }
    }
}

/// Reject fences whose center or radius cannot be measured against.
pub fn validate_geofence(fence: &GeofenceDefinition) -> ConfigResult<()> {
    let invalid = |reason| {
        Err(ConfigError::InvalidGeofence {
            name: fence.name.clone(),
            reason,
        })
    };
    if !fence.radius_meters.is_finite() || fence.radius_meters < 0.0 {
        return invalid("radius must be a finite, non-negative number of meters");
    }
    if !(-90.0..=90.0).contains(&fence.center_latitude) {
        return invalid("center latitude must be within -90..=90");
    }
    if !(-180.0..=180.0).contains(&fence.center_longitude) {
        return invalid("center longitude must be within -180..=180");
    }
    Ok(())
}

fn geofence_candidates(lat: f64, lon: f64, fences: &[GeofenceDefinition]) -> Vec<Candidate> {
    let mut out = Vec::new();
    for fence in fences.iter().filter(|f| f.is_active) {
        if let Err(e) = validate_geofence(fence) {
            tracing::warn!(error = %e, "geofence skipped");
            continue;
        }
        let distance = ft_gps::haversine_distance(
            lat,
            lon,
            fence.center_latitude,
            fence.center_longitude,
        );
        let inside = distance <= fence.radius_meters;

        if !inside && fence.alert_on_exit {
            out.push(Candidate {
                alert_type: AlertType::GeofenceViolation,
                severity: AlertSeverity::Warning,
                message: format!("Vehicle exited geofence: {}", fence.name),
                details: Some(format!(
                    "{:.0} m from center, radius {:.0} m",
                    distance, fence.radius_meters
                )),
                trigger_value: Some(distance),
                threshold_value: Some(fence.radius_meters),
            });
        }
        if inside && fence.alert_on_entry {
            out.push(Candidate {
                alert_type: AlertType::GeofenceViolation,
                severity: AlertSeverity::Info,
                message: format!("Vehicle entered geofence: {}", fence.name),
                details: None,
                trigger_value: Some(distance),
                threshold_value: Some(fence.radius_meters),
            });
        }
    }
    out
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of a generated alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Speeding,
    EngineOverheat,
    EngineOverRev,
    LowFuel,
    LowBattery,
    HarshBraking,
    HarshAcceleration,
    DtcDetected,
    GeofenceViolation,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Speeding => "speeding",
            Self::EngineOverheat => "engine_overheat",
            Self::EngineOverRev => "engine_over_rev",
            Self::LowFuel => "low_fuel",
            Self::LowBattery => "low_battery",
            Self::HarshBraking => "harsh_braking",
            Self::HarshAcceleration => "harsh_acceleration",
            Self::DtcDetected => "dtc_detected",
            Self::GeofenceViolation => "geofence_violation",
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity, ordered info < warning < critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An actionable alert. Handed to the persistence/notification side as soon
/// as it is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub vehicle_id: i64,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Observed value that tripped the check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_value: Option<f64>,
    /// Configured threshold it was compared against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_value: Option<f64>,
    pub created_at: DateTime<Utc>,
}

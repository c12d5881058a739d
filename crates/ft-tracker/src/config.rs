//! Tracker configuration, loadable from TOML with `ALERT_*` environment
//! overrides for the threshold table.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ft_alerts::AlertThresholds;
use ft_protocol::GeofenceDefinition;
use serde::Deserialize;

/// Top-level configuration for the tracker binary.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    /// Delay between poll cycles for each vehicle.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// How often expired cooldown entries are swept.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    /// Alert thresholds. Missing keys take their defaults.
    #[serde(default)]
    pub alerts: AlertThresholds,
    /// Fences checked on every reading with a position.
    #[serde(default)]
    pub geofences: Vec<GeofenceDefinition>,
    /// Vehicles to track.
    #[serde(default)]
    pub vehicles: Vec<VehicleConfig>,
}

/// One tracked vehicle and the capture it replays.
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleConfig {
    pub id: i64,
    /// Recorded capture file (see `ReplaySource`).
    pub capture: PathBuf,
    /// Restart the capture when it runs out.
    #[serde(default)]
    pub looping: bool,
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_sweep_interval() -> u64 {
    60
}

impl TrackerConfig {
    /// Load config from a TOML file path, then apply environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents, |key| std::env::var(key).ok())
    }

    /// Parse config text; `lookup` supplies `ALERT_*` overrides.
    pub fn from_toml_str<F>(contents: &str, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Self = toml::from_str(contents)?;
        config.alerts = config.alerts.with_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.poll_interval_ms > 0, "poll_interval_ms must be positive");
        anyhow::ensure!(self.sweep_interval_secs > 0, "sweep_interval_secs must be positive");

        let mut seen = HashSet::new();
        for vehicle in &self.vehicles {
            anyhow::ensure!(seen.insert(vehicle.id), "duplicate vehicle id {}", vehicle.id);
        }
        for fence in &self.geofences {
            ft_alerts::validate_geofence(fence)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn deserialize_minimal_config() {
        let config = TrackerConfig::from_toml_str("", no_env).unwrap();
        assert_eq!(config.poll_interval(), Duration::from_secs(1)); // default
        assert_eq!(config.sweep_interval_secs, 60); // default
        assert_eq!(config.alerts, AlertThresholds::default());
        assert!(config.vehicles.is_empty());
        assert!(config.geofences.is_empty());
    }

    #[test]
    fn deserialize_full_config() {
        let toml = r#"
poll_interval_ms = 250
sweep_interval_secs = 30

[alerts]
speed_limit_warning = 90.0
speed_limit_critical = 110.0

[[geofences]]
name = "depot"
center_latitude = 48.1173
center_longitude = 11.516667
radius_meters = 2000.0
alert_on_entry = true

[[vehicles]]
id = 1
capture = "/var/lib/fleet/truck-1.log"

[[vehicles]]
id = 2
capture = "/var/lib/fleet/van-2.log"
looping = true
"#;
        let config = TrackerConfig::from_toml_str(toml, no_env).unwrap();
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.alerts.speed_limit_warning, 90.0);
        assert_eq!(config.alerts.fuel_low_warning, 15.0); // default
        assert_eq!(config.geofences.len(), 1);
        assert!(config.geofences[0].alert_on_entry);
        assert!(config.geofences[0].alert_on_exit);
        assert_eq!(config.vehicles.len(), 2);
        assert!(!config.vehicles[0].looping);
        assert!(config.vehicles[1].looping);
        assert_eq!(config.vehicles[1].capture, PathBuf::from("/var/lib/fleet/van-2.log"));
    }

    #[test]
    fn env_overrides_thresholds() {
        let config = TrackerConfig::from_toml_str("", |key| {
            (key == "ALERT_SPEED_LIMIT_WARNING").then(|| "100".to_string())
        })
        .unwrap();
        assert_eq!(config.alerts.speed_limit_warning, 100.0);
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let toml = r#"
[alerts]
speed_limit_warning = 160.0
"#;
        assert!(TrackerConfig::from_toml_str(toml, no_env).is_err());
    }

    #[test]
    fn rejects_duplicate_vehicles() {
        let toml = r#"
[[vehicles]]
id = 1
capture = "a.log"

[[vehicles]]
id = 1
capture = "b.log"
"#;
        let err = TrackerConfig::from_toml_str(toml, no_env).unwrap_err();
        assert!(err.to_string().contains("duplicate vehicle id 1"));
    }

    #[test]
    fn rejects_bad_geofence() {
        let toml = r#"
[[geofences]]
name = "depot"
center_latitude = 48.1173
center_longitude = 11.516667
radius_meters = -5.0
"#;
        let err = TrackerConfig::from_toml_str(toml, no_env).unwrap_err();
        assert!(err.to_string().contains("depot"));
    }

    #[test]
    fn rejects_zero_poll_interval() {
        assert!(TrackerConfig::from_toml_str("poll_interval_ms = 0", no_env).is_err());
    }
}

//! Alert thresholds, loadable from TOML and overridable from `ALERT_*`
//! environment variables.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Prefix for environment overrides, e.g. `ALERT_SPEED_LIMIT_WARNING=110`.
pub const ENV_PREFIX: &str = "ALERT_";

/// Named numeric thresholds for every alert category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    /// km/h
    pub speed_limit_warning: f64,
    /// km/h
    pub speed_limit_critical: f64,
    /// °C
    pub engine_temp_warning: f64,
    /// °C
    pub engine_temp_critical: f64,
    pub rpm_critical: f64,
    /// Percent of tank.
    pub fuel_low_warning: f64,
    /// Percent of tank.
    pub fuel_low_critical: f64,
    /// Volts; fires strictly below.
    pub battery_low_warning: f64,
    /// Longitudinal acceleration in m/s², negative.
    pub harsh_brake_threshold: f64,
    /// Longitudinal acceleration in m/s².
    pub harsh_accel_threshold: f64,
    /// Debounce window per (vehicle, alert type, severity).
    pub alert_cooldown_secs: u64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            speed_limit_warning: 120.0,
            speed_limit_critical: 150.0,
            engine_temp_warning: 100.0,
            engine_temp_critical: 115.0,
            rpm_critical: 6500.0,
            fuel_low_warning: 15.0,
            fuel_low_critical: 5.0,
            battery_low_warning: 11.5,
            harsh_brake_threshold: -8.0,
            harsh_accel_threshold: 5.0,
            alert_cooldown_secs: 300,
        }
    }
}

impl AlertThresholds {
    /// Parse and validate a TOML table.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let thresholds: Self = toml::from_str(contents)?;
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Load thresholds from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Defaults with overrides taken from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `ALERT_<OPTION>` overrides from `lookup`, then validate.
    /// The cooldown is read from `ALERT_COOLDOWN_SECS`.
    ///
    /// `lookup` receives the full variable name and returns its raw value.
    pub fn with_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        for (name, slot) in self.numeric_options_mut() {
            if let Some(raw) = lookup(&format!("{ENV_PREFIX}{name}")) {
                *slot = raw.trim().parse().map_err(|_| ConfigError::NonNumeric {
                    name,
                    value: raw.clone(),
                })?;
            }
        }

        let name = "ALERT_COOLDOWN_SECS";
        if let Some(raw) = lookup(name) {
            self.alert_cooldown_secs = raw.trim().parse().map_err(|_| ConfigError::NonNumeric {
                name,
                value: raw.clone(),
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Reject non-finite values, inverted warning/critical pairs and
    /// out-of-range settings.
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, value) in self.numeric_options() {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { name });
            }
        }

        if self.speed_limit_warning >= self.speed_limit_critical {
            return Err(ConfigError::Inverted {
                warning: "SPEED_LIMIT_WARNING",
                critical: "SPEED_LIMIT_CRITICAL",
            });
        }
        if self.engine_temp_warning >= self.engine_temp_critical {
            return Err(ConfigError::Inverted {
                warning: "ENGINE_TEMP_WARNING",
                critical: "ENGINE_TEMP_CRITICAL",
            });
        }
        // Low-fuel thresholds count down: warning sits above critical.
        if self.fuel_low_warning <= self.fuel_low_critical {
            return Err(ConfigError::Inverted {
                warning: "FUEL_LOW_WARNING",
                critical: "FUEL_LOW_CRITICAL",
            });
        }
        if self.harsh_brake_threshold >= self.harsh_accel_threshold {
            return Err(ConfigError::Inverted {
                warning: "HARSH_BRAKE_THRESHOLD",
                critical: "HARSH_ACCEL_THRESHOLD",
            });
        }

        if self.rpm_critical <= 0.0 {
            return Err(ConfigError::OutOfRange {
                name: "RPM_CRITICAL",
                reason: "must be positive",
            });
        }
        if !(0.0..=100.0).contains(&self.fuel_low_warning)
            || !(0.0..=100.0).contains(&self.fuel_low_critical)
        {
            return Err(ConfigError::OutOfRange {
                name: "FUEL_LOW_WARNING",
                reason: "fuel thresholds are percentages (0-100)",
            });
        }
        if self.alert_cooldown_secs == 0 {
            return Err(ConfigError::OutOfRange {
                name: "ALERT_COOLDOWN_SECS",
                reason: "must be at least one second",
            });
        }

        Ok(())
    }

    /// The cooldown window as a chrono duration.
    pub fn cooldown(&self) -> chrono::Duration {
        i64::try_from(self.alert_cooldown_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    fn numeric_options(&self) -> [(&'static str, f64); 10] {
        [
            ("SPEED_LIMIT_WARNING", self.speed_limit_warning),
            ("SPEED_LIMIT_CRITICAL", self.speed_limit_critical),
            ("ENGINE_TEMP_WARNING", self.engine_temp_warning),
            ("ENGINE_TEMP_CRITICAL", self.engine_temp_critical),
            ("RPM_CRITICAL", self.rpm_critical),
            ("FUEL_LOW_WARNING", self.fuel_low_warning),
            ("FUEL_LOW_CRITICAL", self.fuel_low_critical),
            ("BATTERY_LOW_WARNING", self.battery_low_warning),
            ("HARSH_BRAKE_THRESHOLD", self.harsh_brake_threshold),
            ("HARSH_ACCEL_THRESHOLD", self.harsh_accel_threshold),
        ]
    }

    fn numeric_options_mut(&mut self) -> [(&'static str, &mut f64); 10] {
        [
            ("SPEED_LIMIT_WARNING", &mut self.speed_limit_warning),
            ("SPEED_LIMIT_CRITICAL", &mut self.speed_limit_critical),
            ("ENGINE_TEMP_WARNING", &mut self.engine_temp_warning),
            ("ENGINE_TEMP_CRITICAL", &mut self.engine_temp_critical),
            ("RPM_CRITICAL", &mut self.rpm_critical),
            ("FUEL_LOW_WARNING", &mut self.fuel_low_warning),
            ("FUEL_LOW_CRITICAL", &mut self.fuel_low_critical),
            ("BATTERY_LOW_WARNING", &mut self.battery_low_warning),
            ("HARSH_BRAKE_THRESHOLD", &mut self.harsh_brake_threshold),
            ("HARSH_ACCEL_THRESHOLD", &mut self.harsh_accel_threshold),
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let t = AlertThresholds::default();
        t.validate().unwrap();
        assert_eq!(t.speed_limit_warning, 120.0);
        assert_eq!(t.rpm_critical, 6500.0);
        assert_eq!(t.cooldown(), chrono::Duration::seconds(300));
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml = r#"
speed_limit_warning = 90.0
speed_limit_critical = 110.0
alert_cooldown_secs = 60
"#;
        let t = AlertThresholds::from_toml_str(toml).unwrap();
        assert_eq!(t.speed_limit_warning, 90.0);
        assert_eq!(t.speed_limit_critical, 110.0);
        assert_eq!(t.alert_cooldown_secs, 60);
        assert_eq!(t.fuel_low_critical, 5.0); // default
    }

    #[test]
    fn toml_rejects_inverted_pair() {
        let err = AlertThresholds::from_toml_str("engine_temp_warning = 120.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Inverted {
                warning: "ENGINE_TEMP_WARNING",
                ..
            }
        ));
    }

    #[test]
    fn toml_rejects_wrong_type() {
        let err = AlertThresholds::from_toml_str(r#"rpm_critical = "fast""#).unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn env_overrides_apply() {
        let t = AlertThresholds::default()
            .with_overrides(env(&[
                ("ALERT_SPEED_LIMIT_WARNING", "100"),
                ("ALERT_HARSH_BRAKE_THRESHOLD", " -6.5 "),
                ("ALERT_COOLDOWN_SECS", "30"),
            ]))
            .unwrap();
        assert_eq!(t.speed_limit_warning, 100.0);
        assert_eq!(t.harsh_brake_threshold, -6.5);
        assert_eq!(t.alert_cooldown_secs, 30);
        assert_eq!(t.speed_limit_critical, 150.0);
    }

    #[test]
    fn env_override_must_be_numeric() {
        let err = AlertThresholds::default()
            .with_overrides(env(&[("ALERT_FUEL_LOW_WARNING", "lots")]))
            .unwrap_err();
        match err {
            ConfigError::NonNumeric { name, value } => {
                assert_eq!(name, "FUEL_LOW_WARNING");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn env_override_rejects_nan() {
        let err = AlertThresholds::default()
            .with_overrides(env(&[("ALERT_RPM_CRITICAL", "NaN")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFinite { name: "RPM_CRITICAL" }));
    }

    #[test]
    fn fuel_pair_is_a_low_threshold() {
        let t = AlertThresholds {
            fuel_low_warning: 5.0,
            fuel_low_critical: 15.0,
            ..AlertThresholds::default()
        };
        assert!(matches!(
            t.validate(),
            Err(ConfigError::Inverted {
                critical: "FUEL_LOW_CRITICAL",
                ..
            })
        ));
    }

    #[test]
    fn equal_pair_is_inverted() {
        let t = AlertThresholds {
            speed_limit_warning: 150.0,
            ..AlertThresholds::default()
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn brake_must_sit_below_accel() {
        let t = AlertThresholds {
            harsh_brake_threshold: 6.0,
            ..AlertThresholds::default()
        };
        assert!(matches!(t.validate(), Err(ConfigError::Inverted { .. })));
    }

    #[test]
    fn zero_cooldown_rejected() {
        let t = AlertThresholds {
            alert_cooldown_secs: 0,
            ..AlertThresholds::default()
        };
        assert!(matches!(t.validate(), Err(ConfigError::OutOfRange { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AlertThresholds::from_file("/nonexistent/alerts.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

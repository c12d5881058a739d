use serde::{Deserialize, Serialize};

/// Circular geofence supplied by the fleet configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeofenceDefinition {
    pub name: String,
    pub center_latitude: f64,
    pub center_longitude: f64,
    #[serde(default = "default_radius")]
    pub radius_meters: f64,
    #[serde(default)]
    pub alert_on_entry: bool,
    #[serde(default = "default_true")]
    pub alert_on_exit: bool,
    /// Inactive fences are ignored by alert evaluation.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_radius() -> f64 {
    5000.0
}

fn default_true() -> bool {
    true
}

impl GeofenceDefinition {
    pub fn new(
        name: impl Into<String>,
        center_latitude: f64,
        center_longitude: f64,
        radius_meters: f64,
    ) -> Self {
        Self {
            name: name.into(),
            center_latitude,
            center_longitude,
            radius_meters,
            alert_on_entry: false,
            alert_on_exit: true,
            is_active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_with_defaults() {
        let json = r#"{"name":"depot","center_latitude":28.6,"center_longitude":77.2}"#;
        let fence: GeofenceDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(fence.radius_meters, 5000.0);
        assert!(!fence.alert_on_entry);
        assert!(fence.alert_on_exit);
        assert!(fence.is_active);
    }
}

//! Great-circle distance and circular geofence containment.

use ft_protocol::GeofenceDefinition;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters between two WGS-84 points given in degrees.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Whether a point lies inside (or exactly on) a circular geofence.
pub fn is_inside_geofence(lat: f64, lon: f64, fence: &GeofenceDefinition) -> bool {
    haversine_distance(lat, lon, fence.center_latitude, fence.center_longitude)
        <= fence.radius_meters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_to_self() {
        for (lat, lon) in [(0.0, 0.0), (48.1173, 11.516667), (-33.86, 151.21), (90.0, 0.0)] {
            assert_eq!(haversine_distance(lat, lon, lat, lon), 0.0);
        }
    }

    #[test]
    fn one_degree_of_latitude() {
        // R * pi / 180
        let d = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_194.93).abs() < 1.0, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = haversine_distance(28.6139, 77.2090, 19.0760, 72.8777);
        let b = haversine_distance(19.0760, 72.8777, 28.6139, 77.2090);
        assert!((a - b).abs() < 1e-6);
        // Delhi to Mumbai, roughly 1150 km
        assert!((1_100_000.0..1_200_000.0).contains(&a));
    }

    #[test]
    fn boundary_is_inside() {
        let mut fence = GeofenceDefinition::new("depot", 0.0, 0.0, 0.0);
        fence.radius_meters = haversine_distance(0.0, 0.0, 0.01, 0.0);
        assert!(is_inside_geofence(0.01, 0.0, &fence));
        assert!(is_inside_geofence(0.005, 0.0, &fence));
        assert!(!is_inside_geofence(0.011, 0.0, &fence));
    }

    #[test]
    fn zero_radius_contains_only_center() {
        let fence = GeofenceDefinition::new("pin", 10.0, 20.0, 0.0);
        assert!(is_inside_geofence(10.0, 20.0, &fence));
        assert!(!is_inside_geofence(10.0001, 20.0, &fence));
    }
}

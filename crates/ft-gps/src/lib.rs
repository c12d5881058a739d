//! GPS support: NMEA 0183 sentence parsing and great-circle geofence math.

pub mod geo;
pub mod nmea;

pub use geo::{EARTH_RADIUS_M, haversine_distance, is_inside_geofence};
pub use nmea::{NmeaError, parse};

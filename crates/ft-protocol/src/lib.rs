//! Shared data model for the fleet telematics engine: readings, alerts,
//! diagnosis reports and geofences.

pub mod alert;
pub mod dtc;
pub mod geofence;
pub mod telemetry;

pub use alert::*;
pub use dtc::*;
pub use geofence::*;
pub use telemetry::*;

//! Alert evaluation: thresholds, the shared cooldown store and the evaluator.

pub mod config;
pub mod cooldown;
pub mod error;
pub mod evaluator;

pub use config::AlertThresholds;
pub use cooldown::{CooldownKey, CooldownStore};
pub use error::{ConfigError, ConfigResult};
pub use evaluator::{AlertEvaluator, validate_geofence};

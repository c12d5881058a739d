//! Threshold configuration errors.

use thiserror::Error;

/// Invalid alert configuration. Raised only while constructing an evaluator.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name}: expected a number, got {value:?}")]
    NonNumeric { name: &'static str, value: String },

    #[error("{name} must be a finite number")]
    NotFinite { name: &'static str },

    #[error("inverted thresholds: {warning} and {critical} are out of order")]
    Inverted {
        warning: &'static str,
        critical: &'static str,
    },

    #[error("{name} out of range: {reason}")]
    OutOfRange {
        name: &'static str,
        reason: &'static str,
    },

    #[error("geofence {name:?}: {reason}")]
    InvalidGeofence { name: String, reason: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

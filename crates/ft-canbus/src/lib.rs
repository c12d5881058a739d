//! CAN and OBD-II decoding for fleet telematics.
//!
//! - [`catalog`] / [`decoder`]: static signal catalog and bit-level frame decoding
//! - [`obd`]: Mode 01 PID formulas and Mode 03 DTC byte decoding
//! - [`dtc_db`] / [`diagnosis`]: trouble-code lookup, severity ranking and suggestions

pub mod catalog;
pub mod decoder;
pub mod diagnosis;
pub mod dtc_db;
pub mod error;
pub mod obd;
pub mod types;

pub use error::{DecodeError, DecodeResult};
pub use obd::{PidId, PidValue};
pub use types::CanFrame;

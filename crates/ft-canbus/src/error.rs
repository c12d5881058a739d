//! Decode error types.

use thiserror::Error;

/// Errors raised by caller-contract violations while decoding.
///
/// Malformed signals inside a frame and unknown arbitration IDs are not
/// errors: they are skipped and logged at `debug`.
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("PID decode error: unknown PID 0x{pid:02X}")]
    UnknownPid { pid: u8 },

    #[error("PID decode error: unknown PID code {0:?}")]
    UnknownPidCode(String),

    #[error("PID 0x{pid:02X}: expected {expected} data byte(s), got {got}")]
    ByteCount { pid: u8, expected: usize, got: usize },

    #[error("OBD-II protocol error: {0}")]
    Protocol(String),
}

/// Convenience alias for decode results.
pub type DecodeResult<T> = Result<T, DecodeError>;

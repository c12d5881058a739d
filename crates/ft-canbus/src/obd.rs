//! OBD-II helpers: the fixed PID formula table, single-frame response
//! parsing, and DTC byte decoding.

use crate::error::{DecodeError, DecodeResult};
use crate::types::*;

// ---------------------------------------------------------------------------
// PID table
// ---------------------------------------------------------------------------

/// Mode 01 PIDs with a known decode formula (SAE J1979).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PidId {
    EngineLoad,
    CoolantTemp,
    FuelPressure,
    IntakePressure,
    EngineRpm,
    VehicleSpeed,
    IntakeAirTemp,
    MafRate,
    ThrottlePosition,
    FuelLevel,
    ControlModuleVoltage,
    OilTemp,
}

impl PidId {
    /// Every supported PID, in PID-byte order.
    pub const ALL: [PidId; 12] = [
        Self::EngineLoad,
        Self::CoolantTemp,
        Self::FuelPressure,
        Self::IntakePressure,
        Self::EngineRpm,
        Self::VehicleSpeed,
        Self::IntakeAirTemp,
        Self::MafRate,
        Self::ThrottlePosition,
        Self::FuelLevel,
        Self::ControlModuleVoltage,
        Self::OilTemp,
    ];

    /// PID byte as sent on the wire.
    pub const fn pid(self) -> u8 {
        match self {
            Self::EngineLoad => 0x04,
            Self::CoolantTemp => 0x05,
            Self::FuelPressure => 0x0A,
            Self::IntakePressure => 0x0B,
            Self::EngineRpm => 0x0C,
            Self::VehicleSpeed => 0x0D,
            Self::IntakeAirTemp => 0x0F,
            Self::MafRate => 0x10,
            Self::ThrottlePosition => 0x11,
            Self::FuelLevel => 0x2F,
            Self::ControlModuleVoltage => 0x42,
            Self::OilTemp => 0x5C,
        }
    }

    /// Fixed response width in data bytes.
    pub const fn byte_count(self) -> usize {
        match self {
            Self::EngineRpm | Self::MafRate | Self::ControlModuleVoltage => 2,
            _ => 1,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::EngineLoad => "Engine Load",
            Self::CoolantTemp => "Coolant Temperature",
            Self::FuelPressure => "Fuel Pressure",
            Self::IntakePressure => "Intake MAP",
            Self::EngineRpm => "Engine RPM",
            Self::VehicleSpeed => "Vehicle Speed",
            Self::IntakeAirTemp => "Intake Air Temp",
            Self::MafRate => "MAF Rate",
            Self::ThrottlePosition => "Throttle Position",
            Self::FuelLevel => "Fuel Level",
            Self::ControlModuleVoltage => "Control Module Voltage",
            Self::OilTemp => "Engine Oil Temp",
        }
    }

    pub const fn unit(self) -> &'static str {
        match self {
            Self::EngineLoad | Self::ThrottlePosition | Self::FuelLevel => "%",
            Self::CoolantTemp | Self::IntakeAirTemp | Self::OilTemp => "°C",
            Self::FuelPressure | Self::IntakePressure => "kPa",
            Self::EngineRpm => "rpm",
            Self::VehicleSpeed => "km/h",
            Self::MafRate => "g/s",
            Self::ControlModuleVoltage => "V",
        }
    }

    /// Look up by PID byte.
    pub fn from_pid(pid: u8) -> DecodeResult<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.pid() == pid)
            .ok_or(DecodeError::UnknownPid { pid })
    }

    /// Look up by mode+PID code string, e.g. `"010C"`. Case-insensitive.
    pub fn from_code(code: &str) -> DecodeResult<Self> {
        let code = code.trim();
        let unknown = || DecodeError::UnknownPidCode(code.to_string());
        if code.len() != 4 || !code.is_ascii() {
            return Err(unknown());
        }
        let mode = u8::from_str_radix(&code[..2], 16).map_err(|_| unknown())?;
        let pid = u8::from_str_radix(&code[2..], 16).map_err(|_| unknown())?;
        if mode != MODE_CURRENT_DATA {
            return Err(unknown());
        }
        Self::from_pid(pid).map_err(|_| unknown())
    }

    /// Mode+PID code string, e.g. `"010C"`.
    pub fn code(self) -> String {
        format!("{MODE_CURRENT_DATA:02X}{:02X}", self.pid())
    }
}

/// Decoded PID value with metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PidValue {
    pub pid: PidId,
    pub value: f64,
}

impl PidValue {
    pub fn name(&self) -> &'static str {
        self.pid.name()
    }

    pub fn unit(&self) -> &'static str {
        self.pid.unit()
    }
}

/// Apply a PID's fixed formula to its response data bytes.
///
/// `raw` must be exactly [`PidId::byte_count`] bytes long.
pub fn decode(pid: PidId, raw: &[u8]) -> DecodeResult<f64> {
    let expected = pid.byte_count();
    if raw.len() != expected {
        return Err(DecodeError::ByteCount {
            pid: pid.pid(),
            expected,
            got: raw.len(),
        });
    }

    let a = raw[0] as f64;
    let ab = || a * 256.0 + raw[1] as f64;

    let value = match pid {
        PidId::EngineLoad | PidId::ThrottlePosition | PidId::FuelLevel => a * 100.0 / 255.0,
        PidId::CoolantTemp | PidId::IntakeAirTemp | PidId::OilTemp => a - 40.0,
        PidId::FuelPressure => a * 3.0,
        PidId::IntakePressure | PidId::VehicleSpeed => a,
        PidId::EngineRpm => ab() / 4.0,
        PidId::MafRate => ab() / 100.0,
        PidId::ControlModuleVoltage => ab() / 1000.0,
    };
    Ok(value)
}

/// Decode a PID given its raw PID byte.
pub fn decode_pid(pid: u8, raw: &[u8]) -> DecodeResult<PidValue> {
    let pid = PidId::from_pid(pid)?;
    let value = decode(pid, raw)?;
    Ok(PidValue { pid, value })
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Parse a standard OBD-II single-frame response for Mode 0x01.
///
/// Expected frame data layout: `[num_bytes, response_sid, pid, data...]`
/// Returns `(pid, data_bytes_slice)`.
pub fn parse_pid_response(frame: &CanFrame) -> DecodeResult<(u8, &[u8])> {
    if !frame.is_obd_response() {
        return Err(DecodeError::Protocol(format!(
            "expected OBD response ID 0x7E8-0x7EF, got 0x{:03X}",
            frame.id
        )));
    }
    if frame.data.len() < 3 {
        return Err(DecodeError::Protocol("response too short".into()));
    }

    let expected_sid = MODE_CURRENT_DATA + RESPONSE_SID_OFFSET;
    let sid = frame.data[1];
    if sid != expected_sid {
        return Err(DecodeError::Protocol(format!(
            "expected SID 0x{expected_sid:02X}, got 0x{sid:02X}"
        )));
    }

    let pid = frame.data[2];
    let num_bytes = frame.data[0] as usize;
    let data_len = num_bytes.saturating_sub(2);
    let data_end = (3 + data_len).min(frame.data.len());
    Ok((pid, &frame.data[3..data_end]))
}

/// Parse and decode a Mode 0x01 response frame in one step.
pub fn decode_response(frame: &CanFrame) -> DecodeResult<PidValue> {
    let (pid, data) = parse_pid_response(frame)?;
    decode_pid(pid, data)
}

// ---------------------------------------------------------------------------
// DTC byte decoding
// ---------------------------------------------------------------------------

/// Decode two raw bytes into a standard DTC code string (e.g., "P0300").
pub fn decode_dtc_bytes(b1: u8, b2: u8) -> Option<String> {
    if b1 == 0x00 && b2 == 0x00 {
        return None;
    }

    let category = match (b1 >> 6) & 0x03 {
        0 => 'P',
        1 => 'C',
        2 => 'B',
        _ => 'U',
    };

    let digit1 = (b1 >> 4) & 0x03;
    let digit2 = b1 & 0x0F;
    let digit3 = (b2 >> 4) & 0x0F;
    let digit4 = b2 & 0x0F;

    Some(format!("{category}{digit1}{digit2:X}{digit3:X}{digit4:X}"))
}

/// Decode bare DTC byte pairs.
///
/// Zero pairs are padding and dropped; a trailing odd byte is ignored.
pub fn decode_dtc_pairs(pairs: &[u8]) -> Vec<String> {
    pairs
        .chunks_exact(2)
        .filter_map(|pair| decode_dtc_bytes(pair[0], pair[1]))
        .collect()
}

/// Decode a full Mode 0x03 response: `[0x43, count, hi, lo, ...]`.
///
/// Only the first `count` pairs are read; bytes past them are padding.
pub fn decode_dtc_response(payload: &[u8]) -> DecodeResult<Vec<String>> {
    let expected_sid = MODE_STORED_DTCS + RESPONSE_SID_OFFSET;
    let [sid, count, pairs @ ..] = payload else {
        return Err(DecodeError::Protocol("DTC response too short".into()));
    };
    if *sid != expected_sid {
        return Err(DecodeError::Protocol(format!(
            "expected SID 0x{expected_sid:02X}, got 0x{sid:02X}"
        )));
    }
    let needed = usize::from(*count) * 2;
    let Some(pairs) = pairs.get(..needed) else {
        return Err(DecodeError::Protocol(format!(
            "DTC count {count} but only {} byte(s) of pairs",
            pairs.len()
        )));
    };
    Ok(decode_dtc_pairs(pairs))
}

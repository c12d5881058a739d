//! CAN frame decoder: bit-level signal extraction against the static catalog.

use std::collections::BTreeMap;

use ft_protocol::SignalValue;

use crate::catalog::{self, CanSignalDefinition};
use crate::types::{CanFrame, MAX_DATA_LEN};

/// Decode every catalogued signal carried by a CAN frame.
///
/// Unknown arbitration IDs yield an empty map. A signal whose bit range
/// does not fit the payload is skipped on its own; the rest of the frame
/// still decodes. Pure: identical input always yields identical output.
pub fn decode_frame(arbitration_id: u32, data: &[u8]) -> BTreeMap<String, SignalValue> {
    let mut signals = BTreeMap::new();

    let Some(message) = catalog::lookup(arbitration_id) else {
        return signals;
    };

    if data.len() > MAX_DATA_LEN {
        tracing::warn!(
            id = arbitration_id,
            len = data.len(),
            "frame payload exceeds 8 bytes, not decoding"
        );
        return signals;
    }

    let payload = payload_le(data);
    for def in message.signals {
        match decode_signal(def, payload, data.len()) {
            Some(value) => {
                signals.insert(def.name.to_string(), value);
            }
            None => tracing::debug!(
                message = message.name,
                signal = def.name,
                len = data.len(),
                "signal bit range exceeds frame, skipped"
            ),
        }
    }

    signals
}

/// Decode a [`CanFrame`].
pub fn decode(frame: &CanFrame) -> BTreeMap<String, SignalValue> {
    decode_frame(frame.id, &frame.data)
}

/// Extract the raw value of a `length`-bit field starting at `start_bit`.
pub fn extract_bits(payload: u64, start_bit: u8, length: u8) -> u64 {
    let mask = if length >= 64 {
        u64::MAX
    } else {
        (1u64 << length) - 1
    };
    payload.checked_shr(u32::from(start_bit)).unwrap_or(0) & mask
}

fn decode_signal(def: &CanSignalDefinition, payload: u64, data_len: usize) -> Option<SignalValue> {
    if def.length == 0 || !def.fits(data_len) {
        return None;
    }
    let raw = extract_bits(payload, def.start_bit, def.length);
    let physical = raw as f64 * def.scale + def.offset;
    Some(SignalValue {
        value: round3(physical),
        unit: def.unit.to_string(),
        raw,
    })
}

/// Interpret up to 8 bytes as one little-endian integer.
fn payload_le(data: &[u8]) -> u64 {
    let mut buf = [0u8; MAX_DATA_LEN];
    buf[..data.len()].copy_from_slice(data);
    u64::from_le_bytes(buf)
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

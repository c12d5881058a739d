//! Raw CAN frame and the OBD-II identifiers the decoders check against.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Arbitration IDs used by ECU replies to functional OBD-II requests.
pub const OBD_RESPONSE_IDS: RangeInclusive<u32> = 0x7E8..=0x7EF;

/// Mode 01, live data.
pub const MODE_CURRENT_DATA: u8 = 0x01;

/// Mode 03, stored trouble codes.
pub const MODE_STORED_DTCS: u8 = 0x03;

/// A positive reply echoes the request mode plus this offset.
pub const RESPONSE_SID_OFFSET: u8 = 0x40;

/// Classic CAN payload limit. CAN-FD is out of scope.
pub const MAX_DATA_LEN: usize = 8;

/// One frame as captured off the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanFrame {
    pub id: u32,
    pub data: Vec<u8>,
}

impl CanFrame {
    pub fn new(id: u32, data: Vec<u8>) -> Self {
        Self { id, data }
    }

    pub fn is_obd_response(&self) -> bool {
        is_obd_response(self.id)
    }
}

pub fn is_obd_response(id: u32) -> bool {
    OBD_RESPONSE_IDS.contains(&id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obd_response_window() {
        assert!(is_obd_response(0x7E8));
        assert!(is_obd_response(0x7EF));
        assert!(!is_obd_response(0x7E7));
        assert!(!is_obd_response(0x7F0));
        // functional request ID is not a reply
        assert!(!CanFrame::new(0x7DF, vec![0x02, 0x01, 0x0C]).is_obd_response());
    }

    #[test]
    fn frame_serializes_as_byte_list() {
        let frame = CanFrame::new(0x0C0, vec![0x2C, 0x1A]);
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(json, r#"{"id":192,"data":[44,26]}"#);
        let back: CanFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(back, frame);
    }
}

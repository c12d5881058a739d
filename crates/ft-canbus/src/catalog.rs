//! Static CAN signal catalog. Hand-authored, Intel (little-endian) layout.
//!
//! Generic powertrain/body message set. Not a DBC loader: the table is
//! fixed at compile time and never changes for the life of the process.

/// One signal inside a CAN message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanSignalDefinition {
    pub name: &'static str,
    /// Bit offset from the least significant bit of byte 0 (0–63).
    pub start_bit: u8,
    /// Width in bits (1–64).
    pub length: u8,
    pub scale: f64,
    pub offset: f64,
    pub unit: &'static str,
}

impl CanSignalDefinition {
    const fn new(
        name: &'static str,
        start_bit: u8,
        length: u8,
        scale: f64,
        offset: f64,
        unit: &'static str,
    ) -> Self {
        Self {
            name,
            start_bit,
            length,
            scale,
            offset,
            unit,
        }
    }

    /// Whether the signal's bit range fits in a payload of `data_len` bytes.
    pub fn fits(&self, data_len: usize) -> bool {
        usize::from(self.start_bit) + usize::from(self.length) <= data_len * 8
    }
}

/// A CAN message: arbitration ID plus its signals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanMessageDefinition {
    pub id: u32,
    pub name: &'static str,
    pub signals: &'static [CanSignalDefinition],
}

const ENGINE_DATA_1: &[CanSignalDefinition] = &[
    CanSignalDefinition::new("engine_rpm", 0, 16, 0.25, 0.0, "rpm"),
    CanSignalDefinition::new("engine_torque", 16, 16, 0.1, -500.0, "Nm"),
];

const ENGINE_DATA_2: &[CanSignalDefinition] = &[
    CanSignalDefinition::new("coolant_temp", 0, 8, 1.0, -40.0, "°C"),
    CanSignalDefinition::new("oil_pressure", 8, 8, 4.0, 0.0, "kPa"),
    CanSignalDefinition::new("oil_temp", 16, 8, 1.0, -40.0, "°C"),
];

const VEHICLE_SPEED: &[CanSignalDefinition] = &[
    CanSignalDefinition::new("vehicle_speed", 0, 16, 0.01, 0.0, "km/h"),
    CanSignalDefinition::new("wheel_speed_fl", 16, 16, 0.01, 0.0, "km/h"),
    CanSignalDefinition::new("wheel_speed_fr", 32, 16, 0.01, 0.0, "km/h"),
];

const BRAKE_DATA: &[CanSignalDefinition] = &[
    CanSignalDefinition::new("brake_pressure", 0, 16, 0.1, 0.0, "bar"),
    CanSignalDefinition::new("brake_pedal", 16, 8, 0.4, 0.0, "%"),
    CanSignalDefinition::new("abs_active", 24, 1, 1.0, 0.0, "bool"),
];

const TRANSMISSION_DATA: &[CanSignalDefinition] = &[
    CanSignalDefinition::new("gear_position", 0, 4, 1.0, 0.0, ""),
    CanSignalDefinition::new("trans_temp", 8, 8, 1.0, -40.0, "°C"),
];

const FUEL_DATA: &[CanSignalDefinition] = &[
    CanSignalDefinition::new("fuel_level", 0, 8, 0.5, 0.0, "%"),
    CanSignalDefinition::new("fuel_rate", 8, 16, 0.05, 0.0, "L/h"),
];

const BATTERY_DATA: &[CanSignalDefinition] = &[
    CanSignalDefinition::new("battery_voltage", 0, 16, 0.001, 0.0, "V"),
    CanSignalDefinition::new("alternator_load", 16, 8, 1.0, 0.0, "%"),
];

/// Every message the catalog models, in arbitration-ID order.
pub const MESSAGES: &[CanMessageDefinition] = &[
    CanMessageDefinition { id: 0x0C0, name: "Engine_Data_1", signals: ENGINE_DATA_1 },
    CanMessageDefinition { id: 0x0C1, name: "Engine_Data_2", signals: ENGINE_DATA_2 },
    CanMessageDefinition { id: 0x0D0, name: "Vehicle_Speed", signals: VEHICLE_SPEED },
    CanMessageDefinition { id: 0x0D1, name: "Brake_Data", signals: BRAKE_DATA },
    CanMessageDefinition { id: 0x0E0, name: "Transmission_Data", signals: TRANSMISSION_DATA },
    CanMessageDefinition { id: 0x3B0, name: "Fuel_Data", signals: FUEL_DATA },
    CanMessageDefinition { id: 0x3C0, name: "Battery_Data", signals: BATTERY_DATA },
];

/// Look up a message definition by arbitration ID.
pub fn lookup(id: u32) -> Option<&'static CanMessageDefinition> {
    MESSAGES.iter().find(|m| m.id == id)
}

/// Message name for an arbitration ID, if the catalog models it.
pub fn message_name(id: u32) -> Option<&'static str> {
    lookup(id).map(|m| m.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_message() {
        let msg = lookup(0x0C0).unwrap();
        assert_eq!(msg.name, "Engine_Data_1");
        assert_eq!(msg.signals.len(), 2);
        assert_eq!(message_name(0x3C0), Some("Battery_Data"));
    }

    #[test]
    fn lookup_unknown_message() {
        assert!(lookup(0x123).is_none());
        assert!(message_name(0x7E8).is_none());
    }

    #[test]
    fn catalog_fits_classic_can() {
        for msg in MESSAGES {
            for sig in msg.signals {
                assert!(sig.start_bit <= 63, "{} start bit", sig.name);
                assert!((1..=64).contains(&sig.length), "{} length", sig.name);
                assert!(sig.fits(8), "{} exceeds 8 bytes", sig.name);
            }
        }
    }

    #[test]
    fn ids_are_unique_and_sorted() {
        let ids: Vec<u32> = MESSAGES.iter().map(|m| m.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn fits_checks_bit_width() {
        let sig = CanSignalDefinition::new("x", 8, 16, 1.0, 0.0, "");
        assert!(sig.fits(3));
        assert!(!sig.fits(2));
    }
}

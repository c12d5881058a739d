//! Static DTC database: match-based lookup for common SAE J2012 codes.
//!
//! Returns description, severity and the affected vehicle system.

use ft_protocol::DtcSeverity;

/// DTC entry from the static database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DtcEntry {
    pub description: &'static str,
    pub severity: DtcSeverity,
    pub system: &'static str,
}

const fn entry(description: &'static str, severity: DtcSeverity, system: &'static str) -> DtcEntry {
    DtcEntry {
        description,
        severity,
        system,
    }
}

/// Look up a DTC code in the static database.
/// Input is case-insensitive and may carry surrounding whitespace.
pub fn lookup(code: &str) -> Option<DtcEntry> {
    let code = code.trim().to_uppercase();
    let found = match code.as_str() {
        // ===== Powertrain / Fuel and Air Metering =====
        "P0100" => entry("Mass Air Flow (MAF) Circuit Malfunction", DtcSeverity::High, "fuel"),
        "P0101" => entry("MAF Sensor Range/Performance", DtcSeverity::Medium, "fuel"),
        "P0102" => entry("MAF Sensor Circuit Low Input", DtcSeverity::Medium, "fuel"),
        "P0110" => entry("Intake Air Temperature Sensor Malfunction", DtcSeverity::Medium, "fuel"),
        "P0120" => entry("Throttle Position Sensor Malfunction", DtcSeverity::High, "fuel"),
        "P0130" => entry("O2 Sensor Circuit Malfunction (Bank 1)", DtcSeverity::Medium, "emissions"),
        "P0171" => entry("System Too Lean (Bank 1)", DtcSeverity::Medium, "fuel"),
        "P0172" => entry("System Too Rich (Bank 1)", DtcSeverity::Medium, "fuel"),

        // ===== Powertrain / Cooling =====
        "P0115" => entry("Engine Coolant Temperature Sensor Malfunction", DtcSeverity::High, "cooling"),
        "P0116" => entry("Coolant Temp Sensor Range/Performance", DtcSeverity::Medium, "cooling"),
        "P0117" => entry("Coolant Temp Sensor Circuit Low", DtcSeverity::Medium, "cooling"),
        "P0125" => entry("Insufficient Coolant Temperature for Fuel Control", DtcSeverity::Medium, "cooling"),
        "P0128" => entry("Coolant Thermostat Below Operating Temperature", DtcSeverity::Low, "cooling"),

        // ===== Powertrain / Ignition System =====
        "P0300" => entry("Random/Multiple Cylinder Misfire Detected", DtcSeverity::High, "ignition"),
        "P0301" => entry("Cylinder 1 Misfire Detected", DtcSeverity::High, "ignition"),
        "P0302" => entry("Cylinder 2 Misfire Detected", DtcSeverity::High, "ignition"),
        "P0303" => entry("Cylinder 3 Misfire Detected", DtcSeverity::High, "ignition"),
        "P0304" => entry("Cylinder 4 Misfire Detected", DtcSeverity::High, "ignition"),
        "P0335" => entry("Crankshaft Position Sensor Malfunction", DtcSeverity::Critical, "ignition"),
        "P0340" => entry("Camshaft Position Sensor Malfunction", DtcSeverity::Critical, "ignition"),

        // ===== Powertrain / Emission Controls =====
        "P0400" => entry("EGR Flow Malfunction", DtcSeverity::Medium, "emissions"),
        "P0420" => entry("Catalyst Efficiency Below Threshold (Bank 1)", DtcSeverity::Medium, "emissions"),
        "P0440" => entry("EVAP System Malfunction", DtcSeverity::Low, "emissions"),
        "P0442" => entry("EVAP System Small Leak Detected", DtcSeverity::Low, "emissions"),
        "P0455" => entry("EVAP System Large Leak Detected", DtcSeverity::Medium, "emissions"),

        // ===== Powertrain / Vehicle Speed / Idle =====
        "P0500" => entry("Vehicle Speed Sensor Malfunction", DtcSeverity::High, "drivetrain"),
        "P0505" => entry("Idle Air Control System Malfunction", DtcSeverity::Medium, "fuel"),

        // ===== Powertrain / Transmission =====
        "P0700" => entry("Transmission Control System Malfunction", DtcSeverity::High, "transmission"),
        "P0715" => entry("Input/Turbine Speed Sensor Malfunction", DtcSeverity::High, "transmission"),
        "P0730" => entry("Incorrect Gear Ratio", DtcSeverity::High, "transmission"),

        // ===== Chassis =====
        "C0035" => entry("Left Front Wheel Speed Sensor Circuit", DtcSeverity::High, "abs"),
        "C0040" => entry("Right Front Wheel Speed Sensor Circuit", DtcSeverity::High, "abs"),
        "C0050" => entry("Steering Assist Control Module", DtcSeverity::Critical, "steering"),

        // ===== Body =====
        "B0001" => entry("Driver Frontal Stage 1 Deployment Control", DtcSeverity::Critical, "airbag"),
        "B0028" => entry("Airbag Warning Lamp Circuit", DtcSeverity::High, "airbag"),
        "B0100" => entry("Electronic Frontal Sensor 1", DtcSeverity::Critical, "airbag"),

        // ===== Network/Communication =====
        "U0001" => entry("High Speed CAN Communication Bus", DtcSeverity::High, "network"),
        "U0100" => entry("Lost Communication with ECM/PCM", DtcSeverity::Critical, "network"),
        "U0121" => entry("Lost Communication with ABS", DtcSeverity::Critical, "network"),
        "U0140" => entry("Lost Communication with BCM", DtcSeverity::High, "network"),

        _ => return None,
    };
    Some(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ignition_code() {
        let entry = lookup("P0301").unwrap();
        assert!(entry.description.contains("Misfire"));
        assert_eq!(entry.severity, DtcSeverity::High);
        assert_eq!(entry.system, "ignition");
    }

    #[test]
    fn known_chassis_code() {
        let entry = lookup("C0035").unwrap();
        assert!(entry.description.contains("Wheel Speed"));
        assert_eq!(entry.system, "abs");
    }

    #[test]
    fn known_network_code() {
        let entry = lookup("U0100").unwrap();
        assert!(entry.description.contains("Lost Communication"));
        assert_eq!(entry.severity, DtcSeverity::Critical);
    }

    #[test]
    fn unknown_code_returns_none() {
        assert!(lookup("P9999").is_none());
        assert!(lookup("XXXXX").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn case_insensitive_lookup() {
        assert!(lookup("p0300").is_some());
        assert!(lookup("  c0035 ").is_some());
        assert!(lookup("u0100").is_some());
    }

    #[test]
    fn evap_codes_are_low() {
        assert_eq!(lookup("P0440").unwrap().severity, DtcSeverity::Low);
        assert_eq!(lookup("P0442").unwrap().severity, DtcSeverity::Low);
    }

    #[test]
    fn steering_is_critical() {
        let entry = lookup("C0050").unwrap();
        assert_eq!(entry.severity, DtcSeverity::Critical);
        assert_eq!(entry.system, "steering");
    }
}

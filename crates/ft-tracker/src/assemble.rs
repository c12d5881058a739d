//! Merge one cycle's raw sample into a canonical `TelemetryReading`.
//!
//! OBD-II PIDs are the primary source for engine metrics. Broadcast CAN
//! signals only fill fields the PIDs left empty, but every decoded signal
//! is kept in `can_signals`.

use chrono::{DateTime, Utc};
use ft_canbus::{decoder, obd, PidId};
use ft_protocol::TelemetryReading;

use crate::source::RawSample;

/// Build the reading for `vehicle_id` from everything captured this cycle.
pub fn assemble(vehicle_id: i64, sample: &RawSample, timestamp: DateTime<Utc>) -> TelemetryReading {
    let mut reading = TelemetryReading::new(vehicle_id, timestamp);

    for (code, data) in &sample.pid_responses {
        let decoded = PidId::from_code(code).and_then(|pid| obd::decode(pid, data).map(|v| (pid, v)));
        match decoded {
            Ok((pid, value)) => apply_pid(&mut reading, pid, value),
            Err(e) => tracing::warn!(vehicle_id, pid = %code, error = %e, "PID response skipped"),
        }
    }

    for frame in &sample.can_frames {
        reading.can_signals.extend(decoder::decode(frame));
    }
    fill_from_can(&mut reading);

    if !sample.nmea.is_empty() {
        reading.apply_fix(&ft_gps::parse(&sample.nmea));
    }

    for payload in &sample.dtc_payloads {
        let codes = match obd::decode_dtc_response(payload) {
            Ok(codes) => codes,
            Err(e) => {
                tracing::warn!(vehicle_id, error = %e, "DTC response skipped");
                continue;
            }
        };
        for code in codes {
            if !reading.dtc_codes.contains(&code) {
                reading.dtc_codes.push(code);
            }
        }
    }

    if let Some((x, y, z)) = sample.acceleration {
        reading.acceleration_x = Some(x);
        reading.acceleration_y = Some(y);
        reading.acceleration_z = Some(z);
    }

    reading
}

fn apply_pid(reading: &mut TelemetryReading, pid: PidId, value: f64) {
    let slot = match pid {
        PidId::EngineLoad => &mut reading.engine_load,
        PidId::CoolantTemp => &mut reading.coolant_temp,
        PidId::FuelPressure => &mut reading.fuel_pressure,
        PidId::IntakePressure => &mut reading.intake_pressure,
        PidId::EngineRpm => &mut reading.engine_rpm,
        PidId::VehicleSpeed => &mut reading.vehicle_speed,
        PidId::IntakeAirTemp => &mut reading.intake_air_temp,
        PidId::MafRate => &mut reading.mass_air_flow,
        PidId::ThrottlePosition => &mut reading.throttle_position,
        PidId::FuelLevel => &mut reading.fuel_level,
        PidId::ControlModuleVoltage => &mut reading.battery_voltage,
        PidId::OilTemp => &mut reading.engine_oil_temp,
    };
    *slot = Some(value);
}

/// CAN signal name → reading field, filled only when still empty.
fn fill_from_can(reading: &mut TelemetryReading) {
    let signal = |name: &str| reading.can_signals.get(name).map(|s| s.value);
    let engine_rpm = signal("engine_rpm");
    let vehicle_speed = signal("vehicle_speed");
    let coolant_temp = signal("coolant_temp");
    let oil_temp = signal("oil_temp");
    let fuel_level = signal("fuel_level");
    let fuel_rate = signal("fuel_rate");
    let battery_voltage = signal("battery_voltage");

    reading.engine_rpm = reading.engine_rpm.or(engine_rpm);
    reading.vehicle_speed = reading.vehicle_speed.or(vehicle_speed);
    reading.coolant_temp = reading.coolant_temp.or(coolant_temp);
    reading.engine_oil_temp = reading.engine_oil_temp.or(oil_temp);
    reading.fuel_level = reading.fuel_level.or(fuel_level);
    reading.fuel_consumption_rate = reading.fuel_consumption_rate.or(fuel_rate);
    reading.battery_voltage = reading.battery_voltage.or(battery_voltage);
}

//! Sensor sources: where a vehicle's raw bytes come from each poll cycle.
//!
//! `SensorSource` trait with two impls:
//! - `ReplaySource`: recorded capture file, one sample per cycle
//! - `MockSensorSource`: scripted in-memory samples (in `mock.rs`)
//!
//! Choosing between sources is configuration; nothing here falls back from
//! one to another.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use ft_canbus::CanFrame;
use thiserror::Error;

/// Errors raised by a sensor source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("sensor source exhausted")]
    Exhausted,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("capture line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Convenience alias for source results.
pub type SourceResult<T> = Result<T, SourceError>;

/// Raw, undecoded data captured in one poll cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSample {
    /// Broadcast CAN frames.
    pub can_frames: Vec<CanFrame>,
    /// Mode 01 responses as `(code, data bytes)`, e.g. `("010C", [0x1A, 0x2C])`.
    pub pid_responses: Vec<(String, Vec<u8>)>,
    /// NMEA sentences from the GPS receiver.
    pub nmea: Vec<String>,
    /// Mode 03 response payloads.
    pub dtc_payloads: Vec<Vec<u8>>,
    /// Accelerometer `(x, y, z)` in m/s².
    pub acceleration: Option<(f64, f64, f64)>,
}

impl RawSample {
    pub fn is_empty(&self) -> bool {
        self.can_frames.is_empty()
            && self.pid_responses.is_empty()
            && self.nmea.is_empty()
            && self.dtc_payloads.is_empty()
            && self.acceleration.is_none()
    }
}

/// A producer of raw samples for one vehicle.
#[async_trait]
pub trait SensorSource: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Read the next cycle's sample.
    async fn next_sample(&self) -> SourceResult<RawSample>;
}

/// Replays a recorded capture, one cycle per call.
///
/// Capture format, one record per line (`#` starts a comment):
///
/// ```text
/// 0C0#2C1A8813                 CAN frame, candump style (hex ID # hex data)
/// pid 010C 1A2C                Mode 01 response data bytes
/// $GPRMC,123519,A,...*6A       NMEA sentence
/// dtc 43 02 01 03 01 71        Mode 03 payload
/// accel 0.1 -8.4 9.8           accelerometer x y z
/// ---                          end of cycle
/// ```
pub struct ReplaySource {
    name: String,
    samples: Vec<RawSample>,
    cursor: Mutex<usize>,
    looping: bool,
}

impl ReplaySource {
    /// Parse a capture held in memory.
    pub fn parse(name: impl Into<String>, capture: &str) -> SourceResult<Self> {
        Ok(Self {
            name: name.into(),
            samples: parse_capture(capture)?,
            cursor: Mutex::new(0),
            looping: false,
        })
    }

    /// Read and parse a capture file.
    pub async fn open(path: impl AsRef<Path>) -> SourceResult<Self> {
        let path = path.as_ref();
        let capture = tokio::fs::read_to_string(path).await?;
        Self::parse(path.display().to_string(), &capture)
    }

    /// Restart from the first cycle instead of reporting exhaustion.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Number of cycles in the capture.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[async_trait]
impl SensorSource for ReplaySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_sample(&self) -> SourceResult<RawSample> {
        let mut cursor = self.cursor.lock().unwrap_or_else(|e| e.into_inner());
        if *cursor >= self.samples.len() {
            if !self.looping || self.samples.is_empty() {
                return Err(SourceError::Exhausted);
            }
            *cursor = 0;
        }
        let sample = self.samples[*cursor].clone();
        *cursor += 1;
        Ok(sample)
    }
}

/// Split a capture into per-cycle samples.
pub fn parse_capture(capture: &str) -> SourceResult<Vec<RawSample>> {
    let mut samples = Vec::new();
    let mut current = RawSample::default();

    for (idx, raw_line) in capture.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let err = |reason: &str| SourceError::Parse {
            line: line_no,
            reason: reason.to_string(),
        };

        if line == "---" {
            samples.push(std::mem::take(&mut current));
            continue;
        }

        if line.starts_with('$') {
            current.nmea.push(line.to_string());
            continue;
        }

        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("pid") => {
                let code = tokens.next().ok_or_else(|| err("pid record missing code"))?;
                let data = tokens.collect::<String>();
                let bytes = parse_hex(&data).ok_or_else(|| err("pid data is not hex"))?;
                current.pid_responses.push((code.to_uppercase(), bytes));
            }
            Some("dtc") => {
                let data = tokens.collect::<String>();
                let bytes = parse_hex(&data).ok_or_else(|| err("dtc payload is not hex"))?;
                current.dtc_payloads.push(bytes);
            }
            Some("accel") => {
                let axes: Vec<f64> = tokens
                    .map(str::parse::<f64>)
                    .collect::<Result<_, _>>()
                    .map_err(|_| err("accel values must be numbers"))?;
                let &[x, y, z] = axes.as_slice() else {
                    return Err(err("accel needs exactly three axes"));
                };
                current.acceleration = Some((x, y, z));
            }
            _ => {
                // candump lines may carry a timestamp and interface before the frame
                let frame = line
                    .split_whitespace()
                    .last()
                    .and_then(parse_candump_frame)
                    .ok_or_else(|| err("unrecognized record"))?;
                current.can_frames.push(frame);
            }
        }
    }

    if !current.is_empty() {
        samples.push(current);
    }
    Ok(samples)
}

/// Parse `ID#DATA`, both hex, e.g. `0C0#2C1A8813`.
pub fn parse_candump_frame(token: &str) -> Option<CanFrame> {
    let (id, data) = token.split_once('#')?;
    let id = u32::from_str_radix(id, 16).ok()?;
    Some(CanFrame::new(id, parse_hex(data)?))
}

fn parse_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 || !s.is_ascii() {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

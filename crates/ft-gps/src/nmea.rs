//! NMEA 0183 parsing: `GGA` and `RMC` sentences from GPS/GNSS talkers.
//!
//! Only `$GP` and `$GN` talkers are interpreted. Every other sentence is
//! ignored, and a malformed sentence is skipped without affecting the rest
//! of the batch.

use ft_protocol::GpsFix;
use thiserror::Error;

/// Knots to km/h.
pub const KNOTS_TO_KMH: f64 = 1.852;

const GGA_MIN_FIELDS: usize = 10;
const RMC_MIN_FIELDS: usize = 8;

/// Why a single sentence was rejected.
#[derive(Debug, Error, PartialEq)]
pub enum NmeaError {
    #[error("checksum mismatch: expected {expected:02X}, computed {computed:02X}")]
    Checksum { expected: u8, computed: u8 },

    #[error("invalid checksum field {0:?}")]
    ChecksumField(String),

    #[error("{kind} sentence has {got} fields, need at least {need}")]
    TooShort {
        kind: &'static str,
        got: usize,
        need: usize,
    },

    #[error("invalid {field} value {value:?}")]
    Field { field: &'static str, value: String },
}

/// A sentence this parser understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Sentence {
    /// Fix data: position, satellites in use, altitude.
    Gga {
        position: Option<(f64, f64)>,
        satellites: Option<u32>,
        altitude: Option<f64>,
    },
    /// Recommended minimum: position, speed over ground, course.
    Rmc {
        position: Option<(f64, f64)>,
        speed_kmh: Option<f64>,
        heading: Option<f64>,
    },
}

/// Parse a batch of sentences into a best-effort fix.
///
/// GGA is authoritative for position: RMC only fills latitude/longitude
/// when no earlier sentence in the batch has set them. Fields never reported stay
/// `None`.
pub fn parse<S: AsRef<str>>(sentences: &[S]) -> GpsFix {
    let mut fix = GpsFix::default();

    for line in sentences {
        let line = line.as_ref().trim();
        let sentence = match parse_sentence(line) {
            Ok(Some(s)) => s,
            Ok(None) => continue,
            Err(e) => {
                tracing::debug!(sentence = line, error = %e, "skipping NMEA sentence");
                continue;
            }
        };

        match sentence {
            Sentence::Gga {
                position,
                satellites,
                altitude,
            } => {
                if let Some((lat, lon)) = position {
                    fix.latitude = Some(lat);
                    fix.longitude = Some(lon);
                }
                fix.satellites = satellites.or(fix.satellites);
                fix.altitude = altitude.or(fix.altitude);
            }
            Sentence::Rmc {
                position,
                speed_kmh,
                heading,
            } => {
                if let (None, Some((lat, lon))) = (fix.latitude, position) {
                    fix.latitude = Some(lat);
                    fix.longitude = Some(lon);
                }
                fix.speed_kmh = speed_kmh.or(fix.speed_kmh);
                fix.heading = heading.or(fix.heading);
            }
        }
    }

    fix
}

/// Parse one sentence.
///
/// Returns `Ok(None)` for talkers or sentence types that are not
/// interpreted. A trailing `*hh` checksum is verified when present.
pub fn parse_sentence(line: &str) -> Result<Option<Sentence>, NmeaError> {
    if !(line.starts_with("$GP") || line.starts_with("$GN")) {
        return Ok(None);
    }

    let body = strip_checksum(line)?;
    let parts: Vec<&str> = body.split(',').collect();
    let kind = parts[0].get(3..).unwrap_or_default();

    match kind {
        "GGA" => {
            require_fields("GGA", &parts, GGA_MIN_FIELDS)?;
            Ok(Some(Sentence::Gga {
                position: parse_position(parts[2], parts[3], parts[4], parts[5])?,
                satellites: parse_opt(parts[7], "satellites")?,
                altitude: parse_opt(parts[9], "altitude")?,
            }))
        }
        "RMC" => {
            require_fields("RMC", &parts, RMC_MIN_FIELDS)?;
            let knots: Option<f64> = parse_opt(parts[7], "speed")?;
            let heading = match parts.get(8) {
                Some(field) => parse_opt(field, "heading")?,
                None => None,
            };
            Ok(Some(Sentence::Rmc {
                position: parse_position(parts[3], parts[4], parts[5], parts[6])?,
                speed_kmh: knots.map(|k| round_to(k * KNOTS_TO_KMH, 1)),
                heading,
            }))
        }
        _ => Ok(None),
    }
}

/// Convert an NMEA `(D)DDMM.MMMM` coordinate and hemisphere to decimal degrees.
///
/// Rounded to 6 decimal places; negative for `S` and `W`.
pub fn nmea_to_decimal(value: &str, hemisphere: &str) -> Result<f64, NmeaError> {
    let invalid = || NmeaError::Field {
        field: "coordinate",
        value: format!("{value},{hemisphere}"),
    };

    if !value.is_ascii() {
        return Err(invalid());
    }
    let dot = value.find('.').unwrap_or(value.len());
    if dot < 3 {
        return Err(invalid());
    }
    let (deg, min) = value.split_at(dot - 2);
    let degrees: f64 = deg.parse().map_err(|_| invalid())?;
    let minutes: f64 = min.parse().map_err(|_| invalid())?;
    if !(0.0..60.0).contains(&minutes) {
        return Err(invalid());
    }

    let decimal = round_to(degrees + minutes / 60.0, 6);
    match hemisphere {
        "N" | "E" => Ok(decimal),
        "S" | "W" => Ok(-decimal),
        _ => Err(invalid()),
    }
}

/// XOR of every byte between `$` and `*`.
pub fn checksum(body: &str) -> u8 {
    body.bytes().fold(0, |acc, b| acc ^ b)
}

/// Verify and remove a trailing `*hh` checksum.
fn strip_checksum(line: &str) -> Result<&str, NmeaError> {
    let Some((body, sum)) = line.split_once('*') else {
        return Ok(line);
    };
    let expected =
        u8::from_str_radix(sum.trim(), 16).map_err(|_| NmeaError::ChecksumField(sum.into()))?;
    let computed = checksum(&body[1..]);
    if expected != computed {
        return Err(NmeaError::Checksum { expected, computed });
    }
    Ok(body)
}

fn require_fields(kind: &'static str, parts: &[&str], need: usize) -> Result<(), NmeaError> {
    if parts.len() < need {
        return Err(NmeaError::TooShort {
            kind,
            got: parts.len(),
            need,
        });
    }
    Ok(())
}

/// Latitude and longitude, or `None` when the receiver has no fix yet.
fn parse_position(
    lat: &str,
    lat_hemi: &str,
    lon: &str,
    lon_hemi: &str,
) -> Result<Option<(f64, f64)>, NmeaError> {
    if lat.is_empty() || lon.is_empty() {
        return Ok(None);
    }
    Ok(Some((
        nmea_to_decimal(lat, lat_hemi)?,
        nmea_to_decimal(lon, lon_hemi)?,
    )))
}

fn parse_opt<T: std::str::FromStr>(
    field: &str,
    name: &'static str,
) -> Result<Option<T>, NmeaError> {
    if field.is_empty() {
        return Ok(None);
    }
    field.parse().map(Some).map_err(|_| NmeaError::Field {
        field: name,
        value: field.to_string(),
    })
}

fn round_to(v: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (v * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    const RMC: &str = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";
    const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";

    #[test]
    fn coordinate_conversion() {
        assert_eq!(nmea_to_decimal("4807.038", "N").unwrap(), 48.1173);
        assert_eq!(nmea_to_decimal("01131.000", "E").unwrap(), 11.516667);
        assert_eq!(nmea_to_decimal("4807.038", "S").unwrap(), -48.1173);
        assert_eq!(nmea_to_decimal("01131.000", "W").unwrap(), -11.516667);
    }

    #[test]
    fn coordinate_rejects_garbage() {
        assert!(nmea_to_decimal("07.5", "N").is_err());
        assert!(nmea_to_decimal("48x7.038", "N").is_err());
        assert!(nmea_to_decimal("4807.038", "Q").is_err());
        assert!(nmea_to_decimal("4875.000", "N").is_err());
    }

    #[test]
    fn parse_gga() {
        let fix = parse(&[GGA]);
        assert_eq!(fix.latitude, Some(48.1173));
        assert_eq!(fix.longitude, Some(11.516667));
        assert_eq!(fix.altitude, Some(545.4));
        assert_eq!(fix.satellites, Some(8));
        assert_eq!(fix.speed_kmh, None);
    }

    #[test]
    fn parse_rmc_speed_and_heading() {
        let fix = parse(&[RMC]);
        assert_eq!(fix.latitude, Some(48.1173));
        // 22.4 kn * 1.852 = 41.4848
        assert_eq!(fix.speed_kmh, Some(41.5));
        assert_eq!(fix.heading, Some(84.4));
        assert_eq!(fix.altitude, None);
    }

    #[test]
    fn gga_position_wins_over_rmc() {
        let rmc_elsewhere = "$GNRMC,123520,A,5130.000,N,00007.000,W,010.0,180.0,230394,,";
        let fix = parse(&[GGA, rmc_elsewhere]);
        assert_eq!(fix.latitude, Some(48.1173));
        assert_eq!(fix.speed_kmh, Some(18.5));
        assert_eq!(fix.heading, Some(180.0));

        let fix = parse(&[rmc_elsewhere, GGA]);
        assert_eq!(fix.latitude, Some(48.1173));
        assert_eq!(fix.longitude, Some(11.516667));
    }

    #[test]
    fn ignores_other_talkers_and_types() {
        let fix = parse(&[
            "$GLGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,",
            "$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K",
            "!AIVDM,1,1,,A,13aEOK?P00PD2wVMdLDRhgvL289?,0*26",
            "",
        ]);
        assert_eq!(fix, GpsFix::default());
    }

    #[test]
    fn malformed_sentences_are_skipped_individually() {
        let fix = parse(&[
            "$GPGGA,123519,4807.038,N",
            "$GPRMC,123519,A,48xx.038,N,01131.000,E,022.4,084.4,230394,003.1,W",
            "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*00",
            RMC,
        ]);
        assert_eq!(fix.latitude, Some(48.1173));
        assert_eq!(fix.speed_kmh, Some(41.5));
        assert_eq!(fix.satellites, None);
    }

    #[test]
    fn non_ascii_coordinate_is_skipped() {
        assert!(nmea_to_decimal("\u{e9}7.038", "N").is_err());
        assert!(nmea_to_decimal("48\u{b0}07.038", "N").is_err());

        let fix = parse(&[
            "$GPGGA,123519,\u{e9}7.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,",
            RMC,
        ]);
        assert_eq!(fix.latitude, Some(48.1173));
        assert_eq!(fix.longitude, Some(11.516667));
        assert_eq!(fix.satellites, None);
    }

    #[test]
    fn empty_fields_stay_unknown() {
        let fix = parse(&["$GPGGA,123519,,,,,0,,,,M,,M,,"]);
        assert_eq!(fix, GpsFix::default());
        assert!(!fix.has_position());
    }

    #[test]
    fn checksum_verification() {
        assert!(parse_sentence(GGA).unwrap().is_some());
        let bad = GGA.replace("*47", "*48");
        assert_eq!(
            parse_sentence(&bad),
            Err(NmeaError::Checksum {
                expected: 0x48,
                computed: 0x47
            })
        );
        assert!(matches!(
            parse_sentence("$GPGGA,1*ZZ"),
            Err(NmeaError::ChecksumField(_))
        ));
    }

    #[test]
    fn short_rmc_without_heading() {
        let fix = parse(&["$GPRMC,123519,A,4807.038,N,01131.000,E,000.0"]);
        assert_eq!(fix.speed_kmh, Some(0.0));
        assert_eq!(fix.heading, None);
    }
}

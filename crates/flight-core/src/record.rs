// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Display-ready flight records.
//!
//! A [`FlightRecord`] carries everything the detail panel shows for one
//! aircraft, already formatted as display strings. Producers that cannot fill
//! a field leave it empty or `None`; readers resolve those to [`NOT_AVAILABLE`].

use serde::{Deserialize, Serialize};

/// Sentinel shown for any field the active producer does not populate.
pub const NOT_AVAILABLE: &str = "N/A";

/// Rich airport details, only known for the static catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportInfo {
    /// Full airport name.
    pub name: String,
    /// City served.
    pub city: String,
    /// Country.
    pub country: String,
    /// Terminal the flight uses.
    pub terminal: String,
    /// Local departure or arrival time.
    pub local_time: String,
}

/// Displayable attributes of a single aircraft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightRecord {
    /// Store key: callsign, transponder code, or synthetic id.
    pub id: String,
    /// Flight number shown in the panel header.
    pub number: String,
    /// Ground speed with unit, e.g. `845 km/h`.
    pub speed: String,
    /// Altitude with unit, e.g. `10,700 m`.
    pub altitude: String,
    /// Aircraft type or transponder descriptor.
    pub aircraft: String,
    /// Origin airport code.
    pub origin: String,
    /// Destination airport code.
    pub destination: String,
    pub origin_info: Option<AirportInfo>,
    pub destination_info: Option<AirportInfo>,
    /// Heading in degrees (live and simulated records only).
    pub heading: Option<String>,
    /// Vertical rate with unit (live and simulated records only).
    pub vertical_rate: Option<String>,
}

impl FlightRecord {
    /// Create a record with every display field set to the sentinel.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            number: id.clone(),
            id,
            speed: NOT_AVAILABLE.to_string(),
            altitude: NOT_AVAILABLE.to_string(),
            aircraft: NOT_AVAILABLE.to_string(),
            origin: NOT_AVAILABLE.to_string(),
            destination: NOT_AVAILABLE.to_string(),
            origin_info: None,
            destination_info: None,
            heading: None,
            vertical_rate: None,
        }
    }
}

/// Return `value`, or the sentinel if it is blank.
#[must_use]
pub fn or_sentinel(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_AVAILABLE
    } else {
        value
    }
}

/// Format an integer with comma thousands separators (`10700` -> `10,700`).
#[must_use]
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[allow(clippy::cast_possible_truncation, reason = "display values are far below i64 range")]
fn round_to_i64(value: f64) -> i64 {
    value.round() as i64
}

/// Speed in km/h, e.g. `845 km/h`.
#[must_use]
pub fn format_speed_kmh(kmh: f64) -> String {
    format!("{} km/h", format_thousands(round_to_i64(kmh)))
}

/// Altitude in metres, e.g. `10,700 m`.
#[must_use]
pub fn format_altitude_m(metres: f64) -> String {
    format!("{} m", format_thousands(round_to_i64(metres)))
}

/// Heading in whole degrees, e.g. `275°`.
#[must_use]
pub fn format_heading(degrees: f64) -> String {
    format!("{}°", round_to_i64(degrees.rem_euclid(360.0)) % 360)
}

/// Signed vertical rate in m/s, e.g. `+2.5 m/s`.
#[must_use]
pub fn format_vertical_rate(metres_per_second: f64) -> String {
    format!("{metres_per_second:+.1} m/s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_separator() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(10_700), "10,700");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
        assert_eq!(format_thousands(-11_300), "-11,300");
    }

    #[test]
    fn test_unit_formatting() {
        assert_eq!(format_speed_kmh(845.4), "845 km/h");
        assert_eq!(format_altitude_m(10_699.6), "10,700 m");
        assert_eq!(format_heading(359.7), "0°");
        assert_eq!(format_heading(-90.0), "270°");
        assert_eq!(format_vertical_rate(2.46), "+2.5 m/s");
        assert_eq!(format_vertical_rate(-0.3), "-0.3 m/s");
    }

    #[test]
    fn test_new_record_uses_sentinel() {
        let record = FlightRecord::new("SIM-01");
        assert_eq!(record.number, "SIM-01");
        assert_eq!(record.speed, NOT_AVAILABLE);
        assert_eq!(or_sentinel("  "), NOT_AVAILABLE);
        assert_eq!(or_sentinel("JFK"), "JFK");
    }
}

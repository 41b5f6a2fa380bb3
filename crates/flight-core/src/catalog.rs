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

//! Hardcoded flight catalog.
//!
//! Five named long-haul flights with full airport details and fixed overlay
//! positions. Loading it is pure and deterministic.

use std::collections::HashMap;

use crate::projection::{MarkerPosition, PresetPositions};
use crate::record::{AirportInfo, FlightRecord};

struct CatalogEntry {
    number: &'static str,
    speed: &'static str,
    altitude: &'static str,
    aircraft: &'static str,
    origin: (&'static str, [&'static str; 5]),
    destination: (&'static str, [&'static str; 5]),
    position: (f32, f32),
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        number: "AA1234",
        speed: "845 km/h",
        altitude: "10,700 m",
        aircraft: "Boeing 787-9",
        origin: ("JFK", ["John F. Kennedy International Airport", "New York", "United States", "7", "18:30 EST"]),
        destination: ("LHR", ["Heathrow Airport", "London", "United Kingdom", "5", "06:45 GMT"]),
        position: (30.0, 25.0),
    },
    CatalogEntry {
        number: "DL5678",
        speed: "910 km/h",
        altitude: "11,300 m",
        aircraft: "Airbus A330-900neo",
        origin: ("ATL", ["Hartsfield-Jackson Atlanta International Airport", "Atlanta", "United States", "I", "20:15 EST"]),
        destination: ("CDG", ["Charles de Gaulle Airport", "Paris", "France", "2E", "10:30 CET"]),
        position: (45.0, 35.0),
    },
    CatalogEntry {
        number: "UA9012",
        speed: "780 km/h",
        altitude: "9,800 m",
        aircraft: "Boeing 777-200ER",
        origin: ("SFO", ["San Francisco International Airport", "San Francisco", "United States", "International", "12:45 PST"]),
        destination: ("NRT", ["Narita International Airport", "Tokyo", "Japan", "1", "16:20 JST"]),
        position: (25.0, 70.0),
    },
    CatalogEntry {
        number: "LH3456",
        speed: "820 km/h",
        altitude: "10,200 m",
        aircraft: "Airbus A350-900",
        origin: ("FRA", ["Frankfurt Airport", "Frankfurt", "Germany", "1", "14:20 CET"]),
        destination: ("DXB", ["Dubai International Airport", "Dubai", "UAE", "3", "22:45 GST"]),
        position: (55.0, 55.0),
    },
    CatalogEntry {
        number: "BA7890",
        speed: "870 km/h",
        altitude: "11,000 m",
        aircraft: "Airbus A380",
        origin: ("LHR", ["Heathrow Airport", "London", "United Kingdom", "5", "21:10 GMT"]),
        destination: ("SIN", ["Changi Airport", "Singapore", "Singapore", "3", "17:30 SGT"]),
        position: (65.0, 45.0),
    },
];

fn airport(fields: [&str; 5]) -> AirportInfo {
    let [name, city, country, terminal, local_time] = fields;
    AirportInfo {
        name: name.to_string(),
        city: city.to_string(),
        country: country.to_string(),
        terminal: terminal.to_string(),
        local_time: local_time.to_string(),
    }
}

/// Catalog records in display order, plus their fixed marker positions.
#[must_use]
pub fn load() -> (Vec<FlightRecord>, PresetPositions) {
    let mut positions = HashMap::with_capacity(CATALOG.len());
    let records = CATALOG
        .iter()
        .map(|entry| {
            let mut record = FlightRecord::new(entry.number);
            record.speed = entry.speed.to_string();
            record.altitude = entry.altitude.to_string();
            record.aircraft = entry.aircraft.to_string();
            record.origin = entry.origin.0.to_string();
            record.destination = entry.destination.0.to_string();
            record.origin_info = Some(airport(entry.origin.1));
            record.destination_info = Some(airport(entry.destination.1));

            let (top, left) = entry.position;
            positions.insert(record.id.clone(), MarkerPosition::new(top, left));
            record
        })
        .collect();

    (records, PresetPositions::new(positions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::Projection;

    #[test]
    fn test_catalog_contents() {
        let (records, _) = load();
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["AA1234", "DL5678", "UA9012", "LH3456", "BA7890"]);

        let aa = &records[0];
        assert_eq!(aa.speed, "845 km/h");
        assert_eq!(aa.origin, "JFK");
        assert_eq!(aa.destination, "LHR");
        assert_eq!(aa.origin_info.as_ref().unwrap().terminal, "7");
        assert!(aa.heading.is_none());
        assert!(aa.vertical_rate.is_none());
    }

    #[test]
    fn test_catalog_is_deterministic() {
        let (first, mut first_positions) = load();
        let (second, mut second_positions) = load();
        assert_eq!(first, second);
        for record in &first {
            assert_eq!(first_positions.project(record), second_positions.project(record));
        }
    }
}

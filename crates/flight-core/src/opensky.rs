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

//! Live state vectors from the OpenSky Network REST API.
//!
//! Issues a single bounding-box query per request and turns the returned
//! state vectors into flight records. The API encodes each vector as a
//! positional JSON array; see [`StateVector::from_row`] for the field order.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FeedError;
use crate::record::{
    format_altitude_m, format_heading, format_speed_kmh, format_vertical_rate, FlightRecord,
};

/// Default OpenSky REST endpoint.
pub const DEFAULT_FEED_URL: &str = "https://opensky-network.org/api";

/// Approximate kilometres per degree, valid near the equator only.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Geographic query area, serialized as the `lamin/lomin/lamax/lomax` query string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lamin: f64,
    pub lomin: f64,
    pub lamax: f64,
    pub lomax: f64,
}

impl BoundingBox {
    /// Square box of `radius_km` around `(latitude, longitude)`.
    ///
    /// Uses the same degree delta on both axes, so boxes away from the equator
    /// are narrower east-west than requested.
    #[must_use]
    pub fn around(latitude: f64, longitude: f64, radius_km: f64) -> Self {
        let delta = radius_km.abs() / KM_PER_DEGREE;
        Self {
            lamin: latitude - delta,
            lomin: longitude - delta,
            lamax: latitude + delta,
            lomax: longitude + delta,
        }
    }

    /// True if the point lies inside the box, edges included.
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.lamin..=self.lamax).contains(&latitude) && (self.lomin..=self.lomax).contains(&longitude)
    }
}

/// Raw `/states/all` response body.
#[derive(Debug, Deserialize)]
struct StatesResponse {
    #[serde(default)]
    states: Option<Vec<Vec<Value>>>,
}

/// One aircraft state vector.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    /// ICAO 24-bit transponder address (hex string).
    pub icao24: String,
    pub callsign: Option<String>,
    pub origin_country: String,
    pub last_contact: Option<DateTime<Utc>>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    /// Barometric altitude in metres.
    pub baro_altitude: Option<f64>,
    /// Ground speed in m/s.
    pub velocity: Option<f64>,
    /// True track in degrees clockwise from north.
    pub true_track: Option<f64>,
    /// Vertical rate in m/s.
    pub vertical_rate: Option<f64>,
    /// Geometric altitude in metres.
    pub geo_altitude: Option<f64>,
}

impl StateVector {
    /// Decode one positional row.
    ///
    /// Field order: icao24, callsign, origin_country, time_position,
    /// last_contact, longitude, latitude, baro_altitude, on_ground, velocity,
    /// true_track, vertical_rate, sensors, geo_altitude, ...
    /// Returns `None` for rows without an identifier.
    #[must_use]
    pub fn from_row(row: &[Value]) -> Option<Self> {
        let field = |i: usize| row.get(i).filter(|v| !v.is_null());
        let number = |i: usize| field(i).and_then(Value::as_f64);

        let icao24 = field(0)?.as_str()?.trim().to_string();
        if icao24.is_empty() {
            return None;
        }

        let callsign = field(1)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string);

        let last_contact = field(4)
            .and_then(Value::as_i64)
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single());

        Some(Self {
            icao24,
            callsign,
            origin_country: field(2).and_then(Value::as_str).unwrap_or_default().to_string(),
            last_contact,
            longitude: number(5),
            latitude: number(6),
            baro_altitude: number(7),
            velocity: number(9),
            true_track: number(10),
            vertical_rate: number(11),
            geo_altitude: number(13),
        })
    }

    /// Barometric altitude, falling back to geometric.
    #[must_use]
    pub fn altitude(&self) -> Option<f64> {
        self.baro_altitude.or(self.geo_altitude)
    }

    /// Position if the vector is usable on the overlay: both coordinates
    /// present and a positive altitude.
    #[must_use]
    pub fn usable_position(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude, self.altitude()) {
            (Some(lat), Some(lon), Some(alt)) if alt > 0.0 => Some((lat, lon)),
            _ => None,
        }
    }

    /// Build the display record for this vector.
    #[must_use]
    pub fn to_record(&self) -> FlightRecord {
        let mut record = FlightRecord::new(self.icao24.clone());
        record.number = self
            .callsign
            .clone()
            .unwrap_or_else(|| self.icao24.to_uppercase());
        if let Some(velocity) = self.velocity {
            record.speed = format_speed_kmh(velocity * 3.6);
        }
        if let Some(altitude) = self.altitude() {
            record.altitude = format_altitude_m(altitude);
        }
        record.aircraft = if self.origin_country.is_empty() {
            format!("Transponder {}", self.icao24.to_uppercase())
        } else {
            format!("Transponder {} ({})", self.icao24.to_uppercase(), self.origin_country)
        };
        record.heading = self.true_track.map(format_heading);
        record.vertical_rate = self.vertical_rate.map(format_vertical_rate);
        record
    }
}

/// Decode a `/states/all` response body.
pub fn parse_states(body: &str) -> Result<Vec<StateVector>, FeedError> {
    let response: StatesResponse = serde_json::from_str(body)?;
    let rows = response.states.unwrap_or_default();
    let total = rows.len();
    let vectors: Vec<_> = rows.iter().filter_map(|row| StateVector::from_row(row)).collect();
    if vectors.len() != total {
        debug!("Skipped {} malformed state vector rows", total - vectors.len());
    }
    Ok(vectors)
}

/// A live record together with its geographic position.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveFlight {
    pub record: FlightRecord,
    pub latitude: f64,
    pub longitude: f64,
}

/// Usable flights from one live query.
#[derive(Debug, Clone)]
pub struct LiveBatch {
    pub bbox: BoundingBox,
    pub flights: Vec<LiveFlight>,
    pub fetched_at: DateTime<Utc>,
    /// Most recent transponder contact among the kept flights.
    pub latest_contact: Option<DateTime<Utc>>,
}

impl LiveBatch {
    /// Filter vectors and build records.
    ///
    /// Vectors missing latitude or longitude, with a non-positive altitude or
    /// outside `bbox` are dropped. Fails with [`FeedError::EmptyResult`] if
    /// nothing is left.
    pub fn from_states(bbox: BoundingBox, states: &[StateVector]) -> Result<Self, FeedError> {
        let mut latest_contact: Option<DateTime<Utc>> = None;
        let flights: Vec<_> = states
            .iter()
            .filter_map(|state| {
                let (latitude, longitude) = state.usable_position()?;
                if !bbox.contains(latitude, longitude) {
                    return None;
                }
                latest_contact = latest_contact.max(state.last_contact);
                Some(LiveFlight {
                    record: state.to_record(),
                    latitude,
                    longitude,
                })
            })
            .collect();

        debug!("{} of {} state vectors usable", flights.len(), states.len());

        if flights.is_empty() {
            return Err(FeedError::EmptyResult);
        }

        Ok(Self {
            bbox,
            flights,
            fetched_at: Utc::now(),
            latest_contact,
        })
    }
}

/// Source of live batches.
///
/// Implemented by [`OpenSkyClient`]; the controller clones the source into
/// the task that performs the request.
pub trait LiveSource: Clone + Send + Sync + 'static {
    fn fetch_batch(
        &self,
        bbox: BoundingBox,
    ) -> impl Future<Output = Result<LiveBatch, FeedError>> + Send;
}

/// Minimal async client for the state vector endpoint.
#[derive(Debug, Clone)]
pub struct OpenSkyClient {
    http: reqwest::Client,
    base_url: String,
}

impl OpenSkyClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("flight-core/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn states_url(&self) -> String {
        format!("{}/states/all", self.base_url)
    }

    /// Fetch all state vectors inside `bbox`.
    pub async fn fetch_states(&self, bbox: BoundingBox) -> Result<Vec<StateVector>, FeedError> {
        info!(
            "Querying live feed lamin={:.3} lomin={:.3} lamax={:.3} lomax={:.3}",
            bbox.lamin, bbox.lomin, bbox.lamax, bbox.lomax
        );

        let response = self.http.get(self.states_url()).query(&bbox).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::Status(response.status()));
        }

        let body = response.text().await?;
        parse_states(&body)
    }

}

impl LiveSource for OpenSkyClient {
    async fn fetch_batch(&self, bbox: BoundingBox) -> Result<LiveBatch, FeedError> {
        let states = self.fetch_states(bbox).await?;
        LiveBatch::from_states(bbox, &states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "time": 1700000000,
        "states": [
            ["a1b2c3", "UAL123  ", "United States", 1700000000, 1700000001, -73.9, 40.7, 10668.0, false, 236.1, 275.4, 2.5, null, 10700.0, "1200", false, 0],
            ["d4e5f6", "", "Germany", null, 1700000001, -74.1, 40.6, null, false, 120.0, 90.0, -1.0, null, 3500.0, null, false, 0],
            ["0a0b0c", "DAL9   ", "United States", null, 1700000001, null, 40.6, 9000.0, false, 200.0, 90.0, 0.0, null, null, null, false, 0],
            ["ffffff", "GND1", "Canada", null, 1700000001, -73.8, 40.65, 0.0, true, 5.0, 0.0, 0.0, null, null, null, false, 0],
            [null, "BAD", "Nowhere"]
        ]
    }"#;

    #[test]
    fn test_bounding_box_uses_degree_approximation() {
        let bbox = BoundingBox::around(40.0, -74.0, 111.0);
        assert!((bbox.lamin - 39.0).abs() < 1e-9);
        assert!((bbox.lamax - 41.0).abs() < 1e-9);
        assert!((bbox.lomin - -75.0).abs() < 1e-9);
        assert!((bbox.lomax - -73.0).abs() < 1e-9);
        assert!(bbox.contains(40.5, -74.5));
        assert!(!bbox.contains(42.0, -74.0));
    }

    #[test]
    fn test_parse_states_skips_rows_without_identifier() {
        let states = parse_states(SAMPLE).unwrap();
        assert_eq!(states.len(), 4);

        let first = &states[0];
        assert_eq!(first.icao24, "a1b2c3");
        assert_eq!(first.callsign.as_deref(), Some("UAL123"));
        assert_eq!(first.origin_country, "United States");
        assert_eq!(first.latitude, Some(40.7));
        assert_eq!(first.baro_altitude, Some(10668.0));
        assert!(first.last_contact.is_some());

        // Blank callsign becomes None
        assert!(states[1].callsign.is_none());
    }

    #[test]
    fn test_parse_null_states() {
        let states = parse_states(r#"{"time": 1700000000, "states": null}"#).unwrap();
        assert!(states.is_empty());
    }

    #[test]
    fn test_parse_invalid_body() {
        assert!(matches!(parse_states("<html>"), Err(FeedError::Decode(_))));
    }

    #[test]
    fn test_batch_filters_unusable_vectors() {
        let bbox = BoundingBox::around(40.7, -73.9, 100.0);
        let states = parse_states(SAMPLE).unwrap();
        let batch = LiveBatch::from_states(bbox, &states).unwrap();

        let ids: Vec<_> = batch.flights.iter().map(|f| f.record.id.as_str()).collect();
        // Missing longitude and zero altitude are dropped; geo altitude fallback keeps d4e5f6
        assert_eq!(ids, ["a1b2c3", "d4e5f6"]);
        assert_eq!(batch.latest_contact, Utc.timestamp_opt(1_700_000_001, 0).single());
    }

    #[test]
    fn test_batch_drops_vectors_outside_box() {
        let states = parse_states(SAMPLE).unwrap();
        // Only a1b2c3 (40.7, -73.9) is inside this small box
        let bbox = BoundingBox::around(40.7, -73.9, 5.0);
        let batch = LiveBatch::from_states(bbox, &states).unwrap();

        let ids: Vec<_> = batch.flights.iter().map(|f| f.record.id.as_str()).collect();
        assert_eq!(ids, ["a1b2c3"]);

        let far_away = BoundingBox::around(-33.9, 151.2, 100.0);
        assert!(matches!(
            LiveBatch::from_states(far_away, &states),
            Err(FeedError::EmptyResult)
        ));
    }

    #[test]
    fn test_negative_barometric_altitude_is_not_usable() {
        // Barometric altitude wins over geometric even when it is below zero
        let row: Vec<Value> = serde_json::from_str(
            r#"["abc123", "LOW1", "Netherlands", null, 1700000001, 4.76, 52.31, -12.0, false, 70.0, 180.0, -3.0, null, 15.0]"#,
        )
        .unwrap();
        let state = StateVector::from_row(&row).unwrap();

        assert_eq!(state.altitude(), Some(-12.0));
        assert!(state.usable_position().is_none());

        let bbox = BoundingBox::around(52.31, 4.76, 50.0);
        assert!(matches!(
            LiveBatch::from_states(bbox, &[state]),
            Err(FeedError::EmptyResult)
        ));
    }

    #[test]
    fn test_record_from_state_vector() {
        let states = parse_states(SAMPLE).unwrap();
        let record = states[0].to_record();

        assert_eq!(record.id, "a1b2c3");
        assert_eq!(record.number, "UAL123");
        assert_eq!(record.speed, "850 km/h");
        assert_eq!(record.altitude, "10,668 m");
        assert_eq!(record.aircraft, "Transponder A1B2C3 (United States)");
        assert_eq!(record.heading.as_deref(), Some("275°"));
        assert_eq!(record.vertical_rate.as_deref(), Some("+2.5 m/s"));
        assert!(record.origin_info.is_none());

        // No callsign: fall back to the transponder code
        assert_eq!(states[1].to_record().number, "D4E5F6");
    }

    #[test]
    fn test_empty_batch_is_an_error() {
        let bbox = BoundingBox::around(0.0, 0.0, 50.0);
        let grounded = parse_states(SAMPLE)
            .unwrap()
            .into_iter()
            .filter(|s| s.baro_altitude == Some(0.0))
            .collect::<Vec<_>>();

        assert!(matches!(
            LiveBatch::from_states(bbox, &grounded),
            Err(FeedError::EmptyResult)
        ));
        assert!(matches!(LiveBatch::from_states(bbox, &[]), Err(FeedError::EmptyResult)));
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = OpenSkyClient::new("https://example.test/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.states_url(), "https://example.test/api/states/all");
    }
}

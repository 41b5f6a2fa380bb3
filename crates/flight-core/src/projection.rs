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

//! Placement of flight records onto the percentage-based overlay.
//!
//! Each producer injects its own [`Projection`]: geographic for live data,
//! preset positions for the static catalog and random placement for the
//! simulation. None of them aims for cartographic accuracy.

use std::collections::HashMap;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::opensky::BoundingBox;
use crate::record::FlightRecord;

/// Smallest percentage a marker may sit at on either axis.
pub const MIN_PERCENT: f32 = 5.0;
/// Largest percentage a marker may sit at on either axis.
pub const MAX_PERCENT: f32 = 95.0;

/// Marker position as percentages of the display region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPosition {
    /// Distance from the top edge, 0-100.
    pub top: f32,
    /// Distance from the left edge, 0-100.
    pub left: f32,
}

impl MarkerPosition {
    /// Center of the display region.
    pub const CENTER: Self = Self { top: 50.0, left: 50.0 };

    #[must_use]
    pub fn new(top: f32, left: f32) -> Self {
        Self { top, left }
    }

    /// Clamp both axes into the safe display range.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            top: self.top.clamp(MIN_PERCENT, MAX_PERCENT),
            left: self.left.clamp(MIN_PERCENT, MAX_PERCENT),
        }
    }

    /// Shift by the given deltas and clamp into the display range.
    #[must_use]
    pub fn nudged(self, d_top: f32, d_left: f32) -> Self {
        Self::new(self.top + d_top, self.left + d_left).clamped()
    }
}

/// Maps a record to its marker position.
pub trait Projection {
    fn project(&mut self, record: &FlightRecord) -> MarkerPosition;
}

/// Linear latitude/longitude mapping inside a bounding box.
///
/// North is up: `lamax` maps to the top edge, `lomin` to the left edge.
#[derive(Debug, Clone)]
pub struct GeoProjection {
    bbox: BoundingBox,
    coordinates: HashMap<String, (f64, f64)>,
}

impl GeoProjection {
    /// `coordinates` maps record ids to `(latitude, longitude)`.
    #[must_use]
    pub fn new(bbox: BoundingBox, coordinates: HashMap<String, (f64, f64)>) -> Self {
        Self { bbox, coordinates }
    }

    /// Project a raw coordinate pair.
    #[must_use]
    pub fn project_coordinate(&self, latitude: f64, longitude: f64) -> MarkerPosition {
        let lat_span = (self.bbox.lamax - self.bbox.lamin).max(f64::EPSILON);
        let lon_span = (self.bbox.lomax - self.bbox.lomin).max(f64::EPSILON);

        let top = (self.bbox.lamax - latitude) / lat_span * 100.0;
        let left = (longitude - self.bbox.lomin) / lon_span * 100.0;

        #[allow(clippy::cast_possible_truncation, reason = "percentages fit comfortably in f32")]
        let position = MarkerPosition::new(top as f32, left as f32);
        position.clamped()
    }
}

impl Projection for GeoProjection {
    fn project(&mut self, record: &FlightRecord) -> MarkerPosition {
        match self.coordinates.get(&record.id) {
            Some(&(lat, lon)) => self.project_coordinate(lat, lon),
            None => {
                debug!("No coordinate for {}, placing at center", record.id);
                MarkerPosition::CENTER
            }
        }
    }
}

/// Identity passthrough for records that arrive with a fixed position.
#[derive(Debug, Clone, Default)]
pub struct PresetPositions {
    positions: HashMap<String, MarkerPosition>,
}

impl PresetPositions {
    #[must_use]
    pub fn new(positions: HashMap<String, MarkerPosition>) -> Self {
        Self { positions }
    }
}

impl Projection for PresetPositions {
    fn project(&mut self, record: &FlightRecord) -> MarkerPosition {
        self.positions
            .get(&record.id)
            .copied()
            .unwrap_or(MarkerPosition::CENTER)
    }
}

/// Uniform random placement inside the display range.
#[derive(Debug)]
pub struct RandomPlacement {
    rng: StdRng,
}

impl RandomPlacement {
    #[must_use]
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }

    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl Projection for RandomPlacement {
    fn project(&mut self, _record: &FlightRecord) -> MarkerPosition {
        MarkerPosition::new(
            self.rng.gen_range(MIN_PERCENT..=MAX_PERCENT),
            self.rng.gen_range(MIN_PERCENT..=MAX_PERCENT),
        )
    }
}

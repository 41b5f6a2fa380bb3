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

//! Marker overlay.
//!
//! One [`Marker`] per record in the store. Markers hold only the flight id;
//! the presenter looks the record up again on selection so it always shows
//! current data.

use log::debug;

use crate::projection::{MarkerPosition, Projection};
use crate::store::FlightStore;

/// Opacity for markers when another flight is selected.
pub const REDUCED_OPACITY: f32 = 0.6;

/// Visual weight of a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emphasis {
    #[default]
    Full,
    Reduced,
}

impl Emphasis {
    #[must_use]
    pub fn opacity(self) -> f32 {
        match self {
            Emphasis::Full => 1.0,
            Emphasis::Reduced => REDUCED_OPACITY,
        }
    }
}

/// Visual proxy for a single flight record.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub flight_id: String,
    pub position: MarkerPosition,
    pub emphasis: Emphasis,
}

#[derive(Debug, Default)]
pub struct Overlay {
    markers: Vec<Marker>,
    highlighted: Option<String>,
}

impl Overlay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every marker and create one per record in `store`.
    pub fn rebuild(&mut self, store: &FlightStore, projection: &mut dyn Projection) {
        self.markers = store
            .iter()
            .map(|record| Marker {
                flight_id: record.id.clone(),
                position: projection.project(record),
                emphasis: Emphasis::Full,
            })
            .collect();
        self.highlighted = None;
        debug!("Overlay rebuilt with {} markers", self.markers.len());
    }

    /// Remove every marker.
    pub fn clear(&mut self) {
        self.markers.clear();
        self.highlighted = None;
    }

    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    #[must_use]
    pub fn marker(&self, flight_id: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.flight_id == flight_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    #[must_use]
    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    /// Emphasize `flight_id` and dim all others. Unknown ids are ignored.
    pub fn highlight(&mut self, flight_id: &str) -> bool {
        if self.marker(flight_id).is_none() {
            return false;
        }
        for marker in &mut self.markers {
            marker.emphasis = if marker.flight_id == flight_id {
                Emphasis::Full
            } else {
                Emphasis::Reduced
            };
        }
        self.highlighted = Some(flight_id.to_string());
        true
    }

    /// Restore full emphasis on every marker.
    pub fn clear_highlight(&mut self) {
        for marker in &mut self.markers {
            marker.emphasis = Emphasis::Full;
        }
        self.highlighted = None;
    }

    /// Shift a marker in place, clamped to the display range.
    pub fn move_marker(&mut self, flight_id: &str, d_top: f32, d_left: f32) -> bool {
        match self.markers.iter_mut().find(|m| m.flight_id == flight_id) {
            Some(marker) => {
                marker.position = marker.position.nudged(d_top, d_left);
                true
            }
            None => false,
        }
    }

    /// Marker nearest to a point, if within `radius` percentage points.
    ///
    /// The highlighted marker wins ties since it is painted on top.
    #[must_use]
    pub fn hit_test(&self, top: f32, left: f32, radius: f32) -> Option<&str> {
        let distance = |m: &Marker| {
            let dt = m.position.top - top;
            let dl = m.position.left - left;
            (dt * dt + dl * dl).sqrt()
        };

        let mut best: Option<(&Marker, f32)> = None;
        for marker in &self.markers {
            let d = distance(marker);
            if d > radius {
                continue;
            }
            let on_top = self.highlighted.as_deref() == Some(marker.flight_id.as_str());
            let better = match best {
                None => true,
                Some((_, best_d)) => d < best_d || (on_top && d <= best_d),
            };
            if better {
                best = Some((marker, d));
            }
        }
        best.map(|(m, _)| m.flight_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::projection::{PresetPositions, RandomPlacement};
    use crate::record::FlightRecord;

    fn static_overlay() -> (FlightStore, Overlay) {
        let (records, mut positions) = catalog::load();
        let mut store = FlightStore::new();
        store.replace_all(records);
        let mut overlay = Overlay::new();
        overlay.rebuild(&store, &mut positions);
        (store, overlay)
    }

    #[test]
    fn test_rebuild_creates_one_marker_per_record() {
        let (_, mut overlay) = static_overlay();
        assert_eq!(overlay.len(), 5);

        let mut store = FlightStore::new();
        store.replace_all(["SIM-01", "SIM-02"].into_iter().map(FlightRecord::new));
        overlay.rebuild(&store, &mut RandomPlacement::from_seed(1));

        let ids: Vec<_> = overlay.markers().iter().map(|m| m.flight_id.as_str()).collect();
        assert_eq!(ids, ["SIM-01", "SIM-02"]);
    }

    #[test]
    fn test_highlight_dims_others() {
        let (_, mut overlay) = static_overlay();
        assert!(overlay.highlight("UA9012"));

        for marker in overlay.markers() {
            let expected = if marker.flight_id == "UA9012" {
                Emphasis::Full
            } else {
                Emphasis::Reduced
            };
            assert_eq!(marker.emphasis, expected);
        }

        overlay.clear_highlight();
        assert!(overlay.markers().iter().all(|m| m.emphasis == Emphasis::Full));
        assert!(overlay.highlighted().is_none());
    }

    #[test]
    fn test_highlight_unknown_id_is_noop() {
        let (_, mut overlay) = static_overlay();
        overlay.highlight("AA1234");
        assert!(!overlay.highlight("ZZ0000"));
        assert_eq!(overlay.highlighted(), Some("AA1234"));
    }

    #[test]
    fn test_hit_test() {
        let (_, overlay) = static_overlay();
        // AA1234 sits at (30, 25)
        assert_eq!(overlay.hit_test(31.0, 26.0, 3.0), Some("AA1234"));
        assert_eq!(overlay.hit_test(90.0, 90.0, 3.0), None);
    }

    #[test]
    fn test_hit_test_prefers_highlighted_on_overlap() {
        let mut store = FlightStore::new();
        store.replace_all(["SIM-01", "SIM-02"].into_iter().map(FlightRecord::new));
        let mut positions = PresetPositions::new(
            ["SIM-01", "SIM-02"]
                .into_iter()
                .map(|id| (id.to_string(), MarkerPosition::new(50.0, 40.0)))
                .collect(),
        );
        let mut overlay = Overlay::new();
        overlay.rebuild(&store, &mut positions);

        // Without a highlight the first marker in store order wins
        assert_eq!(overlay.hit_test(50.0, 40.0, 2.0), Some("SIM-01"));

        overlay.highlight("SIM-02");
        assert_eq!(overlay.hit_test(50.0, 40.0, 2.0), Some("SIM-02"));

        // A strictly closer marker still beats the highlighted one
        overlay.move_marker("SIM-02", 1.0, 0.0);
        assert_eq!(overlay.hit_test(50.0, 40.0, 2.0), Some("SIM-01"));
    }

    #[test]
    fn test_move_marker_clamps() {
        let (_, mut overlay) = static_overlay();
        assert!(overlay.move_marker("BA7890", 100.0, -100.0));
        let marker = overlay.marker("BA7890").unwrap();
        assert_eq!(marker.position, MarkerPosition::new(95.0, 5.0));
        assert!(!overlay.move_marker("missing", 1.0, 1.0));
    }
}

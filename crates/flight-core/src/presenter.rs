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

//! Detail panel presenter.
//!
//! Copies a selected record into a fixed set of named display slots and
//! switches the panel between its empty and detail states.

use std::collections::BTreeMap;

use crate::record::{or_sentinel, AirportInfo, FlightRecord, NOT_AVAILABLE};
use crate::store::FlightStore;

/// Named text slots on the detail panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Number,
    Speed,
    Altitude,
    Aircraft,
    Origin,
    Destination,
    Heading,
    VerticalRate,
    OriginAirport,
    OriginCity,
    OriginCountry,
    OriginTerminal,
    OriginTime,
    DestinationAirport,
    DestinationCity,
    DestinationCountry,
    DestinationTerminal,
    DestinationTime,
}

/// Which group of the panel a slot is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Flight,
    Origin,
    Destination,
}

impl Slot {
    pub const ALL: [Slot; 18] = [
        Slot::Number,
        Slot::Speed,
        Slot::Altitude,
        Slot::Aircraft,
        Slot::Origin,
        Slot::Destination,
        Slot::Heading,
        Slot::VerticalRate,
        Slot::OriginAirport,
        Slot::OriginCity,
        Slot::OriginCountry,
        Slot::OriginTerminal,
        Slot::OriginTime,
        Slot::DestinationAirport,
        Slot::DestinationCity,
        Slot::DestinationCountry,
        Slot::DestinationTerminal,
        Slot::DestinationTime,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Slot::Number => "Flight",
            Slot::Speed => "Speed",
            Slot::Altitude => "Altitude",
            Slot::Aircraft => "Aircraft",
            Slot::Origin => "From",
            Slot::Destination => "To",
            Slot::Heading => "Heading",
            Slot::VerticalRate => "Vertical rate",
            Slot::OriginAirport | Slot::DestinationAirport => "Airport",
            Slot::OriginCity | Slot::DestinationCity => "City",
            Slot::OriginCountry | Slot::DestinationCountry => "Country",
            Slot::OriginTerminal | Slot::DestinationTerminal => "Terminal",
            Slot::OriginTime | Slot::DestinationTime => "Local time",
        }
    }

    #[must_use]
    pub fn section(self) -> Section {
        match self {
            Slot::OriginAirport
            | Slot::OriginCity
            | Slot::OriginCountry
            | Slot::OriginTerminal
            | Slot::OriginTime => Section::Origin,
            Slot::DestinationAirport
            | Slot::DestinationCity
            | Slot::DestinationCountry
            | Slot::DestinationTerminal
            | Slot::DestinationTime => Section::Destination,
            _ => Section::Flight,
        }
    }

    /// Display value of this slot for `record`, never empty.
    #[must_use]
    pub fn value_for(self, record: &FlightRecord) -> String {
        let value = match self {
            Slot::Number => record.number.clone(),
            Slot::Speed => record.speed.clone(),
            Slot::Altitude => record.altitude.clone(),
            Slot::Aircraft => record.aircraft.clone(),
            Slot::Origin => record.origin.clone(),
            Slot::Destination => record.destination.clone(),
            Slot::Heading => record.heading.clone().unwrap_or_default(),
            Slot::VerticalRate => record.vertical_rate.clone().unwrap_or_default(),
            Slot::OriginAirport => airport_field(record.origin_info.as_ref(), |a| a.name.as_str()),
            Slot::OriginCity => airport_field(record.origin_info.as_ref(), |a| a.city.as_str()),
            Slot::OriginCountry => airport_field(record.origin_info.as_ref(), |a| a.country.as_str()),
            Slot::OriginTerminal => airport_field(record.origin_info.as_ref(), |a| a.terminal.as_str()),
            Slot::OriginTime => airport_field(record.origin_info.as_ref(), |a| a.local_time.as_str()),
            Slot::DestinationAirport => airport_field(record.destination_info.as_ref(), |a| a.name.as_str()),
            Slot::DestinationCity => airport_field(record.destination_info.as_ref(), |a| a.city.as_str()),
            Slot::DestinationCountry => airport_field(record.destination_info.as_ref(), |a| a.country.as_str()),
            Slot::DestinationTerminal => airport_field(record.destination_info.as_ref(), |a| a.terminal.as_str()),
            Slot::DestinationTime => airport_field(record.destination_info.as_ref(), |a| a.local_time.as_str()),
        };

        or_sentinel(&value).to_string()
    }
}

fn airport_field(info: Option<&AirportInfo>, pick: fn(&AirportInfo) -> &str) -> String {
    info.map_or(NOT_AVAILABLE, pick).to_string()
}

/// Which half of the panel pair is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelView {
    /// "Select a flight" placeholder.
    #[default]
    Empty,
    /// Flight and airport details.
    Detail,
}

/// Rendering surface the presenter writes into.
pub trait DetailSurface {
    fn set_slot(&mut self, slot: Slot, value: &str);

    /// Switch the visible panel. Exactly one view is visible at a time.
    fn show(&mut self, view: PanelView);
}

/// In-memory detail panel read by the UI each frame.
#[derive(Debug, Clone, Default)]
pub struct DetailPanel {
    slots: BTreeMap<Slot, String>,
    view: PanelView,
}

impl DetailPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn view(&self) -> PanelView {
        self.view
    }

    #[must_use]
    pub fn slot(&self, slot: Slot) -> Option<&str> {
        self.slots.get(&slot).map(String::as_str)
    }

    /// Slots of one section in display order.
    pub fn section(&self, section: Section) -> impl Iterator<Item = (Slot, &str)> {
        Slot::ALL
            .into_iter()
            .filter(move |slot| slot.section() == section)
            .map(move |slot| (slot, self.slot(slot).unwrap_or(NOT_AVAILABLE)))
    }
}

impl DetailSurface for DetailPanel {
    fn set_slot(&mut self, slot: Slot, value: &str) {
        self.slots.insert(slot, value.to_string());
    }

    fn show(&mut self, view: PanelView) {
        self.view = view;
    }
}

/// Show `flight_id` on `surface`.
///
/// Returns false and leaves the surface untouched if the id is not in the
/// store, e.g. a click on a marker that was removed in the meantime.
pub fn present(store: &FlightStore, flight_id: &str, surface: &mut dyn DetailSurface) -> bool {
    let Some(record) = store.get(flight_id) else {
        return false;
    };

    for slot in Slot::ALL {
        surface.set_slot(slot, &slot.value_for(record));
    }
    surface.show(PanelView::Detail);
    true
}

/// Return the surface to its empty state.
pub fn clear(surface: &mut dyn DetailSurface) {
    surface.show(PanelView::Empty);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::opensky::{BoundingBox, LiveBatch, StateVector};

    fn static_store() -> FlightStore {
        let mut store = FlightStore::new();
        store.replace_all(catalog::load().0);
        store
    }

    #[test]
    fn test_present_static_flight() {
        let store = static_store();
        let mut panel = DetailPanel::new();

        assert!(present(&store, "AA1234", &mut panel));
        assert_eq!(panel.view(), PanelView::Detail);
        assert_eq!(panel.slot(Slot::Number), Some("AA1234"));
        assert_eq!(panel.slot(Slot::Speed), Some("845 km/h"));
        assert_eq!(panel.slot(Slot::Origin), Some("JFK"));
        assert_eq!(panel.slot(Slot::Destination), Some("LHR"));
        assert_eq!(panel.slot(Slot::OriginTerminal), Some("7"));
        assert_eq!(panel.slot(Slot::Heading), Some(NOT_AVAILABLE));
    }

    #[test]
    fn test_missing_fields_do_not_leave_stale_values() {
        let mut store = static_store();
        let mut panel = DetailPanel::new();
        present(&store, "AA1234", &mut panel);

        let live = StateVector {
            icao24: "a1b2c3".to_string(),
            callsign: Some("UAL123".to_string()),
            origin_country: "United States".to_string(),
            last_contact: None,
            longitude: Some(-74.0),
            latitude: Some(40.7),
            baro_altitude: Some(9000.0),
            velocity: None,
            true_track: Some(90.0),
            vertical_rate: None,
            geo_altitude: None,
        };
        let batch =
            LiveBatch::from_states(BoundingBox::around(40.7, -74.0, 100.0), &[live]).unwrap();
        store.replace_all(batch.flights.into_iter().map(|f| f.record));

        assert!(present(&store, "a1b2c3", &mut panel));
        for slot in Slot::ALL {
            let value = panel.slot(slot).unwrap();
            assert!(!value.is_empty(), "{slot:?} is empty");
        }
        assert_eq!(panel.slot(Slot::Number), Some("UAL123"));
        assert_eq!(panel.slot(Slot::Speed), Some(NOT_AVAILABLE));
        assert_eq!(panel.slot(Slot::OriginTerminal), Some(NOT_AVAILABLE));
        assert_eq!(panel.slot(Slot::DestinationAirport), Some(NOT_AVAILABLE));
        assert_eq!(panel.slot(Slot::Heading), Some("90°"));
    }

    #[test]
    fn test_unknown_flight_is_noop() {
        let store = static_store();
        let mut panel = DetailPanel::new();

        assert!(!present(&store, "ZZ9999", &mut panel));
        assert_eq!(panel.view(), PanelView::Empty);
        assert!(panel.slot(Slot::Number).is_none());

        present(&store, "DL5678", &mut panel);
        assert!(!present(&store, "gone", &mut panel));
        assert_eq!(panel.slot(Slot::Number), Some("DL5678"));
        assert_eq!(panel.view(), PanelView::Detail);
    }

    #[test]
    fn test_clear_shows_empty_state() {
        let store = static_store();
        let mut panel = DetailPanel::new();
        present(&store, "BA7890", &mut panel);
        clear(&mut panel);
        assert_eq!(panel.view(), PanelView::Empty);
    }

    #[test]
    fn test_sections_cover_all_slots() {
        let panel = DetailPanel::new();
        let total = panel.section(Section::Flight).count()
            + panel.section(Section::Origin).count()
            + panel.section(Section::Destination).count();
        assert_eq!(total, Slot::ALL.len());
        assert_eq!(panel.section(Section::Origin).count(), 5);
    }
}

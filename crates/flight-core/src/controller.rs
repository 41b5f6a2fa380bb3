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

//! Application state and the operations that change it.
//!
//! The [`Controller`] is the single owner of the store, overlay, detail panel,
//! view transform and selection. Work that has to wait (the live fetch and the
//! simulation clock) runs on a tokio runtime and reports back through
//! [`ControllerEvent`]s, which the UI thread applies via
//! [`Controller::poll_events`]. Nothing else mutates state, so no locking is
//! needed.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::catalog;
use crate::error::FeedError;
use crate::opensky::{BoundingBox, LiveBatch, LiveSource};
use crate::overlay::Overlay;
use crate::presenter::{self, DetailPanel};
use crate::projection::{GeoProjection, RandomPlacement};
use crate::simulation::{Simulation, SimulationClock, DEFAULT_TICK_INTERVAL};
use crate::store::FlightStore;
use crate::view::ViewControls;

/// Number of synthetic flights used when none is configured.
pub const DEFAULT_SIMULATED_COUNT: usize = 8;

/// Which producer currently owns the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Nothing loaded yet.
    #[default]
    Idle,
    Static,
    Live,
    Simulated,
}

impl Mode {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Mode::Idle => "Idle",
            Mode::Static => "Static",
            Mode::Live => "Live",
            Mode::Simulated => "Simulated",
        }
    }
}

/// Completion of background work, applied on the controller's thread.
#[derive(Debug)]
pub enum ControllerEvent {
    /// A live fetch finished. `epoch` identifies the request.
    LiveFetched {
        epoch: u64,
        result: Result<LiveBatch, FeedError>,
    },
    /// The simulation clock fired.
    SimulationTick { generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// User-visible message about the last producer switch.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            raised_at: Utc::now(),
        }
    }
}

/// Controller settings.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Flights generated by the simulation, including the live fallback.
    pub simulated_count: usize,
    /// Time between simulation ticks.
    pub tick_interval: Duration,
    /// Fixed rng seed; random if `None`.
    pub seed: Option<u64>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            simulated_count: DEFAULT_SIMULATED_COUNT,
            tick_interval: DEFAULT_TICK_INTERVAL,
            seed: None,
        }
    }
}

/// Owner of all flight display state.
pub struct Controller<S: LiveSource> {
    store: FlightStore,
    overlay: Overlay,
    panel: DetailPanel,
    view: ViewControls,
    selection: Option<String>,
    mode: Mode,
    /// Bumped on every producer switch.
    epoch: u64,
    pending_live: Option<u64>,
    notice: Option<Notice>,
    simulation: Simulation,
    clock: SimulationClock,
    ticks_applied: u64,
    simulated_count: usize,
    rng: StdRng,
    source: S,
    runtime: Handle,
    event_tx: UnboundedSender<ControllerEvent>,
    event_rx: UnboundedReceiver<ControllerEvent>,
}

impl<S: LiveSource> std::fmt::Debug for Controller<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("mode", &self.mode)
            .field("epoch", &self.epoch)
            .field("records", &self.store.len())
            .field("selection", &self.selection)
            .field("pending_live", &self.pending_live)
            .finish_non_exhaustive()
    }
}

impl<S: LiveSource> Controller<S> {
    /// Create an idle controller. Background tasks are spawned on `runtime`.
    #[must_use]
    pub fn new(source: S, config: ControllerConfig, runtime: Handle) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            store: FlightStore::new(),
            overlay: Overlay::new(),
            panel: DetailPanel::new(),
            view: ViewControls::new(),
            selection: None,
            mode: Mode::Idle,
            epoch: 0,
            pending_live: None,
            notice: None,
            simulation: Simulation::default(),
            clock: SimulationClock::new(config.tick_interval),
            ticks_applied: 0,
            simulated_count: config.simulated_count.max(1),
            rng,
            source,
            runtime,
            event_tx,
            event_rx,
        }
    }

    /// Tear down the previous producer before a new one takes over.
    fn begin_producer(&mut self, mode: Mode) -> u64 {
        self.clock.stop();
        self.epoch += 1;
        self.pending_live = None;
        self.notice = None;
        self.selection = None;
        presenter::clear(&mut self.panel);
        self.mode = mode;
        self.epoch
    }

    /// Replace the store with the hardcoded catalog.
    pub fn load_static(&mut self) {
        self.begin_producer(Mode::Static);

        let (records, mut positions) = catalog::load();
        self.store.replace_all(records);
        self.overlay.rebuild(&self.store, &mut positions);

        info!("Loaded {} catalog flights", self.store.len());
    }

    /// Start a live query of `radius_km` around the given center.
    ///
    /// The store is emptied right away and refilled when the response arrives.
    /// Returns the request epoch, or `None` if a request is already in flight.
    pub fn load_live(&mut self, latitude: f64, longitude: f64, radius_km: f64) -> Option<u64> {
        if let Some(epoch) = self.pending_live {
            warn!("Live request {} still in flight, ignoring new request", epoch);
            return None;
        }

        let epoch = self.begin_producer(Mode::Live);
        self.store.clear();
        self.overlay.clear();
        self.pending_live = Some(epoch);
        self.notice = Some(Notice::new(NoticeLevel::Info, "Loading live traffic..."));

        let bbox = BoundingBox::around(latitude, longitude, radius_km);
        let source = self.source.clone();
        let event_tx = self.event_tx.clone();
        self.runtime.spawn(async move {
            let result = source.fetch_batch(bbox).await;
            let _ = event_tx.send(ControllerEvent::LiveFetched { epoch, result });
        });

        info!(
            "Live request {} started around ({:.4}, {:.4}) radius {} km",
            epoch, latitude, longitude, radius_km
        );
        Some(epoch)
    }

    /// Replace the store with `count` synthetic flights and start the clock.
    pub fn load_simulated(&mut self, count: usize) {
        self.begin_producer(Mode::Simulated);

        let count = count.max(1);
        self.simulation = Simulation::generate(count, &mut self.rng);
        self.store.replace_all(self.simulation.records());

        let mut placement = RandomPlacement::new(StdRng::seed_from_u64(self.rng.gen()));
        self.overlay.rebuild(&self.store, &mut placement);

        self.ticks_applied = 0;
        self.clock.start(&self.runtime, self.event_tx.clone());
        info!("Simulating {} flights", count);
    }

    /// Load the simulation with the configured flight count.
    pub fn load_default_simulation(&mut self) {
        self.load_simulated(self.simulated_count);
    }

    /// Flight count for [`Self::load_default_simulation`] and the live fallback.
    pub fn set_simulated_count(&mut self, count: usize) {
        self.simulated_count = count.max(1);
    }

    /// Freeze the simulation in place. Returns whether it was running.
    pub fn stop_simulation(&mut self) -> bool {
        self.clock.stop()
    }

    /// Select a flight. Unknown ids are ignored.
    pub fn select(&mut self, flight_id: &str) -> bool {
        if !presenter::present(&self.store, flight_id, &mut self.panel) {
            debug!("Selection of unknown flight {} ignored", flight_id);
            return false;
        }
        self.overlay.highlight(flight_id);
        self.selection = Some(flight_id.to_string());
        true
    }

    /// Restore neutral zoom and clear the selection.
    pub fn reset_view(&mut self) {
        self.view.reset();
        self.selection = None;
        self.overlay.clear_highlight();
        presenter::clear(&mut self.panel);
    }

    pub fn zoom_in(&mut self) -> bool {
        self.view.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.view.zoom_out()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Apply every queued background event. Returns how many were handled.
    pub fn poll_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    pub fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::LiveFetched { epoch, result } => self.finish_live(epoch, result),
            ControllerEvent::SimulationTick { generation } => self.apply_tick(generation),
        }
    }

    fn finish_live(&mut self, epoch: u64, result: Result<LiveBatch, FeedError>) {
        if self.pending_live != Some(epoch) || self.epoch != epoch {
            debug!("Discarding live response {} (current epoch {})", epoch, self.epoch);
            return;
        }
        self.pending_live = None;

        match result {
            Ok(batch) => {
                let mut coordinates = HashMap::with_capacity(batch.flights.len());
                let records: Vec<_> = batch
                    .flights
                    .into_iter()
                    .map(|flight| {
                        coordinates.insert(flight.record.id.clone(), (flight.latitude, flight.longitude));
                        flight.record
                    })
                    .collect();

                self.store.replace_all(records);
                let mut projection = GeoProjection::new(batch.bbox, coordinates);
                self.overlay.rebuild(&self.store, &mut projection);

                info!("Live request {} returned {} aircraft", epoch, self.store.len());
                self.notice = Some(Notice::new(
                    NoticeLevel::Info,
                    format!(
                        "Showing {} live aircraft (as of {})",
                        self.store.len(),
                        batch
                            .latest_contact
                            .unwrap_or(batch.fetched_at)
                            .format("%H:%M:%S UTC")
                    ),
                ));
            }
            Err(e) => {
                warn!("Live request {} failed: {}, falling back to simulation", epoch, e);
                self.load_default_simulation();
                self.notice = Some(Notice::new(
                    NoticeLevel::Warning,
                    format!("Live data unavailable ({e}). Showing simulated traffic."),
                ));
            }
        }
    }

    fn apply_tick(&mut self, generation: u64) {
        if self.mode != Mode::Simulated || !self.clock.is_current(generation) {
            debug!("Ignoring tick from generation {}", generation);
            return;
        }

        for nudge in self.simulation.perturb(&mut self.rng) {
            self.overlay.move_marker(&nudge.id, nudge.d_top, nudge.d_left);
        }
        for flight in self.simulation.flights() {
            if let Some(record) = self.store.get_mut(&flight.id) {
                *record = flight.to_record();
            }
        }

        // Keep the open panel in step with the moving data
        if let Some(selected) = self.selection.clone() {
            presenter::present(&self.store, &selected, &mut self.panel);
        }
        self.ticks_applied += 1;
    }

    #[must_use]
    pub fn store(&self) -> &FlightStore {
        &self.store
    }

    #[must_use]
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    #[must_use]
    pub fn panel(&self) -> &DetailPanel {
        &self.panel
    }

    #[must_use]
    pub fn view(&self) -> &ViewControls {
        &self.view
    }

    #[must_use]
    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// True while a live request is in flight; the live control stays disabled.
    #[must_use]
    pub fn live_request_pending(&self) -> bool {
        self.pending_live.is_some()
    }

    #[must_use]
    pub fn simulation_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Simulation ticks applied since the simulation was last loaded.
    #[must_use]
    pub fn ticks_applied(&self) -> u64 {
        self.ticks_applied
    }

    #[must_use]
    pub fn simulated_count(&self) -> usize {
        self.simulated_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::Emphasis;
    use crate::presenter::{PanelView, Slot};
    use crate::opensky::StateVector;

    /// Canned live source with an optional artificial delay.
    #[derive(Debug, Clone)]
    enum CannedFeed {
        States(Vec<StateVector>, Duration),
        Unavailable,
    }

    impl LiveSource for CannedFeed {
        async fn fetch_batch(&self, bbox: BoundingBox) -> Result<LiveBatch, FeedError> {
            match self {
                CannedFeed::States(states, delay) => {
                    tokio::time::sleep(*delay).await;
                    LiveBatch::from_states(bbox, states)
                }
                CannedFeed::Unavailable => {
                    Err(FeedError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE))
                }
            }
        }
    }

    fn vector(icao24: &str, lat: f64, lon: f64, altitude: f64) -> StateVector {
        StateVector {
            icao24: icao24.to_string(),
            callsign: Some(icao24.to_uppercase()),
            origin_country: "United States".to_string(),
            last_contact: None,
            longitude: Some(lon),
            latitude: Some(lat),
            baro_altitude: Some(altitude),
            velocity: Some(230.0),
            true_track: Some(45.0),
            vertical_rate: Some(0.0),
            geo_altitude: None,
        }
    }

    fn controller(feed: CannedFeed) -> Controller<CannedFeed> {
        Controller::new(
            feed,
            ControllerConfig {
                simulated_count: 6,
                tick_interval: Duration::from_millis(1000),
                seed: Some(42),
            },
            Handle::current(),
        )
    }

    async fn settle(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    fn assert_markers_match_store<S: LiveSource>(ctl: &Controller<S>) {
        assert_eq!(ctl.overlay().len(), ctl.store().len());
        for (marker, id) in ctl.overlay().markers().iter().zip(ctl.store().ids()) {
            assert_eq!(marker.flight_id, id);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_static_selection_fills_panel() {
        let mut ctl = controller(CannedFeed::Unavailable);
        ctl.load_static();
        assert_eq!(ctl.mode(), Mode::Static);
        assert!(!ctl.simulation_running());

        assert!(ctl.select("AA1234"));
        let panel = ctl.panel();
        assert_eq!(panel.view(), PanelView::Detail);
        assert_eq!(panel.slot(Slot::Number), Some("AA1234"));
        assert_eq!(panel.slot(Slot::Speed), Some("845 km/h"));
        assert_eq!(panel.slot(Slot::Origin), Some("JFK"));
        assert_eq!(panel.slot(Slot::Destination), Some("LHR"));
        assert_eq!(panel.slot(Slot::OriginTerminal), Some("7"));
        assert_eq!(ctl.selection(), Some("AA1234"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_unknown_flight_is_noop() {
        let mut ctl = controller(CannedFeed::Unavailable);
        ctl.load_static();
        ctl.select("DL5678");

        assert!(!ctl.select("SIM-01"));
        assert_eq!(ctl.selection(), Some("DL5678"));
        assert_eq!(ctl.panel().slot(Slot::Number), Some("DL5678"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_restores_emphasis_and_empty_panel() {
        let mut ctl = controller(CannedFeed::Unavailable);
        ctl.load_static();
        ctl.zoom_in();
        ctl.select("UA9012");
        assert!(ctl.overlay().markers().iter().any(|m| m.emphasis == Emphasis::Reduced));

        ctl.reset_view();
        assert!(ctl.overlay().markers().iter().all(|m| m.emphasis == Emphasis::Full));
        assert_eq!(ctl.panel().view(), PanelView::Empty);
        assert!(ctl.selection().is_none());
        assert!((ctl.view().scale() - 1.0).abs() < f32::EPSILON);

        // Reset without any selection is fine too
        ctl.reset_view();
        assert_eq!(ctl.panel().view(), PanelView::Empty);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_producers_rebuilds_markers() {
        let mut ctl = controller(CannedFeed::Unavailable);
        ctl.load_static();
        assert_markers_match_store(&ctl);

        ctl.load_simulated(3);
        assert_eq!(ctl.store().len(), 3);
        assert!(ctl.store().get("AA1234").is_none());
        assert_markers_match_store(&ctl);

        ctl.load_static();
        assert_eq!(ctl.store().len(), 5);
        assert!(!ctl.simulation_running());
        assert_markers_match_store(&ctl);
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_success_replaces_store() {
        let states = vec![
            vector("a1b2c3", 40.7, -73.9, 10_000.0),
            vector("d4e5f6", 40.6, -74.1, 3_000.0),
            vector("ffffff", 40.65, -73.8, 0.0),
        ];
        let mut ctl = controller(CannedFeed::States(states, Duration::from_millis(50)));
        ctl.load_static();

        let epoch = ctl.load_live(40.7, -73.9, 100.0).unwrap();
        assert!(ctl.live_request_pending());
        assert!(ctl.store().is_empty());
        // A second request while one is in flight is refused
        assert!(ctl.load_live(40.7, -73.9, 100.0).is_none());

        settle(100).await;
        assert_eq!(ctl.poll_events(), 1);

        assert_eq!(ctl.epoch(), epoch);
        assert_eq!(ctl.mode(), Mode::Live);
        assert!(!ctl.live_request_pending());
        assert_eq!(ctl.store().len(), 2);
        assert_markers_match_store(&ctl);
        assert_eq!(ctl.notice().unwrap().level, NoticeLevel::Info);

        assert!(ctl.select("a1b2c3"));
        assert_eq!(ctl.panel().slot(Slot::Heading), Some("45°"));
        assert_eq!(ctl.panel().slot(Slot::OriginAirport), Some("N/A"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_without_airborne_vectors_falls_back_to_simulation() {
        let grounded = vec![vector("ffffff", 40.65, -73.8, 0.0)];
        let mut ctl = controller(CannedFeed::States(grounded, Duration::ZERO));

        ctl.load_live(40.7, -73.9, 100.0);
        settle(10).await;
        ctl.poll_events();

        assert_eq!(ctl.mode(), Mode::Simulated);
        assert_eq!(ctl.store().len(), 6);
        assert!(ctl.simulation_running());
        assert_markers_match_store(&ctl);
        assert_eq!(ctl.notice().unwrap().level, NoticeLevel::Warning);
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_transport_error_falls_back_to_simulation() {
        let mut ctl = controller(CannedFeed::Unavailable);
        ctl.load_live(51.47, -0.45, 200.0);
        settle(10).await;
        ctl.poll_events();

        assert_eq!(ctl.mode(), Mode::Simulated);
        assert!(!ctl.store().is_empty());
        assert!(ctl.notice().unwrap().message.contains("503"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_count_drives_default_and_fallback() {
        let mut ctl = controller(CannedFeed::Unavailable);
        assert_eq!(ctl.simulated_count(), 6);

        ctl.set_simulated_count(0);
        assert_eq!(ctl.simulated_count(), 1);

        ctl.set_simulated_count(3);
        ctl.load_default_simulation();
        assert_eq!(ctl.store().len(), 3);
        assert!(ctl.simulation_running());

        ctl.set_simulated_count(9);
        ctl.load_live(51.47, -0.45, 200.0);
        settle(10).await;
        ctl.poll_events();

        assert_eq!(ctl.mode(), Mode::Simulated);
        assert_eq!(ctl.store().len(), 9);
        assert_markers_match_store(&ctl);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_live_response_is_discarded() {
        let states = vec![vector("a1b2c3", 40.7, -73.9, 10_000.0)];
        let mut ctl = controller(CannedFeed::States(states, Duration::from_secs(5)));

        ctl.load_live(40.7, -73.9, 100.0);
        ctl.load_static();
        assert!(!ctl.live_request_pending());

        settle(6_000).await;
        ctl.poll_events();

        assert_eq!(ctl.mode(), Mode::Static);
        assert_eq!(ctl.store().len(), 5);
        assert!(ctl.store().get("a1b2c3").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulation_ticks_move_markers() {
        let mut ctl = controller(CannedFeed::Unavailable);
        ctl.load_simulated(4);
        ctl.select("SIM-01");
        let before = ctl.store().get("SIM-01").unwrap().clone();

        settle(3_500).await;
        ctl.poll_events();

        assert_eq!(ctl.ticks_applied(), 3);
        assert_eq!(ctl.overlay().len(), 4);
        let after = ctl.store().get("SIM-01").unwrap();
        assert_eq!(after.number, before.number);
        assert_eq!(ctl.panel().slot(Slot::Speed), Some(after.speed.as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restarting_simulation_runs_single_clock() {
        let mut ctl = controller(CannedFeed::Unavailable);
        ctl.load_simulated(4);
        ctl.load_simulated(4);

        settle(3_500).await;
        ctl.poll_events();
        assert_eq!(ctl.ticks_applied(), 3);

        assert!(ctl.stop_simulation());
        assert!(!ctl.stop_simulation());

        settle(3_000).await;
        ctl.poll_events();
        assert_eq!(ctl.ticks_applied(), 3);
        assert_eq!(ctl.store().len(), 4);
    }
}

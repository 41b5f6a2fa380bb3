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

//! Synthetic traffic.
//!
//! [`Simulation`] owns the numeric state of N made-up flights and perturbs it
//! on every tick. [`SimulationClock`] drives the ticks: a tokio interval task
//! that posts [`ControllerEvent::SimulationTick`] back to the controller, so
//! all mutation still happens on the controller's thread.

use std::ops::RangeInclusive;
use std::time::Duration;

use log::{debug, info};
use rand::Rng;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::controller::ControllerEvent;
use crate::record::{
    format_altitude_m, format_heading, format_speed_kmh, format_vertical_rate, FlightRecord,
};

/// Default time between perturbation ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Alternating origin/destination pairs.
const ROUTES: [(&str, &str); 2] = [("JFK", "LHR"), ("SFO", "NRT")];
const AIRLINES: &[&str] = &["AA", "DL", "UA", "LH", "BA", "AF"];
const AIRCRAFT_TYPES: &[&str] = &[
    "Boeing 787-9",
    "Airbus A350-900",
    "Boeing 777-300ER",
    "Airbus A330-900neo",
    "Airbus A380",
];

// Initial ranges
const SPEED_RANGE_KMH: RangeInclusive<f64> = 700.0..=950.0;
const ALTITUDE_RANGE_M: RangeInclusive<f64> = 9_000.0..=12_500.0;
const VERTICAL_RATE_RANGE_MS: RangeInclusive<f64> = -5.0..=5.0;

// Per-tick perturbation bounds
const POSITION_STEP_PERCENT: f32 = 0.3;
const SPEED_STEP_KMH: f64 = 10.0;
const ALTITUDE_STEP_M: f64 = 50.0;
const HEADING_STEP_DEG: f64 = 3.0;
const VERTICAL_RATE_STEP_MS: f64 = 0.5;
const SPEED_LIMITS_KMH: (f64, f64) = (600.0, 1_000.0);
const ALTITUDE_LIMITS_M: (f64, f64) = (8_000.0, 13_000.0);
const VERTICAL_RATE_LIMITS_MS: (f64, f64) = (-10.0, 10.0);

/// Numeric state of one synthetic flight.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedFlight {
    pub id: String,
    pub number: String,
    pub aircraft: String,
    pub origin: String,
    pub destination: String,
    pub speed_kmh: f64,
    pub altitude_m: f64,
    pub heading_deg: f64,
    pub vertical_rate_ms: f64,
}

impl SimulatedFlight {
    #[must_use]
    pub fn to_record(&self) -> FlightRecord {
        let mut record = FlightRecord::new(self.id.clone());
        record.number.clone_from(&self.number);
        record.speed = format_speed_kmh(self.speed_kmh);
        record.altitude = format_altitude_m(self.altitude_m);
        record.aircraft.clone_from(&self.aircraft);
        record.origin.clone_from(&self.origin);
        record.destination.clone_from(&self.destination);
        record.heading = Some(format_heading(self.heading_deg));
        record.vertical_rate = Some(format_vertical_rate(self.vertical_rate_ms));
        record
    }

    fn perturb<R: Rng>(&mut self, rng: &mut R) {
        self.speed_kmh = (self.speed_kmh + rng.gen_range(-SPEED_STEP_KMH..=SPEED_STEP_KMH))
            .clamp(SPEED_LIMITS_KMH.0, SPEED_LIMITS_KMH.1);
        self.altitude_m = (self.altitude_m + rng.gen_range(-ALTITUDE_STEP_M..=ALTITUDE_STEP_M))
            .clamp(ALTITUDE_LIMITS_M.0, ALTITUDE_LIMITS_M.1);
        self.heading_deg =
            (self.heading_deg + rng.gen_range(-HEADING_STEP_DEG..=HEADING_STEP_DEG)).rem_euclid(360.0);
        self.vertical_rate_ms = (self.vertical_rate_ms
            + rng.gen_range(-VERTICAL_RATE_STEP_MS..=VERTICAL_RATE_STEP_MS))
            .clamp(VERTICAL_RATE_LIMITS_MS.0, VERTICAL_RATE_LIMITS_MS.1);
    }
}

/// Marker displacement for one flight, in percentage points.
#[derive(Debug, Clone, PartialEq)]
pub struct Nudge {
    pub id: String,
    pub d_top: f32,
    pub d_left: f32,
}

/// A set of synthetic flights.
#[derive(Debug, Clone, Default)]
pub struct Simulation {
    flights: Vec<SimulatedFlight>,
}

impl Simulation {
    /// Generate `count` flights with plausible random metrics.
    pub fn generate<R: Rng>(count: usize, rng: &mut R) -> Self {
        let flights = (0..count)
            .map(|i| {
                let (origin, destination) = ROUTES[i % ROUTES.len()];
                SimulatedFlight {
                    id: format!("SIM-{:02}", i + 1),
                    number: format!(
                        "{}{}",
                        AIRLINES[i % AIRLINES.len()],
                        rng.gen_range(100..10_000)
                    ),
                    aircraft: AIRCRAFT_TYPES[i % AIRCRAFT_TYPES.len()].to_string(),
                    origin: origin.to_string(),
                    destination: destination.to_string(),
                    speed_kmh: rng.gen_range(SPEED_RANGE_KMH),
                    altitude_m: rng.gen_range(ALTITUDE_RANGE_M),
                    heading_deg: rng.gen_range(0.0..360.0),
                    vertical_rate_ms: rng.gen_range(VERTICAL_RATE_RANGE_MS),
                }
            })
            .collect();

        Self { flights }
    }

    #[must_use]
    pub fn flights(&self) -> &[SimulatedFlight] {
        &self.flights
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.flights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// Current display records.
    #[must_use]
    pub fn records(&self) -> Vec<FlightRecord> {
        self.flights.iter().map(SimulatedFlight::to_record).collect()
    }

    /// Advance every flight by one tick and return the marker displacements.
    pub fn perturb<R: Rng>(&mut self, rng: &mut R) -> Vec<Nudge> {
        self.flights
            .iter_mut()
            .map(|flight| {
                flight.perturb(rng);
                Nudge {
                    id: flight.id.clone(),
                    d_top: rng.gen_range(-POSITION_STEP_PERCENT..=POSITION_STEP_PERCENT),
                    d_left: rng.gen_range(-POSITION_STEP_PERCENT..=POSITION_STEP_PERCENT),
                }
            })
            .collect()
    }
}

/// Recurring tick source for the simulation.
///
/// At most one tick task runs at a time. Every start bumps the generation, so
/// a tick that was already queued when the clock restarted can be told apart
/// and ignored.
#[derive(Debug)]
pub struct SimulationClock {
    interval: Duration,
    generation: u64,
    cancel_token: Option<CancellationToken>,
}

impl SimulationClock {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            generation: 0,
            cancel_token: None,
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.cancel_token.is_some()
    }

    /// True if `generation` belongs to the currently running clock.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.is_running() && generation == self.generation
    }

    /// Start ticking, cancelling any previous tick task first.
    pub fn start(&mut self, runtime: &Handle, event_tx: UnboundedSender<ControllerEvent>) -> u64 {
        self.stop();

        self.generation += 1;
        let generation = self.generation;
        let cancel_token = CancellationToken::new();
        let task_cancel = cancel_token.clone();
        let period = self.interval;

        runtime.spawn(async move {
            tick_loop(generation, period, event_tx, task_cancel).await;
        });

        info!(
            "Simulation clock started (generation {}, every {} ms)",
            generation,
            period.as_millis()
        );
        self.cancel_token = Some(cancel_token);
        generation
    }

    /// Stop ticking. Returns whether a clock was running; safe to call repeatedly.
    pub fn stop(&mut self) -> bool {
        match self.cancel_token.take() {
            Some(token) => {
                token.cancel();
                info!("Simulation clock stopped (generation {})", self.generation);
                true
            }
            None => false,
        }
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl Drop for SimulationClock {
    fn drop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
    }
}

async fn tick_loop(
    generation: u64,
    period: Duration,
    event_tx: UnboundedSender<ControllerEvent>,
    cancel_token: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately
    interval.tick().await;

    loop {
        tokio::select! {
            biased;

            () = cancel_token.cancelled() => {
                debug!("Tick task for generation {} cancelled", generation);
                return;
            }

            _ = interval.tick() => {
                if event_tx.send(ControllerEvent::SimulationTick { generation }).is_err() {
                    return; // Controller dropped
                }
            }
        }
    }
}

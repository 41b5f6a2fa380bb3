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

//! Core of the globe flight viewer.
//!
//! Flight records are produced by one of three producers, placed on a
//! percentage-based overlay and shown in a detail panel on selection:
//!
//! - **Static catalog** ([`catalog`]): five hardcoded flights with airport details
//! - **Live feed** ([`opensky`]): one bounding-box query to the OpenSky state
//!   vector API, falling back to the simulation on any failure
//! - **Simulation** ([`simulation`]): synthetic flights nudged on a timer
//!
//! The [`Controller`] owns all state and is meant to be driven from a single
//! UI thread:
//!
//! ```no_run
//! use flight_core::{Controller, ControllerConfig, OpenSkyClient, DEFAULT_FEED_URL};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), flight_core::FeedError> {
//! let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
//! let client = OpenSkyClient::new(DEFAULT_FEED_URL, Duration::from_secs(10))?;
//! let mut controller = Controller::new(client, ControllerConfig::default(), runtime.handle().clone());
//!
//! controller.load_static();
//! controller.select("AA1234");
//!
//! // Once per frame:
//! controller.poll_events();
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod controller;
pub mod error;
pub mod opensky;
pub mod overlay;
pub mod presenter;
pub mod projection;
pub mod record;
pub mod simulation;
pub mod store;
pub mod view;

pub use controller::{Controller, ControllerConfig, ControllerEvent, Mode, Notice, NoticeLevel};
pub use error::FeedError;
pub use opensky::{BoundingBox, LiveBatch, LiveSource, OpenSkyClient, StateVector, DEFAULT_FEED_URL};
pub use overlay::{Emphasis, Marker, Overlay};
pub use presenter::{DetailPanel, DetailSurface, PanelView, Section, Slot};
pub use projection::{MarkerPosition, Projection};
pub use record::{FlightRecord, NOT_AVAILABLE};
pub use store::FlightStore;
pub use view::ViewControls;

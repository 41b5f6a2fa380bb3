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

//! Application configuration management.
//!
//! Persistent settings stored as TOML through `confy`. Every field has a serde
//! default, so older or hand-edited files with missing keys still load.

use std::time::Duration;

use flight_core::opensky::DEFAULT_FEED_URL;
use flight_core::ControllerConfig;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "globe-flights";
const CONFIG_NAME: &str = "config";

/// Producer loaded when the window opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StartMode {
    #[default]
    Static,
    Live,
    Simulated,
}

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Latitude of the live search center
    #[serde(default = "default_center_latitude")]
    pub center_latitude: f64,

    /// Longitude of the live search center
    #[serde(default = "default_center_longitude")]
    pub center_longitude: f64,

    /// Live search radius in kilometres
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,

    /// Number of synthetic flights
    #[serde(default = "default_simulated_count")]
    pub simulated_count: usize,

    /// Milliseconds between simulation ticks
    #[serde(default = "default_simulation_interval_ms")]
    pub simulation_interval_ms: u64,

    /// Base URL of the state vector API
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    /// Live request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub start_mode: StartMode,
}

// Default value functions for serde
fn default_center_latitude() -> f64 {
    40.6413 // JFK
}

fn default_center_longitude() -> f64 {
    -73.7781
}

fn default_radius_km() -> f64 {
    250.0
}

fn default_simulated_count() -> usize {
    8
}

fn default_simulation_interval_ms() -> u64 {
    1000
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            center_latitude: default_center_latitude(),
            center_longitude: default_center_longitude(),
            radius_km: default_radius_km(),
            simulated_count: default_simulated_count(),
            simulation_interval_ms: default_simulation_interval_ms(),
            feed_url: default_feed_url(),
            request_timeout_secs: default_request_timeout_secs(),
            start_mode: StartMode::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Settings handed to the flight controller
    #[must_use]
    pub fn controller_config(&self, seed: Option<u64>) -> ControllerConfig {
        ControllerConfig {
            simulated_count: self.simulated_count.max(1),
            tick_interval: Duration::from_millis(self.simulation_interval_ms.max(50)),
            seed,
        }
    }
}

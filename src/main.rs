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

mod app;
mod config;
mod detail_pane;
mod globe;

use clap::Parser;
use eframe::egui;
use log::{info, warn};

use app::GlobeApp;
use config::{AppConfig, StartMode};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Plot static, live or simulated flights over a stylised globe.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Producer to load on startup
    #[arg(long, value_enum)]
    mode: Option<StartMode>,

    /// Live search center latitude
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Live search center longitude
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Live search radius in kilometres
    #[arg(long)]
    radius_km: Option<f64>,

    /// Number of simulated flights
    #[arg(long)]
    count: Option<usize>,

    /// State vector API base URL
    #[arg(long)]
    feed_url: Option<String>,

    /// Seed for the simulation, for repeatable runs
    #[arg(long)]
    seed: Option<u64>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Apply command-line overrides on top of the persisted config
    fn apply(&self, config: &mut AppConfig) {
        if let Some(mode) = self.mode {
            config.start_mode = mode;
        }
        if let Some(lat) = self.lat {
            config.center_latitude = lat;
        }
        if let Some(lon) = self.lon {
            config.center_longitude = lon;
        }
        if let Some(radius) = self.radius_km {
            config.radius_km = radius;
        }
        if let Some(count) = self.count {
            config.simulated_count = count;
        }
        if let Some(ref url) = self.feed_url {
            config.feed_url.clone_from(url);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    info!("Starting Globe Flights...");

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });
    if let Ok(path) = AppConfig::get_config_path() {
        info!("Config file: {}", path.display());
    }
    args.apply(&mut config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("globe-flights-io")
        .enable_all()
        .build()?;

    let app = GlobeApp::new(config, args.seed, runtime)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("Globe Flights"),
        ..Default::default()
    };

    eframe::run_native(
        "Globe Flights",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_override_config() {
        let args = Args::parse_from([
            "globe-flights",
            "--mode",
            "live",
            "--lat",
            "-33.94",
            "--lon",
            "151.17",
            "--count",
            "12",
        ]);
        let mut config = AppConfig::default();
        args.apply(&mut config);

        assert_eq!(config.start_mode, StartMode::Live);
        assert!((config.center_latitude - -33.94).abs() < f64::EPSILON);
        assert!((config.center_longitude - 151.17).abs() < f64::EPSILON);
        assert_eq!(config.simulated_count, 12);
        // Untouched values keep their defaults
        assert!((config.radius_km - 250.0).abs() < f64::EPSILON);
    }
}

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

//! Main window: controls and detail panel on the right, globe in the center.

use std::time::Duration;

use eframe::egui;
use flight_core::{Controller, FeedError, Mode, NoticeLevel, OpenSkyClient};
use log::{info, warn};

use crate::config::{AppConfig, StartMode};
use crate::detail_pane;
use crate::globe;

const SIDE_PANEL_WIDTH: f32 = 340.0;
const HEADER_COLOR: egui::Color32 = egui::Color32::from_rgb(100, 200, 100);
const DIM_TEXT: egui::Color32 = egui::Color32::from_rgb(150, 150, 150);

pub struct GlobeApp {
    controller: Controller<OpenSkyClient>,
    config: AppConfig,
    save_status: Option<String>,
    // Keeps the fetch and simulation tasks alive for the lifetime of the window
    _runtime: tokio::runtime::Runtime,
}

impl std::fmt::Debug for GlobeApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobeApp")
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}

impl GlobeApp {
    pub fn new(
        config: AppConfig,
        seed: Option<u64>,
        runtime: tokio::runtime::Runtime,
    ) -> Result<Self, FeedError> {
        let client = OpenSkyClient::new(config.feed_url.clone(), config.request_timeout())?;
        let controller =
            Controller::new(client, config.controller_config(seed), runtime.handle().clone());

        let mut app = Self {
            controller,
            config,
            save_status: None,
            _runtime: runtime,
        };

        match app.config.start_mode {
            StartMode::Static => app.controller.load_static(),
            StartMode::Live => app.start_live(),
            StartMode::Simulated => app.controller.load_default_simulation(),
        }
        info!("Application initialized in {} mode", app.controller.mode().label());

        Ok(app)
    }

    fn start_live(&mut self) {
        self.controller.load_live(
            self.config.center_latitude,
            self.config.center_longitude,
            self.config.radius_km,
        );
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("◈ FLIGHT BOARD")
            .color(HEADER_COLOR)
            .size(14.0)
            .strong());

        let mode = self.controller.mode();
        let mut status = format!("MODE: {} │ TRACKS: {}", mode.label(), self.controller.store().len());
        if mode == Mode::Simulated {
            status.push_str(&format!(" │ TICK {}", self.controller.ticks_applied()));
        }
        ui.label(egui::RichText::new(status).color(DIM_TEXT).size(10.0).monospace());
        ui.add_space(6.0);

        let pending = self.controller.live_request_pending();
        let running = self.controller.simulation_running();

        ui.horizontal(|ui| {
            if ui.button("Static").clicked() {
                self.controller.load_static();
            }
            let live_label = if pending { "Loading..." } else { "Live" };
            if ui.add_enabled(!pending, egui::Button::new(live_label)).clicked() {
                self.start_live();
            }
            if ui.button("Simulate").clicked() {
                self.controller.load_default_simulation();
            }
            if ui.add_enabled(running, egui::Button::new("Stop")).clicked() {
                self.controller.stop_simulation();
            }
        });

        ui.add_space(4.0);
        egui::CollapsingHeader::new("Search area")
            .default_open(true)
            .show(ui, |ui| {
                egui::Grid::new("search_area").num_columns(2).show(ui, |ui| {
                    ui.label("Latitude");
                    ui.add(egui::DragValue::new(&mut self.config.center_latitude)
                        .speed(0.05)
                        .range(-90.0..=90.0)
                        .max_decimals(4));
                    ui.end_row();

                    ui.label("Longitude");
                    ui.add(egui::DragValue::new(&mut self.config.center_longitude)
                        .speed(0.05)
                        .range(-180.0..=180.0)
                        .max_decimals(4));
                    ui.end_row();

                    ui.label("Radius");
                    ui.add(egui::Slider::new(&mut self.config.radius_km, 10.0..=1000.0).suffix(" km"));
                    ui.end_row();

                    ui.label("Simulated");
                    let mut count = self.controller.simulated_count();
                    if ui.add(egui::Slider::new(&mut count, 1..=50).suffix(" flights")).changed() {
                        self.controller.set_simulated_count(count);
                        self.config.simulated_count = count;
                    }
                    ui.end_row();
                });

                if ui.small_button("Save as defaults").clicked() {
                    self.save_status = Some(match self.config.save() {
                        Ok(()) => "Saved".to_string(),
                        Err(e) => {
                            warn!("Failed to save config: {}", e);
                            format!("Save failed: {e}")
                        }
                    });
                }
                if let Some(ref status) = self.save_status {
                    ui.label(egui::RichText::new(status).color(DIM_TEXT).size(9.0));
                }
            });

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            let view = *self.controller.view();
            if ui.add_enabled(view.can_zoom_out(), egui::Button::new("−")).clicked() {
                self.controller.zoom_out();
            }
            if ui.add_enabled(view.can_zoom_in(), egui::Button::new("+")).clicked() {
                self.controller.zoom_in();
            }
            if ui.button("Reset view").clicked() {
                self.controller.reset_view();
            }
            ui.label(egui::RichText::new(format!("×{:.1}", self.controller.view().scale()))
                .color(DIM_TEXT)
                .monospace());
        });

        self.draw_notice(ui);
    }

    fn draw_notice(&mut self, ui: &mut egui::Ui) {
        let Some(notice) = self.controller.notice().cloned() else {
            return;
        };

        let (fill, text) = match notice.level {
            NoticeLevel::Info => (egui::Color32::from_rgb(40, 60, 80), egui::Color32::from_rgb(180, 210, 240)),
            NoticeLevel::Warning => (egui::Color32::from_rgb(90, 60, 20), egui::Color32::from_rgb(255, 200, 100)),
        };

        ui.add_space(6.0);
        egui::Frame::group(ui.style())
            .fill(fill)
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new(&notice.message).color(text).size(11.0));
                    if ui.small_button("✕").clicked() {
                        self.controller.dismiss_notice();
                    }
                });
                let local = notice.raised_at.with_timezone(&chrono::Local);
                ui.label(egui::RichText::new(local.format("%H:%M:%S").to_string())
                    .color(DIM_TEXT)
                    .size(9.0)
                    .monospace());
            });
    }
}

impl eframe::App for GlobeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.poll_events();

        // Repaint faster while something is moving or loading
        let busy = self.controller.simulation_running() || self.controller.live_request_pending();
        ctx.request_repaint_after(Duration::from_millis(if busy { 100 } else { 500 }));

        egui::SidePanel::right("flight_panel")
            .resizable(false)
            .exact_width(SIDE_PANEL_WIDTH)
            .show(ctx, |ui| {
                self.draw_controls(ui);
                ui.separator();
                egui::ScrollArea::vertical().show(ui, |ui| {
                    detail_pane::show(ui, self.controller.panel());
                });
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(globe::SPACE_COLOR))
            .show(ctx, |ui| {
                let clicked = globe::draw(
                    ui,
                    self.controller.view(),
                    self.controller.overlay(),
                    self.controller.store(),
                );
                if let Some(flight_id) = clicked {
                    self.controller.select(&flight_id);
                }
            });
    }
}

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

//! Flight detail pane.
//!
//! Renders the presenter's [`DetailPanel`]: either the empty-state prompt or
//! the flight, origin and destination sections. Never both.

use eframe::egui;
use flight_core::{DetailPanel, PanelView, Section, Slot, NOT_AVAILABLE};

const SECTION_COLOR: egui::Color32 = egui::Color32::from_rgb(100, 180, 220);
const LABEL_COLOR: egui::Color32 = egui::Color32::from_rgb(150, 150, 150);
const VALUE_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 230, 240);

pub fn show(ui: &mut egui::Ui, panel: &DetailPanel) {
    match panel.view() {
        PanelView::Empty => show_empty(ui),
        PanelView::Detail => show_detail(ui, panel),
    }
}

fn show_empty(ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.label(egui::RichText::new("✈").size(32.0).color(LABEL_COLOR));
        ui.add_space(8.0);
        ui.label(egui::RichText::new("Select a flight on the globe to see its details")
            .color(LABEL_COLOR)
            .size(12.0));
    });
}

fn show_detail(ui: &mut egui::Ui, panel: &DetailPanel) {
    let number = panel.slot(Slot::Number).unwrap_or(NOT_AVAILABLE);
    ui.label(egui::RichText::new(number)
        .color(egui::Color32::from_rgb(255, 210, 90))
        .size(18.0)
        .monospace()
        .strong());
    ui.add_space(4.0);

    show_section(ui, panel, Section::Flight, "◈ FLIGHT");
    show_section(ui, panel, Section::Origin, "◈ ORIGIN");
    show_section(ui, panel, Section::Destination, "◈ DESTINATION");
}

fn show_section(ui: &mut egui::Ui, panel: &DetailPanel, section: Section, title: &str) {
    ui.add_space(6.0);
    ui.label(egui::RichText::new(title).color(SECTION_COLOR).size(12.0).strong());

    egui::Grid::new(title)
        .num_columns(2)
        .striped(true)
        .spacing([12.0, 3.0])
        .show(ui, |ui| {
            for (slot, value) in panel.section(section) {
                if slot == Slot::Number {
                    continue;
                }
                ui.label(egui::RichText::new(slot.label()).color(LABEL_COLOR).size(10.0));
                ui.label(egui::RichText::new(value).color(VALUE_COLOR).size(11.0).monospace());
                ui.end_row();
            }
        });
}

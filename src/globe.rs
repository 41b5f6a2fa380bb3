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

//! Stylised globe background and flight markers.

use eframe::egui;
use flight_core::{Emphasis, FlightStore, Marker, MarkerPosition, Overlay, ViewControls};

pub const SPACE_COLOR: egui::Color32 = egui::Color32::from_rgb(8, 12, 24);
const OCEAN_COLOR: egui::Color32 = egui::Color32::from_rgb(20, 60, 110);
const ATMOSPHERE_COLOR: egui::Color32 = egui::Color32::from_rgba_premultiplied(30, 70, 120, 60);
const GRID_COLOR: egui::Color32 = egui::Color32::from_rgba_premultiplied(90, 140, 190, 90);
const MARKER_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 210, 90);
const SELECTED_RING: egui::Color32 = egui::Color32::from_rgb(255, 80, 80);

/// Globe radius as a fraction of the shorter side, at neutral scale.
const GLOBE_FRACTION: f32 = 0.42;
const MARKER_RADIUS: f32 = 5.0;
const HEADING_TICK: f32 = 13.0;
/// Click tolerance around a marker, in pixels.
const HIT_RADIUS_PX: f32 = 10.0;

/// Paint the globe and markers. Returns the id of a clicked marker, if any.
pub fn draw(
    ui: &mut egui::Ui,
    view: &ViewControls,
    overlay: &Overlay,
    store: &FlightStore,
) -> Option<String> {
    let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click());
    let rect = response.rect;

    draw_globe(&painter, rect, view);

    let to_screen = |pos: MarkerPosition| {
        egui::pos2(
            rect.left() + rect.width() * pos.left / 100.0,
            rect.top() + rect.height() * pos.top / 100.0,
        )
    };

    // Dimmed markers first, selected last so it sits on top
    let highlighted = overlay.highlighted();
    let mut markers: Vec<&Marker> = overlay.markers().iter().collect();
    markers.sort_by_key(|m| {
        (
            m.emphasis == Emphasis::Full,
            highlighted == Some(m.flight_id.as_str()),
        )
    });

    for marker in markers {
        let selected = highlighted == Some(marker.flight_id.as_str());
        draw_marker(&painter, to_screen(marker.position), marker, store, selected);
    }

    if response.clicked() {
        if let Some(click) = response.interact_pointer_pos() {
            let top = (click.y - rect.top()) / rect.height() * 100.0;
            let left = (click.x - rect.left()) / rect.width() * 100.0;
            let radius = HIT_RADIUS_PX / rect.width().min(rect.height()) * 100.0;
            return overlay.hit_test(top, left, radius).map(ToString::to_string);
        }
    }

    None
}

fn draw_globe(painter: &egui::Painter, rect: egui::Rect, view: &ViewControls) {
    let center = rect.center();
    let radius = rect.width().min(rect.height()) * GLOBE_FRACTION * view.scale();
    let stroke = egui::Stroke::new(1.0, GRID_COLOR);

    painter.circle_filled(center, radius * 1.05, ATMOSPHERE_COLOR);
    painter.circle_filled(center, radius, OCEAN_COLOR);

    // Parallels every 30°
    for lat_deg in [-60.0_f32, -30.0, 0.0, 30.0, 60.0] {
        let lat = lat_deg.to_radians();
        let y = center.y - radius * lat.sin();
        let half = radius * lat.cos();
        painter.line_segment([egui::pos2(center.x - half, y), egui::pos2(center.x + half, y)], stroke);
    }

    // Meridians every 30°, turned by the view rotation; only the near side is drawn
    let rotation = view.rotation_degrees().to_radians();
    for k in 0u8..12 {
        let lon = (f32::from(k) * 30.0).to_radians() + rotation;
        if lon.cos() <= 0.0 {
            continue;
        }
        let points: Vec<egui::Pos2> = (0u8..=36)
            .map(|i| {
                let lat = (f32::from(i) * 5.0 - 90.0).to_radians();
                egui::pos2(
                    center.x + radius * lon.sin() * lat.cos(),
                    center.y - radius * lat.sin(),
                )
            })
            .collect();
        painter.add(egui::Shape::line(points, stroke));
    }

    painter.circle_stroke(center, radius, egui::Stroke::new(1.5, GRID_COLOR));
}

fn draw_marker(
    painter: &egui::Painter,
    pos: egui::Pos2,
    marker: &Marker,
    store: &FlightStore,
    selected: bool,
) {
    let alpha = marker.emphasis.opacity();
    let color = MARKER_COLOR.gamma_multiply(alpha);
    let record = store.get(&marker.flight_id);

    painter.circle_filled(pos, MARKER_RADIUS, color);
    if selected {
        painter.circle_stroke(pos, MARKER_RADIUS + 3.0, egui::Stroke::new(2.0, SELECTED_RING));
    }

    // Heading tick for records that carry one, e.g. "275°"
    let heading = record
        .and_then(|r| r.heading.as_deref())
        .and_then(|h| h.trim_end_matches('°').parse::<f32>().ok());
    if let Some(heading) = heading {
        let angle = heading.to_radians();
        let end = pos + egui::vec2(angle.sin(), -angle.cos()) * HEADING_TICK;
        painter.line_segment([pos, end], egui::Stroke::new(2.0, color));
    }

    let label = record.map_or(marker.flight_id.as_str(), |r| r.number.as_str());
    let text_pos = pos + egui::vec2(10.0, -8.0);
    let galley = painter.layout_no_wrap(
        label.to_string(),
        egui::FontId::proportional(11.0),
        egui::Color32::WHITE.gamma_multiply(alpha),
    );
    let padding = egui::vec2(3.0, 2.0);
    let box_rect = egui::Rect::from_min_size(
        text_pos - egui::vec2(padding.x, galley.size().y / 2.0 + padding.y),
        galley.size() + padding * 2.0,
    );
    painter.rect_filled(box_rect, 2.0, egui::Color32::from_black_alpha(150).gamma_multiply(alpha));
    painter.galley(
        text_pos - egui::vec2(0.0, galley.size().y / 2.0),
        galley,
        egui::Color32::WHITE,
    );
}

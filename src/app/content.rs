//! Content rendering for `WorkoutApp`.
//!
//! - `draw_header` — title, feed source and refresh status
//! - `draw_feed`   — workout entries inside the pull-to-refresh surface
//! - `draw_notice` — bottom toast for refresh failures

use eframe::egui;

use pull_refresh::mobile::RefreshPhase;

use super::feed::SharedFeed;
use super::{Notice, WorkoutApp};

impl WorkoutApp {
    pub fn draw_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Workouts");

            let status = match self.surface.controller().phase() {
                RefreshPhase::Idle => "Pull down to refresh",
                RefreshPhase::Dragging => "Keep pulling",
                RefreshPhase::ThresholdMet => "Release to refresh",
                RefreshPhase::Refreshing => "Refreshing...",
            };
            ui.label(egui::RichText::new(status).size(12.0).color(egui::Color32::GRAY));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let icon = if self.dark_mode { "Light" } else { "Dark" };
                if ui.button(icon).clicked() {
                    self.dark_mode = !self.dark_mode;
                }
            });
        });

        let feed = self.feed.lock().unwrap_or_else(|e| e.into_inner());
        let updated = match feed.refreshed_at {
            Some(t) => format!("Updated {}s ago", t.elapsed().as_secs()),
            None => "Not loaded yet".to_string(),
        };
        ui.label(
            egui::RichText::new(format!("{} · {}", self.source.describe(), updated))
                .size(11.0)
                .color(egui::Color32::from_gray(140)),
        );
    }
}

/// Render the workout list. Returns the number of entries drawn.
pub fn draw_feed(ui: &mut egui::Ui, feed: &SharedFeed) -> usize {
    let feed = feed.lock().unwrap_or_else(|e| e.into_inner());

    if feed.entries.is_empty() {
        ui.add_space(24.0);
        ui.vertical_centered(|ui| {
            ui.label(
                egui::RichText::new("No workouts yet. Pull down to load your plan.")
                    .color(egui::Color32::GRAY),
            );
        });
        return 0;
    }

    for entry in &feed.entries {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.label(egui::RichText::new(&entry.title).size(16.0).strong());
            if let Some(detail) = &entry.detail {
                ui.label(egui::RichText::new(detail).size(13.0));
            }
        });
        ui.add_space(4.0);
    }
    feed.entries.len()
}

pub fn draw_notice(ctx: &egui::Context, notice: &Notice) {
    egui::Area::new(egui::Id::new("refresh_notice"))
        .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -24.0))
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.label(
                    egui::RichText::new(&notice.message)
                        .color(egui::Color32::from_rgb(255, 152, 0)),
                );
            });
        });
}

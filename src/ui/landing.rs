// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Landing view: choose and validate the stream before opening the surface.

use crate::models::stream::{Quality, StreamSettings};

/// Action requested from the landing view.
#[derive(Debug, Clone, PartialEq)]
pub enum LandingAction {
    None,
    /// Settings passed validation; open the stream view.
    Start(StreamSettings),
    /// Validation failed with a message for the user.
    Invalid(String),
}

/// Validate `settings` for opening, trimming the URL on success.
pub fn submit(settings: &StreamSettings) -> LandingAction {
    let mut settings = settings.clone();
    settings.rtsp_url = settings.rtsp_url.trim().to_string();

    match settings.validate() {
        Ok(()) => LandingAction::Start(settings),
        Err(errors) => {
            let message = errors
                .for_field("rtspUrl")
                .map(str::to_string)
                .unwrap_or_else(|| errors.to_string());
            LandingAction::Invalid(message)
        }
    }
}

/// Display the landing view.
pub fn show(ui: &mut egui::Ui, settings: &mut StreamSettings, samples: &[String]) -> LandingAction {
    let mut action = LandingAction::None;

    ui.vertical_centered(|ui| {
        ui.add_space(48.0);
        ui.heading(egui::RichText::new("StreamOverlay").size(32.0).strong());
        ui.label(
            egui::RichText::new("Live streams with draggable text and logo overlays")
                .weak(),
        );
        ui.add_space(24.0);

        ui.horizontal(|ui| {
            let width = 560.0_f32.min(ui.available_width() - 120.0).max(200.0);
            ui.add_space(((ui.available_width() - width - 100.0) / 2.0).max(0.0));
            let response = ui.add(
                egui::TextEdit::singleline(&mut settings.rtsp_url)
                    .hint_text("rtsp://your-stream-url")
                    .desired_width(width),
            );
            let entered =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("▶ Start").clicked() || entered {
                action = submit(settings);
            }
        });

        ui.add_space(8.0);
        ui.label(egui::RichText::new("Try a sample:").small().weak());
        for sample in samples {
            if ui.link(egui::RichText::new(sample).monospace().small()).clicked() {
                settings.rtsp_url = sample.clone();
            }
        }

        ui.add_space(16.0);
        egui::CollapsingHeader::new("Stream settings")
            .default_open(false)
            .show(ui, |ui| {
                egui::Grid::new("stream_settings")
                    .num_columns(2)
                    .spacing([12.0, 6.0])
                    .show(ui, |ui| {
                        ui.label("Quality");
                        ui.horizontal(|ui| {
                            for quality in Quality::ALL {
                                ui.radio_value(&mut settings.quality, quality, quality.label());
                            }
                        });
                        ui.end_row();

                        ui.label("Bitrate");
                        ui.add(
                            egui::Slider::new(&mut settings.bitrate, 500..=10_000)
                                .step_by(100.0)
                                .suffix(" kbps"),
                        );
                        ui.end_row();

                        ui.label("Frame rate");
                        ui.add(egui::Slider::new(&mut settings.frame_rate, 15..=60).suffix(" fps"));
                        ui.end_row();

                        ui.label("Buffer");
                        ui.add(egui::Slider::new(&mut settings.buffer_size, 1..=10).suffix(" s"));
                        ui.end_row();

                        ui.label("Auto reconnect");
                        ui.checkbox(&mut settings.auto_reconnect, "");
                        ui.end_row();
                    });
            });

        ui.add_space(32.0);
        ui.columns(3, |columns| {
            feature(&mut columns[0], "📡", "Live streaming", "RTSP and HTTP sources");
            feature(&mut columns[1], "🔤", "Custom overlays", "Text, images and logos");
            feature(&mut columns[2], "✋", "Drag and drop", "Place overlays directly on the video");
        });
    });

    action
}

fn feature(ui: &mut egui::Ui, icon: &str, title: &str, detail: &str) {
    ui.vertical_centered(|ui| {
        ui.label(egui::RichText::new(icon).size(28.0));
        ui.label(egui::RichText::new(title).strong());
        ui.label(egui::RichText::new(detail).small().weak());
    });
}

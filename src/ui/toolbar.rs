// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Stream view toolbar.
//!
//! Shows the active stream and the common overlay operations.

/// Action requested from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    AddOverlay,
    Refresh,
    ShowAll,
    HideAll,
    ToggleAnalytics,
    ChangeStream,
}

/// Display the toolbar above the video surface.
pub fn show(
    ui: &mut egui::Ui,
    stream_url: &str,
    overlay_count: usize,
    max_overlays: usize,
    loading: bool,
) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label(egui::RichText::new("● LIVE").color(egui::Color32::from_rgb(0xef, 0x44, 0x44)));
        ui.label(egui::RichText::new(stream_url).monospace().weak());

        ui.separator();

        let can_add = overlay_count < max_overlays;
        if ui
            .add_enabled(can_add, egui::Button::new("➕ Add Overlay"))
            .on_disabled_hover_text(format!("At most {} overlays", max_overlays))
            .clicked()
        {
            action = ToolbarAction::AddOverlay;
        }

        if ui.button("👁 Show All").clicked() {
            action = ToolbarAction::ShowAll;
        }
        if ui.button("🚫 Hide All").clicked() {
            action = ToolbarAction::HideAll;
        }

        ui.separator();

        if ui.add_enabled(!loading, egui::Button::new("⟳ Refresh")).clicked() {
            action = ToolbarAction::Refresh;
        }
        if loading {
            ui.spinner();
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Change Stream").clicked() {
                action = ToolbarAction::ChangeStream;
            }
            if ui.button("📊 Analytics").clicked() {
                action = ToolbarAction::ToggleAnalytics;
            }
            ui.label(
                egui::RichText::new(format!("{}/{} overlays", overlay_count, max_overlays))
                    .italics()
                    .weak(),
            );
        });
    });

    action
}

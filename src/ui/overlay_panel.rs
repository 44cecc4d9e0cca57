// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay list panel.
//!
//! Lists every cached overlay, hidden ones included, with quick actions for
//! selection, visibility, editing and deletion.

use crate::interaction::selection::Selection;
use crate::models::overlay::{Overlay, OverlayId};

const PREVIEW_CHARS: usize = 40;

/// Action requested from the overlay panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    None,
    Select(OverlayId),
    Edit(OverlayId),
    Delete(OverlayId),
    ToggleVisibility(OverlayId, bool),
}

/// One-line summary of an overlay's placement.
pub fn placement_label(overlay: &Overlay) -> String {
    format!(
        "({:.1}%, {:.1}%) · {:.0}×{:.0}",
        overlay.x, overlay.y, overlay.width, overlay.height
    )
}

/// Display the overlay list.
pub fn show(
    ui: &mut egui::Ui,
    overlays: &[Overlay],
    selection: &Selection,
    error: Option<&str>,
) -> PanelAction {
    let mut action = PanelAction::None;

    ui.heading("Overlays");
    ui.separator();

    if let Some(error) = error {
        ui.colored_label(ui.visuals().error_fg_color, error);
        ui.separator();
    }

    if overlays.is_empty() {
        ui.label(egui::RichText::new("No overlays yet. Use Add Overlay to create one.").weak());
        return action;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for overlay in overlays {
            let selected = selection.is_selected(&overlay.id);

            egui::Frame::group(ui.style())
                .stroke(if selected {
                    egui::Stroke::new(1.5, crate::ui::video_surface::SELECTED_BORDER)
                } else {
                    ui.visuals().widgets.noninteractive.bg_stroke
                })
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());

                    ui.horizontal(|ui| {
                        let title = egui::RichText::new(overlay.kind.label()).strong();
                        if ui.selectable_label(selected, title).clicked() {
                            action = PanelAction::Select(overlay.id.clone());
                        }
                        if !overlay.is_visible {
                            ui.label(egui::RichText::new("hidden").italics().weak());
                        }
                    });

                    ui.label(overlay.content_preview(PREVIEW_CHARS));
                    ui.label(egui::RichText::new(placement_label(overlay)).small().weak());

                    ui.horizontal(|ui| {
                        let (icon, hint) = if overlay.is_visible {
                            ("👁", "Hide overlay")
                        } else {
                            ("🚫", "Show overlay")
                        };
                        if ui.small_button(icon).on_hover_text(hint).clicked() {
                            action =
                                PanelAction::ToggleVisibility(overlay.id.clone(), !overlay.is_visible);
                        }
                        if ui.small_button("✏").on_hover_text("Edit overlay").clicked() {
                            action = PanelAction::Edit(overlay.id.clone());
                        }
                        if ui.small_button("🗑").on_hover_text("Delete overlay").clicked() {
                            action = PanelAction::Delete(overlay.id.clone());
                        }
                    });
                });
        }
    });

    action
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay create/edit form.
//!
//! The form edits a [`NewOverlay`] draft in a floating window. Submitting
//! validates the draft and hands it back to the application, which sends it
//! to the store; validation messages are shown next to the offending fields.

use crate::models::overlay::{Animation, NewOverlay, Overlay, OverlayId, OverlayKind};
use crate::models::validation::{FieldError, ValidationErrors};
use crate::util::color::{color_or, to_css};
use egui::color_picker::{color_edit_button_srgba, Alpha};
use egui::Color32;

/// Result of interacting with the form this frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    None,
    Save {
        /// `None` when creating a new overlay.
        editing: Option<OverlayId>,
        draft: NewOverlay,
    },
    Cancel,
}

/// State of the open overlay form.
#[derive(Debug, Clone)]
pub struct OverlayForm {
    editing: Option<OverlayId>,
    pub draft: NewOverlay,
    errors: Option<ValidationErrors>,
    color: Color32,
    background: Color32,
}

impl OverlayForm {
    /// Blank form for a new overlay.
    pub fn create() -> Self {
        Self::from_draft(None, NewOverlay::default())
    }

    /// Form pre-filled with an existing overlay.
    pub fn edit(overlay: &Overlay) -> Self {
        Self::from_draft(Some(overlay.id.clone()), NewOverlay::from_overlay(overlay))
    }

    fn from_draft(editing: Option<OverlayId>, draft: NewOverlay) -> Self {
        let color = color_or(&draft.color, Color32::WHITE);
        let background = color_or(&draft.background_color, Color32::from_black_alpha(128));
        Self {
            editing,
            draft,
            errors: None,
            color,
            background,
        }
    }

    pub fn editing(&self) -> Option<&OverlayId> {
        self.editing.as_ref()
    }

    pub fn title(&self) -> &'static str {
        if self.editing.is_some() {
            "Edit Overlay"
        } else {
            "Add Overlay"
        }
    }

    /// Validation message for `field` from the last submit.
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.as_ref().and_then(|e| e.for_field(field))
    }

    /// Validate the draft, returning a save action when it is acceptable.
    pub fn submit(&mut self) -> FormAction {
        match self.check() {
            Ok(()) => {
                self.errors = None;
                FormAction::Save {
                    editing: self.editing.clone(),
                    draft: self.draft.clone(),
                }
            }
            Err(errors) => {
                log::warn!("Overlay form rejected: {}", errors);
                self.errors = Some(errors);
                FormAction::None
            }
        }
    }

    fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.draft.validate() {
            Ok(()) => Vec::new(),
            Err(ValidationErrors(errors)) => errors,
        };

        let content = self.draft.content.trim();
        if self.draft.kind.content_is_url()
            && !content.is_empty()
            && url::Url::parse(content).is_err()
        {
            errors.push(FieldError {
                field: "content",
                message: "must be a valid URL".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

fn field_error(ui: &mut egui::Ui, form: &OverlayForm, field: &str) {
    if let Some(message) = form.error(field) {
        ui.colored_label(ui.visuals().error_fg_color, message);
    }
}

/// Display the form window; `open` is cleared when the window is closed.
pub fn show(ctx: &egui::Context, form: &mut OverlayForm) -> FormAction {
    let mut action = FormAction::None;
    let mut open = true;

    egui::Window::new(form.title())
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .default_width(360.0)
        .show(ctx, |ui| {
            egui::Grid::new("overlay_form")
                .num_columns(2)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Type");
                    ui.horizontal(|ui| {
                        for kind in OverlayKind::ALL {
                            ui.radio_value(&mut form.draft.kind, kind, kind.label());
                        }
                    });
                    ui.end_row();

                    let content_label = if form.draft.kind.content_is_url() {
                        "Image URL"
                    } else {
                        "Text"
                    };
                    ui.label(content_label);
                    ui.vertical(|ui| {
                        if form.draft.kind.content_is_url() {
                            ui.add(
                                egui::TextEdit::singleline(&mut form.draft.content)
                                    .hint_text("https://example.com/logo.png"),
                            );
                        } else {
                            ui.add(
                                egui::TextEdit::multiline(&mut form.draft.content)
                                    .desired_rows(2)
                                    .hint_text("Overlay text"),
                            );
                        }
                        field_error(ui, form, "content");
                    });
                    ui.end_row();

                    ui.label("Position (%)");
                    ui.vertical(|ui| {
                        ui.horizontal(|ui| {
                            ui.add(egui::DragValue::new(&mut form.draft.x).clamp_range(0.0..=100.0).prefix("x "));
                            ui.add(egui::DragValue::new(&mut form.draft.y).clamp_range(0.0..=100.0).prefix("y "));
                        });
                        field_error(ui, form, "x");
                        field_error(ui, form, "y");
                    });
                    ui.end_row();

                    ui.label("Size (px)");
                    ui.vertical(|ui| {
                        ui.horizontal(|ui| {
                            ui.add(egui::DragValue::new(&mut form.draft.width).clamp_range(1.0..=4000.0).prefix("w "));
                            ui.add(egui::DragValue::new(&mut form.draft.height).clamp_range(1.0..=4000.0).prefix("h "));
                        });
                        field_error(ui, form, "width");
                        field_error(ui, form, "height");
                    });
                    ui.end_row();

                    if form.draft.kind == OverlayKind::Text {
                        ui.label("Font size");
                        ui.add(egui::Slider::new(&mut form.draft.font_size, 8..=72));
                        ui.end_row();
                    }

                    ui.label("Colors");
                    ui.horizontal(|ui| {
                        if color_edit_button_srgba(ui, &mut form.color, Alpha::OnlyBlend).changed() {
                            form.draft.color = to_css(form.color);
                        }
                        ui.label("text");
                        if color_edit_button_srgba(ui, &mut form.background, Alpha::OnlyBlend)
                            .changed()
                        {
                            form.draft.background_color = to_css(form.background);
                        }
                        ui.label("background");
                    });
                    ui.end_row();

                    ui.label("Border radius");
                    ui.add(egui::Slider::new(&mut form.draft.border_radius, 0..=50));
                    ui.end_row();

                    ui.label("Opacity");
                    ui.add(egui::Slider::new(&mut form.draft.opacity, 0.0..=1.0).step_by(0.05));
                    ui.end_row();

                    ui.label("Rotation");
                    ui.add(egui::Slider::new(&mut form.draft.rotation, -180.0..=180.0).suffix("°"));
                    ui.end_row();

                    ui.label("Layer");
                    ui.add(egui::DragValue::new(&mut form.draft.z_index).clamp_range(0..=100));
                    ui.end_row();

                    ui.label("Animation");
                    egui::ComboBox::from_id_source("overlay_animation")
                        .selected_text(form.draft.animation.label())
                        .show_ui(ui, |ui| {
                            for animation in Animation::ALL {
                                ui.selectable_value(
                                    &mut form.draft.animation,
                                    animation,
                                    animation.label(),
                                );
                            }
                        });
                    ui.end_row();

                    ui.label("Visible");
                    ui.checkbox(&mut form.draft.is_visible, "");
                    ui.end_row();
                });

            ui.separator();
            ui.horizontal(|ui| {
                let save_label = if form.editing.is_some() { "Update" } else { "Create" };
                if ui.button(save_label).clicked() {
                    action = form.submit();
                }
                if ui.button("Cancel").clicked() {
                    action = FormAction::Cancel;
                }
            });
        });

    if !open {
        action = FormAction::Cancel;
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_valid_draft() {
        let mut form = OverlayForm::create();
        form.draft.content = "LIVE".to_string();

        match form.submit() {
            FormAction::Save { editing, draft } => {
                assert!(editing.is_none());
                assert_eq!(draft.content, "LIVE");
                assert_eq!(draft.x, 50.0);
            }
            other => panic!("expected save, got {:?}", other),
        }
        assert!(form.error("content").is_none());
    }

    #[test]
    fn test_submit_reports_field_errors() {
        let mut form = OverlayForm::create();
        form.draft.x = 120.0;

        assert_eq!(form.submit(), FormAction::None);
        assert_eq!(form.error("content"), Some("is required"));
        assert_eq!(form.error("x"), Some("must be between 0 and 100"));

        form.draft.content = "fixed".to_string();
        form.draft.x = 10.0;
        assert!(matches!(form.submit(), FormAction::Save { .. }));
        assert!(form.error("x").is_none());
    }

    #[test]
    fn test_image_content_must_be_url() {
        let mut form = OverlayForm::create();
        form.draft.kind = OverlayKind::Image;
        form.draft.content = "not a url".to_string();
        assert_eq!(form.submit(), FormAction::None);
        assert_eq!(form.error("content"), Some("must be a valid URL"));

        form.draft.content = "https://example.com/logo.png".to_string();
        assert!(matches!(form.submit(), FormAction::Save { .. }));
    }

    #[test]
    fn test_edit_keeps_id_and_values() {
        let overlay = NewOverlay {
            content: "Score".to_string(),
            x: 12.0,
            ..Default::default()
        }
        .into_overlay(OverlayId::new("abc"), chrono::Utc::now());

        let mut form = OverlayForm::edit(&overlay);
        assert_eq!(form.title(), "Edit Overlay");
        assert_eq!(form.editing(), Some(&OverlayId::new("abc")));

        match form.submit() {
            FormAction::Save { editing, draft } => {
                assert_eq!(editing, Some(OverlayId::new("abc")));
                assert_eq!(draft.x, 12.0);
            }
            other => panic!("expected save, got {:?}", other),
        }
    }
}

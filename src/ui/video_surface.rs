// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video surface with draggable overlays.
//!
//! This module lays visible overlays out over the video area, draws them
//! with their rotation, opacity and z-order, and reports pointer events for
//! the drag controller. Pointer movement and release are read at viewport
//! scope, and only while a drag is active, so a fast drag that leaves the
//! surface still ends cleanly.

use crate::interaction::selection::Selection;
use crate::models::overlay::{Overlay, OverlayId, OverlayKind};
use crate::ui::image_cache::ImageCache;
use crate::util::color::color_or;
use crate::util::geometry::{fit_aspect, position_to_screen, ScreenPoint, ScreenRect};

pub const VIDEO_ASPECT: f32 = 16.0 / 9.0;
pub const SELECTED_BORDER: egui::Color32 = egui::Color32::from_rgb(0x3b, 0x82, 0xf6);

/// Still frame shown behind the overlays.
pub struct Poster {
    pub texture: egui::TextureHandle,
    /// Width over height.
    pub aspect: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    Selected,
    Normal,
}

impl BorderStyle {
    pub fn stroke(&self) -> egui::Stroke {
        match self {
            BorderStyle::Selected => egui::Stroke::new(2.0, SELECTED_BORDER),
            BorderStyle::Normal => egui::Stroke::new(
                1.0,
                egui::Color32::from_rgba_unmultiplied(255, 255, 255, 77),
            ),
        }
    }
}

/// Where and how one overlay is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayout {
    pub id: OverlayId,
    /// Unrotated bounds in screen coordinates.
    pub rect: ScreenRect,
    /// Degrees, clockwise, around the rect's center.
    pub rotation: f32,
    pub opacity: f32,
    pub z_index: i32,
    /// Background, with opacity applied.
    pub fill: egui::Color32,
    /// Text and glyph color, with opacity applied.
    pub text_color: egui::Color32,
    pub corner_radius: f32,
    pub border: BorderStyle,
}

/// Lay out the visible overlays in drawing order (lowest z-index first).
pub fn layout_overlays(
    overlays: &[Overlay],
    container: &ScreenRect,
    selection: &Selection,
) -> Vec<OverlayLayout> {
    let mut layouts: Vec<OverlayLayout> = overlays
        .iter()
        .filter(|o| o.is_visible)
        .map(|o| {
            let corner = position_to_screen(o.position(), container);
            let opacity = o.opacity.clamp(0.0, 1.0) as f32;
            OverlayLayout {
                id: o.id.clone(),
                rect: ScreenRect::new(corner.x, corner.y, o.width as f32, o.height as f32),
                rotation: o.rotation as f32,
                opacity,
                z_index: o.z_index,
                fill: color_or(&o.background_color, egui::Color32::TRANSPARENT)
                    .gamma_multiply(opacity),
                text_color: color_or(&o.color, egui::Color32::WHITE).gamma_multiply(opacity),
                corner_radius: o.border_radius as f32,
                border: if selection.is_selected(&o.id) {
                    BorderStyle::Selected
                } else {
                    BorderStyle::Normal
                },
            }
        })
        .collect();

    // Stable, so equal z-indexes keep list order
    layouts.sort_by_key(|l| l.z_index);
    layouts
}

/// Topmost overlay under `point`.
pub fn hit_test(layouts: &[OverlayLayout], point: ScreenPoint) -> Option<&OverlayLayout> {
    layouts.iter().rev().find(|l| l.rect.contains(point))
}

/// Pointer activity on the surface during one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    PointerDown {
        id: OverlayId,
        pointer: ScreenPoint,
        overlay_rect: ScreenRect,
    },
    BackgroundPressed,
    PointerMoved {
        pointer: ScreenPoint,
        container: ScreenRect,
    },
    PointerReleased,
    EscapePressed,
}

/// Display the video surface and collect pointer events.
pub fn show(
    ui: &mut egui::Ui,
    overlays: &[Overlay],
    selection: &Selection,
    dragging: bool,
    poster: Option<&Poster>,
    images: &ImageCache,
    stream_label: &str,
) -> Vec<SurfaceEvent> {
    let mut events = Vec::new();

    let available = ui.available_size();
    let (response, _) = ui.allocate_painter(available, egui::Sense::click());
    let container = fit_aspect(&response.rect.into(), VIDEO_ASPECT);
    let container_rect: egui::Rect = container.into();
    let painter = ui.painter_at(container_rect);

    painter.rect_filled(container_rect, 8.0, egui::Color32::BLACK);
    if let Some(poster) = poster {
        let image_rect: egui::Rect = fit_aspect(&container, poster.aspect).into();
        painter.image(
            poster.texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    } else {
        painter.text(
            container_rect.center(),
            egui::Align2::CENTER_CENTER,
            "No video frame",
            egui::FontId::proportional(18.0),
            egui::Color32::from_gray(110),
        );
    }
    painter.text(
        container_rect.left_bottom() + egui::vec2(12.0, -12.0),
        egui::Align2::LEFT_BOTTOM,
        stream_label,
        egui::FontId::monospace(11.0),
        egui::Color32::from_gray(150),
    );

    let layouts = layout_overlays(overlays, &container, selection);
    for layout in &layouts {
        if let Some(overlay) = overlays.iter().find(|o| o.id == layout.id) {
            draw_overlay(&painter, overlay, layout, images);
        }
    }

    if let Some(selected) = selection.selected().and_then(|id| overlays.iter().find(|o| &o.id == id)) {
        draw_selection_badge(&painter, container_rect, selected);
    }

    let (pressed, press_pos, latest_pos, moved, released, primary_down, escape) = ui.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.press_origin(),
            i.pointer.latest_pos(),
            i.pointer.delta() != egui::Vec2::ZERO,
            i.pointer.primary_released(),
            i.pointer.primary_down(),
            i.key_pressed(egui::Key::Escape),
        )
    });

    let hovered = latest_pos
        .filter(|_| response.hovered())
        .and_then(|pos| hit_test(&layouts, pos.into()));
    if dragging {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
    } else if hovered.is_some() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Move);
    }

    if pressed && response.hovered() {
        if let Some(pos) = press_pos.filter(|p| container_rect.contains(*p)) {
            match hit_test(&layouts, pos.into()) {
                Some(layout) => events.push(SurfaceEvent::PointerDown {
                    id: layout.id.clone(),
                    pointer: pos.into(),
                    overlay_rect: layout.rect,
                }),
                None => events.push(SurfaceEvent::BackgroundPressed),
            }
        }
    }

    if dragging {
        if let Some(pos) = latest_pos.filter(|_| moved) {
            events.push(SurfaceEvent::PointerMoved {
                pointer: pos.into(),
                container,
            });
        }
        if released || !primary_down {
            events.push(SurfaceEvent::PointerReleased);
        }
    }

    if escape {
        events.push(SurfaceEvent::EscapePressed);
    }

    events
}

/// Corners of `rect` rotated by `degrees` around its center.
fn rotated_corners(rect: egui::Rect, degrees: f32) -> Vec<egui::Pos2> {
    let center = rect.center();
    let rot = egui::emath::Rot2::from_angle(degrees.to_radians());
    [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
    ]
    .into_iter()
    .map(|corner| center + rot * (corner - center))
    .collect()
}

fn draw_overlay(
    painter: &egui::Painter,
    overlay: &Overlay,
    layout: &OverlayLayout,
    images: &ImageCache,
) {
    let rect: egui::Rect = layout.rect.into();
    let text_color = layout.text_color;
    let stroke = layout.border.stroke();

    if layout.rotation == 0.0 {
        painter.rect_filled(rect, layout.corner_radius, layout.fill);
        painter.rect_stroke(rect, layout.corner_radius, stroke);
    } else {
        painter.add(egui::Shape::convex_polygon(
            rotated_corners(rect, layout.rotation),
            layout.fill,
            stroke,
        ));
    }

    let inner_width = (rect.width() - 16.0).max(1.0);
    match overlay.kind {
        OverlayKind::Text => {
            let galley = painter.layout(
                overlay.content.clone(),
                egui::FontId::proportional(overlay.font_size as f32),
                text_color,
                inner_width,
            );
            let pos = rect.center() - galley.size() / 2.0;
            painter.galley(pos, galley, text_color);
        }
        OverlayKind::Image => match images.texture(&overlay.content) {
            Some((texture, aspect)) => draw_image(painter, texture, aspect, layout),
            None => {
                let glyph = if images.is_failed(&overlay.content) { "⚠" } else { "🖼" };
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_BOTTOM,
                    glyph,
                    egui::FontId::proportional(overlay.font_size as f32),
                    text_color,
                );
                let galley = painter.layout(
                    overlay.content_preview(24),
                    egui::FontId::proportional(10.0),
                    text_color.gamma_multiply(0.7),
                    inner_width,
                );
                let pos =
                    egui::pos2(rect.center().x - galley.size().x / 2.0, rect.center().y + 2.0);
                painter.galley(pos, galley, text_color);
            }
        },
        OverlayKind::Logo => {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "◈",
                egui::FontId::proportional(overlay.font_size as f32),
                text_color,
            );
        }
    }
}

/// Paint a loaded image inside the overlay, letterboxed to keep its aspect.
fn draw_image(
    painter: &egui::Painter,
    texture: &egui::TextureHandle,
    aspect: f32,
    layout: &OverlayLayout,
) {
    let image_rect: egui::Rect = fit_aspect(&layout.rect, aspect).into();
    let tint = egui::Color32::WHITE.gamma_multiply(layout.opacity);
    let mut mesh = egui::Mesh::with_texture(texture.id());
    mesh.add_rect_with_uv(
        image_rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        tint,
    );
    if layout.rotation != 0.0 {
        let rect: egui::Rect = layout.rect.into();
        mesh.rotate(
            egui::emath::Rot2::from_angle(layout.rotation.to_radians()),
            rect.center(),
        );
    }
    painter.add(egui::Shape::mesh(mesh));
}

fn draw_selection_badge(painter: &egui::Painter, container: egui::Rect, overlay: &Overlay) {
    let text = format!("Selected: {} - {}", overlay.kind, overlay.content_preview(20));
    let galley = painter.layout_no_wrap(
        text,
        egui::FontId::proportional(12.0),
        egui::Color32::WHITE,
    );
    let size = galley.size() + egui::vec2(12.0, 6.0);
    let badge = egui::Rect::from_min_size(
        egui::pos2(container.right() - size.x - 8.0, container.top() + 8.0),
        size,
    );
    painter.rect_filled(badge, 4.0, SELECTED_BORDER);
    painter.galley(badge.min + egui::vec2(6.0, 3.0), galley, egui::Color32::WHITE);
}

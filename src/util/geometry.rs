// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module converts between screen coordinates (egui points) and the
//! percentage coordinates overlays are stored in.

use crate::models::overlay::{Position, POSITION_MAX, POSITION_MIN};

/// A pointer location in absolute screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<egui::Pos2> for ScreenPoint {
    fn from(pos: egui::Pos2) -> Self {
        Self::new(pos.x, pos.y)
    }
}

impl From<ScreenPoint> for egui::Pos2 {
    fn from(point: ScreenPoint) -> Self {
        egui::pos2(point.x, point.y)
    }
}

/// Pointer position relative to the dragged overlay's top-left corner,
/// captured when the drag starts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragOffset {
    pub x: f32,
    pub y: f32,
}

impl DragOffset {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Offset of `pointer` from the top-left corner of `rect`.
    pub fn between(pointer: ScreenPoint, rect: &ScreenRect) -> Self {
        Self::new(pointer.x - rect.left, pointer.y - rect.top)
    }
}

/// Axis-aligned rectangle in absolute screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }

    /// False until the container has a usable, laid-out size.
    pub fn is_measurable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl From<egui::Rect> for ScreenRect {
    fn from(rect: egui::Rect) -> Self {
        Self::new(rect.min.x, rect.min.y, rect.width(), rect.height())
    }
}

impl From<ScreenRect> for egui::Rect {
    fn from(rect: ScreenRect) -> Self {
        egui::Rect::from_min_size(
            egui::pos2(rect.left, rect.top),
            egui::vec2(rect.width, rect.height),
        )
    }
}

/// The container has no measurable size yet; skip this pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("container is not laid out yet")]
pub struct NotReady;

/// Map a pointer position to an overlay's new top-left corner, as a
/// percentage of the container.
///
/// Both coordinates are clamped to `[0, 100]`. The overlay's own size is not
/// subtracted, so only its top-left corner is kept inside the container.
pub fn compute_drag_position(
    pointer: ScreenPoint,
    container: &ScreenRect,
    offset: DragOffset,
) -> Result<Position, NotReady> {
    if !container.is_measurable() {
        return Err(NotReady);
    }

    let x = ((pointer.x - offset.x - container.left) as f64 / container.width as f64) * 100.0;
    let y = ((pointer.y - offset.y - container.top) as f64 / container.height as f64) * 100.0;
    if !x.is_finite() || !y.is_finite() {
        return Err(NotReady);
    }

    Ok(Position::new(
        x.clamp(POSITION_MIN, POSITION_MAX),
        y.clamp(POSITION_MIN, POSITION_MAX),
    ))
}

/// Screen location of an overlay's top-left corner inside `container`.
pub fn position_to_screen(position: Position, container: &ScreenRect) -> ScreenPoint {
    ScreenPoint::new(
        container.left + (position.x / 100.0) as f32 * container.width,
        container.top + (position.y / 100.0) as f32 * container.height,
    )
}

/// Largest rectangle with the given aspect ratio centred inside `available`.
pub fn fit_aspect(available: &ScreenRect, aspect: f32) -> ScreenRect {
    if !available.is_measurable() || !(aspect.is_finite() && aspect > 0.0) {
        return *available;
    }

    let (width, height) = if aspect > available.width / available.height {
        // Wider than the space - fit to width
        (available.width, available.width / aspect)
    } else {
        // Taller than the space - fit to height
        (available.height * aspect, available.height)
    };

    ScreenRect::new(
        available.left + (available.width - width) / 2.0,
        available.top + (available.height - height) / 2.0,
        width,
        height,
    )
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay drag gestures.
//!
//! The controller owns a small state machine (`Idle -> Dragging -> Idle`)
//! and turns pointer events into overlay position updates. Only one overlay
//! can be dragged at a time; a pointer-down while a drag is active is
//! ignored.

use super::selection::Selection;
use crate::models::overlay::{Overlay, OverlayId, OverlayPatch, Position};
use crate::util::geometry::{compute_drag_position, DragOffset, ScreenPoint, ScreenRect};

/// An in-progress drag of one overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// Overlay as it was when the drag started.
    overlay: Overlay,
    offset: DragOffset,
    last_position: Option<Position>,
    updates: usize,
}

impl DragSession {
    pub fn overlay_id(&self) -> &OverlayId {
        &self.overlay.id
    }

    pub fn offset(&self) -> DragOffset {
        self.offset
    }

    pub fn start_position(&self) -> Position {
        self.overlay.position()
    }

    /// Most recent position emitted, if the pointer has moved at all.
    pub fn last_position(&self) -> Option<Position> {
        self.last_position
    }

    pub fn updates_emitted(&self) -> usize {
        self.updates
    }
}

/// New position for the dragged overlay, produced by a pointer move.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionUpdate {
    pub id: OverlayId,
    pub position: Position,
    /// The dragged overlay with `x`/`y` replaced and every other field as it
    /// was at drag start.
    pub overlay: Overlay,
}

impl PositionUpdate {
    /// Partial update to send to the store.
    pub fn patch(&self) -> OverlayPatch {
        OverlayPatch::position(self.position)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Translates pointer events into overlay position updates.
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin dragging `overlay` if no other drag is active.
    ///
    /// `overlay_rect` is where the overlay is currently drawn; the pointer's
    /// offset from its top-left corner is kept for the whole gesture. The
    /// overlay also becomes the selection. Returns `None` when a drag is
    /// already in progress, in which case nothing changes.
    pub fn pointer_down(
        &mut self,
        overlay: &Overlay,
        pointer: ScreenPoint,
        overlay_rect: &ScreenRect,
        selection: &mut Selection,
    ) -> Option<&DragSession> {
        if let DragState::Dragging(ref active) = self.state {
            log::debug!(
                "Ignoring pointer-down on {} while {} is being dragged",
                overlay.id,
                active.overlay_id()
            );
            return None;
        }

        let offset = DragOffset::between(pointer, overlay_rect);
        selection.select(overlay.id.clone());
        log::info!(
            "Started dragging overlay {} (offset {:.1}, {:.1})",
            overlay.id,
            offset.x,
            offset.y
        );

        self.state = DragState::Dragging(DragSession {
            overlay: overlay.clone(),
            offset,
            last_position: None,
            updates: 0,
        });
        self.session()
    }

    /// Map a pointer move onto the dragged overlay.
    ///
    /// Returns `None` when idle or when the container cannot be measured yet.
    pub fn pointer_move(
        &mut self,
        pointer: ScreenPoint,
        container: &ScreenRect,
    ) -> Option<PositionUpdate> {
        let DragState::Dragging(ref mut session) = self.state else {
            return None;
        };

        let position = match compute_drag_position(pointer, container, session.offset) {
            Ok(position) => position,
            Err(e) => {
                log::debug!("Skipping drag update: {}", e);
                return None;
            }
        };

        session.last_position = Some(position);
        session.updates += 1;

        Some(PositionUpdate {
            id: session.overlay.id.clone(),
            position,
            overlay: session.overlay.with_position(position),
        })
    }

    /// End the current drag, wherever the pointer was released.
    pub fn pointer_up(&mut self) -> Option<DragSession> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(session) => {
                log::info!(
                    "Stopped dragging overlay {} after {} updates",
                    session.overlay_id(),
                    session.updates
                );
                Some(session)
            }
            DragState::Idle => None,
        }
    }

    /// End the drag if it is moving `id` (e.g. the overlay was deleted).
    pub fn cancel_if(&mut self, id: &OverlayId) -> bool {
        let matches = self.session().is_some_and(|s| s.overlay_id() == id);
        if matches {
            self.state = DragState::Idle;
            log::info!("Cancelled drag of removed overlay {}", id);
        }
        matches
    }

    /// Drop any drag state, used when the video surface goes away.
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
    }

    pub fn session(&self) -> Option<&DragSession> {
        match self.state {
            DragState::Dragging(ref session) => Some(session),
            DragState::Idle => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::overlay::NewOverlay;

    fn overlay(id: &str, x: f64, y: f64) -> Overlay {
        NewOverlay {
            content: format!("overlay {}", id),
            x,
            y,
            ..Default::default()
        }
        .into_overlay(OverlayId::new(id), chrono::Utc::now())
    }

    fn container() -> ScreenRect {
        ScreenRect::new(0.0, 0.0, 1000.0, 500.0)
    }

    #[test]
    fn test_drag_emits_merged_updates() {
        let mut controller = DragController::new();
        let mut selection = Selection::new();
        let a = overlay("a", 20.0, 20.0);

        // Overlay drawn at (200, 100); pointer grabs it 10px in.
        let rect = ScreenRect::new(200.0, 100.0, 200.0, 50.0);
        controller
            .pointer_down(&a, ScreenPoint::new(210.0, 110.0), &rect, &mut selection)
            .unwrap();
        assert!(controller.is_dragging());
        assert!(selection.is_selected(&a.id));

        let update = controller
            .pointer_move(ScreenPoint::new(510.0, 260.0), &container())
            .unwrap();
        assert_eq!(update.id, a.id);
        assert!((update.position.x - 50.0).abs() < 0.0001);
        assert!((update.position.y - 50.0).abs() < 0.0001);
        assert_eq!(update.overlay.content, a.content);
        assert_eq!(update.overlay.width, a.width);
        assert_eq!(update.patch(), OverlayPatch::position(update.position));

        let session = controller.pointer_up().unwrap();
        assert_eq!(session.updates_emitted(), 1);
        assert_eq!(session.last_position(), Some(update.position));
        assert!(!controller.is_dragging());
    }

    #[test]
    fn test_down_then_up_keeps_position_and_selection() {
        let mut controller = DragController::new();
        let mut selection = Selection::new();
        let a = overlay("a", 33.0, 44.0);
        let rect = ScreenRect::new(330.0, 220.0, 200.0, 50.0);

        controller.pointer_down(&a, ScreenPoint::new(340.0, 230.0), &rect, &mut selection);
        let session = controller.pointer_up().unwrap();

        assert_eq!(session.last_position(), None);
        assert_eq!(session.start_position(), Position::new(33.0, 44.0));
        assert!(selection.is_selected(&a.id));
    }

    #[test]
    fn test_second_pointer_down_is_ignored() {
        let mut controller = DragController::new();
        let mut selection = Selection::new();
        let a = overlay("a", 10.0, 10.0);
        let b = overlay("b", 60.0, 60.0);

        controller.pointer_down(
            &a,
            ScreenPoint::new(105.0, 55.0),
            &ScreenRect::new(100.0, 50.0, 200.0, 50.0),
            &mut selection,
        );
        let before = controller.session().cloned();

        let second = controller.pointer_down(
            &b,
            ScreenPoint::new(620.0, 320.0),
            &ScreenRect::new(600.0, 300.0, 200.0, 50.0),
            &mut selection,
        );
        assert!(second.is_none());
        assert_eq!(controller.session().cloned(), before);
        assert!(selection.is_selected(&a.id));

        // Moves still drive overlay A with its original offset.
        let update = controller
            .pointer_move(ScreenPoint::new(505.0, 255.0), &container())
            .unwrap();
        assert_eq!(update.id, a.id);
        assert!((update.position.x - 50.0).abs() < 0.0001);
    }

    #[test]
    fn test_moves_and_release_without_session_are_noops() {
        let mut controller = DragController::new();
        assert!(controller
            .pointer_move(ScreenPoint::new(1.0, 1.0), &container())
            .is_none());
        assert!(controller.pointer_up().is_none());
    }

    #[test]
    fn test_unmeasured_container_skips_update() {
        let mut controller = DragController::new();
        let mut selection = Selection::new();
        let a = overlay("a", 0.0, 0.0);
        controller.pointer_down(
            &a,
            ScreenPoint::new(0.0, 0.0),
            &ScreenRect::new(0.0, 0.0, 10.0, 10.0),
            &mut selection,
        );

        let update = controller.pointer_move(
            ScreenPoint::new(50.0, 50.0),
            &ScreenRect::new(0.0, 0.0, 0.0, 0.0),
        );
        assert!(update.is_none());
        assert!(controller.is_dragging());
        assert_eq!(controller.session().unwrap().updates_emitted(), 0);
    }

    #[test]
    fn test_every_move_emits_in_order() {
        let mut controller = DragController::new();
        let mut selection = Selection::new();
        let a = overlay("a", 0.0, 0.0);
        controller.pointer_down(
            &a,
            ScreenPoint::new(0.0, 0.0),
            &ScreenRect::new(0.0, 0.0, 10.0, 10.0),
            &mut selection,
        );

        let xs: Vec<f64> = [100.0, 200.0, 300.0]
            .into_iter()
            .filter_map(|px| controller.pointer_move(ScreenPoint::new(px, 0.0), &container()))
            .map(|u| u.position.x)
            .collect();
        assert_eq!(xs.len(), 3);
        assert!((xs[0] - 10.0).abs() < 0.0001);
        assert!((xs[2] - 30.0).abs() < 0.0001);
    }

    #[test]
    fn test_cancel_if_only_matches_dragged_overlay() {
        let mut controller = DragController::new();
        let mut selection = Selection::new();
        let a = overlay("a", 0.0, 0.0);
        controller.pointer_down(
            &a,
            ScreenPoint::new(0.0, 0.0),
            &ScreenRect::new(0.0, 0.0, 10.0, 10.0),
            &mut selection,
        );

        assert!(!controller.cancel_if(&OverlayId::new("b")));
        assert!(controller.is_dragging());
        assert!(controller.cancel_if(&a.id));
        assert!(!controller.is_dragging());
    }
}

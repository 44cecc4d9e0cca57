// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Currently selected overlay, used for highlighting on the video surface.

use crate::models::overlay::{Overlay, OverlayId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<OverlayId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, id: OverlayId) {
        if self.selected.as_ref() != Some(&id) {
            log::debug!("Selected overlay {}", id);
        }
        self.selected = Some(id);
    }

    pub fn clear(&mut self) {
        if let Some(id) = self.selected.take() {
            log::debug!("Deselected overlay {}", id);
        }
    }

    pub fn selected(&self) -> Option<&OverlayId> {
        self.selected.as_ref()
    }

    pub fn is_selected(&self, id: &OverlayId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    /// Drop the selection if its overlay is no longer present.
    pub fn retain_existing(&mut self, overlays: &[Overlay]) {
        let exists = self
            .selected
            .as_ref()
            .is_some_and(|id| overlays.iter().any(|o| &o.id == id));
        if !exists {
            self.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::overlay::NewOverlay;

    #[test]
    fn test_select_and_clear() {
        let mut selection = Selection::new();
        let id = OverlayId::new("a");
        selection.select(id.clone());
        assert!(selection.is_selected(&id));
        assert!(!selection.is_selected(&OverlayId::new("b")));

        selection.clear();
        assert_eq!(selection.selected(), None);
    }

    #[test]
    fn test_retain_existing_clears_deleted_overlay() {
        let overlay = NewOverlay {
            content: "hi".to_string(),
            ..Default::default()
        }
        .into_overlay(OverlayId::new("kept"), chrono::Utc::now());

        let mut selection = Selection::new();
        selection.select(OverlayId::new("kept"));
        selection.retain_existing(std::slice::from_ref(&overlay));
        assert!(selection.is_selected(&overlay.id));

        selection.select(OverlayId::new("gone"));
        selection.retain_existing(std::slice::from_ref(&overlay));
        assert_eq!(selection.selected(), None);
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! In-process overlay store.

use super::{OverlayPage, OverlayQuery, OverlayStore, Pagination, StoreError};
use crate::models::overlay::{NewOverlay, Overlay, OverlayId, OverlayPatch};
use chrono::Utc;

/// Keeps overlays in memory, assigning UUIDs and tracking versions the way
/// the overlay API does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    overlays: Vec<Overlay>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with existing overlays (e.g. loaded from disk).
    pub fn with_overlays(overlays: Vec<Overlay>) -> Self {
        Self { overlays }
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    fn find_mut(&mut self, id: &OverlayId) -> Result<&mut Overlay, StoreError> {
        self.overlays
            .iter_mut()
            .find(|o| &o.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

impl OverlayStore for MemoryStore {
    fn list(&mut self, query: &OverlayQuery) -> Result<OverlayPage, StoreError> {
        let mut matching: Vec<&Overlay> = self.overlays.iter().filter(|o| query.matches(o)).collect();
        // Newest first
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len();
        let overlays = matching
            .into_iter()
            .skip(query.offset())
            .take(query.limit)
            .cloned()
            .collect();

        Ok(OverlayPage {
            overlays,
            pagination: Pagination::new(query.page, query.limit, total),
        })
    }

    fn get(&mut self, id: &OverlayId) -> Result<Overlay, StoreError> {
        self.find_mut(id).map(|o| o.clone())
    }

    fn create(&mut self, overlay: NewOverlay) -> Result<Overlay, StoreError> {
        overlay.validate()?;

        let id = OverlayId::new(uuid::Uuid::new_v4().simple().to_string());
        let created = overlay.into_overlay(id, Utc::now());
        log::info!("Created overlay: {}", created.id);
        self.overlays.push(created.clone());
        Ok(created)
    }

    fn update(&mut self, id: &OverlayId, patch: &OverlayPatch) -> Result<Overlay, StoreError> {
        patch.validate()?;

        let overlay = self.find_mut(id)?;
        overlay.apply(patch);
        overlay.updated_at = Some(Utc::now());
        overlay.version += 1;
        if patch.is_position_only() {
            log::debug!("Moved overlay: {} (version {})", id, overlay.version);
        } else {
            log::info!("Updated overlay: {} (version {})", id, overlay.version);
        }
        Ok(overlay.clone())
    }

    fn delete(&mut self, id: &OverlayId) -> Result<(), StoreError> {
        let before = self.overlays.len();
        self.overlays.retain(|o| &o.id != id);
        if self.overlays.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        log::info!("Deleted overlay: {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::overlay::{OverlayKind, Position};
    use crate::store::BulkOperation;

    fn draft(content: &str) -> NewOverlay {
        NewOverlay {
            content: content.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_assigns_id_and_version() {
        let mut store = MemoryStore::new();
        let a = store.create(draft("a")).unwrap();
        let b = store.create(draft("b")).unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(a.version, 1);
        assert!(a.created_at.is_some());
        assert_eq!(store.get(&a.id).unwrap(), a);
    }

    #[test]
    fn test_create_rejects_invalid_draft() {
        let mut store = MemoryStore::new();
        let err = store.create(draft("")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.overlays().is_empty());
    }

    #[test]
    fn test_repeated_updates_merge_and_bump_version() {
        let mut store = MemoryStore::new();
        let a = store.create(draft("a")).unwrap();

        for step in 0..20 {
            store
                .update(&a.id, &OverlayPatch::position(Position::new(step as f64, 5.0)))
                .unwrap();
        }

        let stored = store.get(&a.id).unwrap();
        assert_eq!(stored.x, 19.0);
        assert_eq!(stored.y, 5.0);
        assert_eq!(stored.content, "a");
        assert_eq!(stored.version, 21);
    }

    #[test]
    fn test_update_missing_overlay() {
        let mut store = MemoryStore::new();
        let err = store
            .update(&OverlayId::new("nope"), &OverlayPatch::visibility(false))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_list_filters_and_paginates() {
        let mut store = MemoryStore::new();
        for i in 0..5 {
            let mut d = draft(&format!("text {}", i));
            d.is_visible = i % 2 == 0;
            store.create(d).unwrap();
        }
        let mut logo = draft("https://example.com/logo.png");
        logo.kind = OverlayKind::Logo;
        store.create(logo).unwrap();

        let visible = store
            .list(&OverlayQuery {
                visible: Some(true),
                ..OverlayQuery::first(50)
            })
            .unwrap();
        // Three visible texts plus the logo
        assert_eq!(visible.pagination.total, 4);

        let logos = store
            .list(&OverlayQuery {
                kind: Some(OverlayKind::Logo),
                ..OverlayQuery::first(50)
            })
            .unwrap();
        assert_eq!(logos.overlays.len(), 1);

        let page = store
            .list(&OverlayQuery {
                page: 2,
                limit: 4,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.overlays.len(), 2);
        assert_eq!(page.pagination.pages, 2);
        assert_eq!(page.pagination.total, 6);
    }

    #[test]
    fn test_delete_and_bulk() {
        let mut store = MemoryStore::new();
        let a = store.create(draft("a")).unwrap();
        let b = store.create(draft("b")).unwrap();

        let outcomes = store
            .bulk(&[
                BulkOperation::Update {
                    id: a.id.clone(),
                    data: OverlayPatch::visibility(false),
                },
                BulkOperation::Delete { id: b.id.clone() },
                BulkOperation::Delete {
                    id: OverlayId::new("missing"),
                },
            ])
            .unwrap();

        let successes: Vec<bool> = outcomes.iter().map(|o| o.success).collect();
        assert_eq!(successes, vec![true, true, false]);
        assert!(!store.get(&a.id).unwrap().is_visible);
        assert!(matches!(store.delete(&b.id), Err(StoreError::NotFound(_))));
    }
}

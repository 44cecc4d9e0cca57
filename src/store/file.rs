// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay store persisted to a local YAML or JSON document.

use super::memory::MemoryStore;
use super::{OverlayPage, OverlayQuery, OverlayStore, StoreError};
use crate::io::serialization;
use crate::models::overlay::{NewOverlay, Overlay, OverlayId, OverlayPatch};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
struct OverlayDocument {
    #[serde(default)]
    overlays: Vec<Overlay>,
}

/// A [`MemoryStore`] written back to disk after every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// Open the document at `path`, starting empty if it does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        serialization::Format::from_path(&path).map_err(StoreError::Persist)?;

        let overlays = if path.exists() {
            let doc: OverlayDocument = serialization::import(&path).map_err(StoreError::Persist)?;
            log::info!("Loaded {} overlays from {}", doc.overlays.len(), path.display());
            doc.overlays
        } else {
            log::info!("No overlay file at {}, starting empty", path.display());
            Vec::new()
        };

        Ok(Self {
            path,
            inner: MemoryStore::with_overlays(overlays),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        let doc = OverlayDocument {
            overlays: self.inner.overlays().to_vec(),
        };
        serialization::export(&doc, &self.path).map_err(StoreError::Persist)
    }
}

impl OverlayStore for FileStore {
    fn list(&mut self, query: &OverlayQuery) -> Result<OverlayPage, StoreError> {
        self.inner.list(query)
    }

    fn get(&mut self, id: &OverlayId) -> Result<Overlay, StoreError> {
        self.inner.get(id)
    }

    fn create(&mut self, overlay: NewOverlay) -> Result<Overlay, StoreError> {
        let created = self.inner.create(overlay)?;
        self.persist()?;
        Ok(created)
    }

    fn update(&mut self, id: &OverlayId, patch: &OverlayPatch) -> Result<Overlay, StoreError> {
        let updated = self.inner.update(id, patch)?;
        self.persist()?;
        Ok(updated)
    }

    fn delete(&mut self, id: &OverlayId) -> Result<(), StoreError> {
        self.inner.delete(id)?;
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::overlay::Position;

    #[test]
    fn test_changes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlays.yaml");

        let id = {
            let mut store = FileStore::open(&path).unwrap();
            let created = store
                .create(NewOverlay {
                    content: "persist me".to_string(),
                    ..Default::default()
                })
                .unwrap();
            store
                .update(&created.id, &OverlayPatch::position(Position::new(70.0, 30.0)))
                .unwrap();
            created.id
        };

        let mut reopened = FileStore::open(&path).unwrap();
        let overlay = reopened.get(&id).unwrap();
        assert_eq!(overlay.content, "persist me");
        assert_eq!(overlay.position(), Position::new(70.0, 30.0));
        assert_eq!(overlay.version, 2);

        reopened.delete(&id).unwrap();
        let mut again = FileStore::open(&path).unwrap();
        assert!(again.list(&OverlayQuery::first(10)).unwrap().overlays.is_empty());
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            FileStore::open(dir.path().join("overlays.txt")),
            Err(StoreError::Persist(_))
        ));
    }
}

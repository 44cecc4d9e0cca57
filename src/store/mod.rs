// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay storage.
//!
//! The store is the source of truth for overlays. The application talks to
//! it through [`OverlayStore`], on a background worker so that a slow
//! backend never stalls the UI.

pub mod file;
pub mod http;
pub mod memory;
pub mod worker;

use crate::analytics::AnalyticsSummary;
use crate::models::overlay::{NewOverlay, Overlay, OverlayId, OverlayKind, OverlayPatch};
use crate::models::validation::ValidationErrors;
use serde::{Deserialize, Serialize};

/// Errors reported by an overlay store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("overlay {0} not found")]
    NotFound(OverlayId),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to persist overlays: {0}")]
    Persist(#[source] anyhow::Error),

    #[error("overlay store is unavailable")]
    Unavailable,
}

/// Filters and pagination for listing overlays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayQuery {
    /// 1-based page number.
    pub page: usize,
    pub limit: usize,
    pub kind: Option<OverlayKind>,
    pub visible: Option<bool>,
}

impl Default for OverlayQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            kind: None,
            visible: None,
        }
    }
}

impl OverlayQuery {
    /// First page holding up to `limit` overlays.
    pub fn first(limit: usize) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    pub fn matches(&self, overlay: &Overlay) -> bool {
        self.kind.map_or(true, |k| overlay.kind == k)
            && self.visible.map_or(true, |v| overlay.is_visible == v)
    }

    /// Number of overlays to skip before this page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) * self.limit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

impl Pagination {
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        let pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}

/// One page of overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayPage {
    pub overlays: Vec<Overlay>,
    pub pagination: Pagination,
}

/// One step of a bulk request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BulkOperation {
    Update { id: OverlayId, data: OverlayPatch },
    Delete { id: OverlayId },
}

impl BulkOperation {
    pub fn id(&self) -> &OverlayId {
        match self {
            BulkOperation::Update { id, .. } | BulkOperation::Delete { id } => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub id: OverlayId,
    pub success: bool,
}

/// Service of record for overlays.
///
/// `update` merges the patch into the stored overlay and returns the
/// canonical result. It is called for every drag step, so implementations
/// must accept rapid repeated updates of the same overlay.
pub trait OverlayStore {
    fn list(&mut self, query: &OverlayQuery) -> Result<OverlayPage, StoreError>;

    fn get(&mut self, id: &OverlayId) -> Result<Overlay, StoreError>;

    fn create(&mut self, overlay: NewOverlay) -> Result<Overlay, StoreError>;

    fn update(&mut self, id: &OverlayId, patch: &OverlayPatch) -> Result<Overlay, StoreError>;

    fn delete(&mut self, id: &OverlayId) -> Result<(), StoreError>;

    /// Apply several updates/deletes. A failing step is reported in its
    /// outcome and does not stop the rest.
    fn bulk(&mut self, operations: &[BulkOperation]) -> Result<Vec<BulkOutcome>, StoreError> {
        Ok(operations
            .iter()
            .map(|op| {
                let result = match op {
                    BulkOperation::Update { id, data } => self.update(id, data).map(|_| ()),
                    BulkOperation::Delete { id } => self.delete(id),
                };
                if let Err(ref e) = result {
                    log::warn!("Bulk operation on {} failed: {}", op.id(), e);
                }
                BulkOutcome {
                    id: op.id().clone(),
                    success: result.is_ok(),
                }
            })
            .collect())
    }

    /// Totals kept by the service itself. Stores without their own
    /// analytics return `None` and the session counts are shown instead.
    fn analytics(&mut self) -> Result<Option<AnalyticsSummary>, StoreError> {
        Ok(None)
    }
}

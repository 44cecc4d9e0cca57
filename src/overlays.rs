// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Client-side overlay cache.
//!
//! Holds the locally cached copy of the store's overlays. Mutations are sent
//! to the store worker; updates are applied to the cache immediately and
//! reconciled with the store's canonical copy when the reply arrives.
//!
//! A failing overlay is reported once per burst of updates and resynced from
//! the store when its last in-flight update has been answered.

use crate::analytics::AnalyticsSummary;
use crate::models::overlay::{NewOverlay, Overlay, OverlayId, OverlayPatch, Position};
use crate::store::worker::{StoreReply, StoreRequest, StoreWorker, UpdateOrigin};
use crate::store::{BulkOperation, OverlayQuery, StoreError};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// What the cache was doing when something failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAction {
    Fetch,
    Create,
    Update(UpdateOrigin),
    Delete,
    Bulk,
    Analytics,
}

impl fmt::Display for CacheAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CacheAction::Fetch => "load overlays",
            CacheAction::Create => "create overlay",
            CacheAction::Update(UpdateOrigin::Drag) => "move overlay",
            CacheAction::Update(UpdateOrigin::Form) => "save overlay",
            CacheAction::Update(UpdateOrigin::Visibility) => "update overlay visibility",
            CacheAction::Delete => "delete overlay",
            CacheAction::Bulk => "update overlays",
            CacheAction::Analytics => "load analytics",
        };
        f.write_str(text)
    }
}

/// Outcome of a finished store request.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEvent {
    Loaded { count: usize, total: usize },
    Created(Overlay),
    Updated { overlay: Overlay, origin: UpdateOrigin },
    Deleted(OverlayId),
    BulkApplied { succeeded: usize, failed: usize },
    /// Service totals; `None` when the store keeps none or could not be asked.
    Analytics(Option<AnalyticsSummary>),
    Failed { action: CacheAction, message: String },
}

pub struct OverlayCache {
    overlays: Vec<Overlay>,
    worker: StoreWorker,
    query: OverlayQuery,
    loading: bool,
    error: Option<String>,
    /// Requests submitted and not yet answered.
    pending: usize,
    /// Unanswered updates per overlay; while non-zero the local copy is newer
    /// than anything the store has replied with.
    in_flight: HashMap<OverlayId, usize>,
    /// Overlays with a failed update since their last resync.
    unsynced: HashSet<OverlayId>,
    /// Creates submitted and not yet answered.
    pending_creates: usize,
    events: Vec<CacheEvent>,
}

impl OverlayCache {
    pub fn new(worker: StoreWorker, page_size: usize) -> Self {
        Self {
            overlays: Vec::new(),
            worker,
            query: OverlayQuery::first(page_size),
            loading: false,
            error: None,
            pending: 0,
            in_flight: HashMap::new(),
            unsynced: HashSet::new(),
            pending_creates: 0,
            events: Vec::new(),
        }
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn get(&self, id: &OverlayId) -> Option<&Overlay> {
        self.overlays.iter().find(|o| &o.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True while any request is waiting for the store.
    pub fn has_pending(&self) -> bool {
        self.pending > 0
    }

    /// Overlays the store is still creating.
    pub fn pending_creates(&self) -> usize {
        self.pending_creates
    }

    /// Reload the overlay list from the store.
    pub fn fetch(&mut self) {
        self.loading = true;
        self.error = None;
        self.submit(StoreRequest::List(self.query.clone()), CacheAction::Fetch);
    }

    pub fn create(&mut self, draft: NewOverlay) {
        if self.submit(StoreRequest::Create(draft), CacheAction::Create) {
            self.pending_creates += 1;
        }
    }

    /// Ask the store for its own totals.
    pub fn fetch_analytics(&mut self) {
        self.submit(StoreRequest::Analytics, CacheAction::Analytics);
    }

    /// Apply `patch` locally and send it to the store.
    pub fn update(&mut self, id: &OverlayId, patch: OverlayPatch, origin: UpdateOrigin) {
        if let Some(overlay) = self.overlays.iter_mut().find(|o| &o.id == id) {
            overlay.apply(&patch);
        }
        let request = StoreRequest::Update {
            id: id.clone(),
            patch,
            origin,
        };
        if self.submit(request, CacheAction::Update(origin)) {
            *self.in_flight.entry(id.clone()).or_insert(0) += 1;
        }
    }

    /// Move an overlay locally without telling the store.
    pub fn preview_position(&mut self, id: &OverlayId, position: Position) {
        if let Some(overlay) = self.overlays.iter_mut().find(|o| &o.id == id) {
            overlay.x = position.x;
            overlay.y = position.y;
        }
    }

    pub fn set_visibility(&mut self, id: &OverlayId, is_visible: bool) {
        self.update(id, OverlayPatch::visibility(is_visible), UpdateOrigin::Visibility);
    }

    /// Show or hide every overlay in one bulk request.
    pub fn set_all_visibility(&mut self, is_visible: bool) {
        let operations: Vec<BulkOperation> = self
            .overlays
            .iter_mut()
            .filter(|o| o.is_visible != is_visible)
            .map(|o| {
                o.is_visible = is_visible;
                BulkOperation::Update {
                    id: o.id.clone(),
                    data: OverlayPatch::visibility(is_visible),
                }
            })
            .collect();

        if operations.is_empty() {
            return;
        }
        self.submit(StoreRequest::Bulk(operations), CacheAction::Bulk);
    }

    pub fn delete(&mut self, id: &OverlayId) {
        self.submit(StoreRequest::Delete(id.clone()), CacheAction::Delete);
    }

    /// Apply finished replies and return what happened since the last poll.
    pub fn poll(&mut self) -> Vec<CacheEvent> {
        while let Some(reply) = self.worker.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            self.handle_reply(reply);
        }
        std::mem::take(&mut self.events)
    }

    fn submit(&mut self, request: StoreRequest, action: CacheAction) -> bool {
        match self.worker.submit(request) {
            Ok(()) => {
                self.pending += 1;
                true
            }
            Err(e) => {
                self.fail(action, &e);
                if action == CacheAction::Fetch {
                    self.loading = false;
                }
                false
            }
        }
    }

    fn fail(&mut self, action: CacheAction, error: &StoreError) {
        log::error!("Failed to {}: {}", action, error);
        let message = error.to_string();
        self.error = Some(message.clone());
        self.events.push(CacheEvent::Failed { action, message });
    }

    fn handle_reply(&mut self, reply: StoreReply) {
        match reply {
            StoreReply::Listed(result) => {
                self.loading = false;
                match result {
                    Ok(page) => {
                        let total = page.pagination.total;
                        let previous = std::mem::take(&mut self.overlays);
                        self.overlays = page
                            .overlays
                            .into_iter()
                            .map(|fresh| self.keep_unconfirmed(&previous, fresh))
                            .collect();
                        log::info!("Loaded {} of {} overlays", self.overlays.len(), total);
                        self.events.push(CacheEvent::Loaded {
                            count: self.overlays.len(),
                            total,
                        });
                    }
                    Err(e) => self.fail(CacheAction::Fetch, &e),
                }
            }
            StoreReply::Created(result) => {
                self.pending_creates = self.pending_creates.saturating_sub(1);
                match result {
                    Ok(overlay) => {
                        self.overlays.insert(0, overlay.clone());
                        self.events.push(CacheEvent::Created(overlay));
                    }
                    Err(e) => self.fail(CacheAction::Create, &e),
                }
            }
            StoreReply::Updated { id, origin, result } => {
                let settled = self.settle(&id);
                match result {
                    Ok(canonical) => {
                        if settled {
                            if let Some(slot) = self.overlays.iter_mut().find(|o| o.id == id) {
                                *slot = canonical.clone();
                            }
                        }
                        self.events.push(CacheEvent::Updated {
                            overlay: canonical,
                            origin,
                        });
                    }
                    Err(e) => {
                        if self.unsynced.insert(id.clone()) {
                            self.fail(CacheAction::Update(origin), &e);
                        } else {
                            log::debug!("Update of {} failed again: {}", id, e);
                        }
                    }
                }
                // The optimistic copy may be wrong; resync once nothing is in flight.
                if settled && self.unsynced.remove(&id) {
                    self.fetch();
                }
            }
            StoreReply::Deleted { id, result } => match result {
                Ok(()) => {
                    self.overlays.retain(|o| o.id != id);
                    self.in_flight.remove(&id);
                    self.events.push(CacheEvent::Deleted(id));
                }
                Err(e) => self.fail(CacheAction::Delete, &e),
            },
            StoreReply::Bulk(result) => match result {
                Ok(outcomes) => {
                    let succeeded = outcomes.iter().filter(|o| o.success).count();
                    let failed = outcomes.len() - succeeded;
                    self.events.push(CacheEvent::BulkApplied { succeeded, failed });
                    if failed > 0 {
                        self.fetch();
                    }
                }
                Err(e) => {
                    self.fail(CacheAction::Bulk, &e);
                    self.fetch();
                }
            },
            StoreReply::Analytics(result) => {
                let summary = result.unwrap_or_else(|e| {
                    log::warn!("Failed to load service analytics: {}", e);
                    None
                });
                self.events.push(CacheEvent::Analytics(summary));
            }
        }
    }

    /// Mark one update of `id` as answered. True when none remain.
    fn settle(&mut self, id: &OverlayId) -> bool {
        match self.in_flight.get_mut(id) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            _ => {
                self.in_flight.remove(id);
                true
            }
        }
    }

    /// Prefer the local copy of an overlay that still has updates in flight.
    fn keep_unconfirmed(&self, previous: &[Overlay], fresh: Overlay) -> Overlay {
        if self.in_flight.contains_key(&fresh.id) {
            if let Some(local) = previous.iter().find(|o| o.id == fresh.id) {
                return local.clone();
            }
        }
        fresh
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Background thread that owns the overlay store.
//!
//! Requests are handled strictly in submission order, so drag updates reach
//! the store in the order the pointer produced them. Replies are polled from
//! the UI thread each frame.
//!
//! On shutdown, requests still queued are flushed once: drag moves collapse to
//! the last position per overlay, reads are dropped, and the flush stops at
//! the first failure so an unreachable service cannot hold up exit.

use super::{BulkOperation, BulkOutcome, OverlayPage, OverlayQuery, OverlayStore, StoreError};
use crate::analytics::AnalyticsSummary;
use crate::models::overlay::{NewOverlay, Overlay, OverlayId, OverlayPatch};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Why an update was requested; carried back with the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOrigin {
    Drag,
    Form,
    Visibility,
}

#[derive(Debug)]
pub enum StoreRequest {
    List(OverlayQuery),
    Create(NewOverlay),
    Update {
        id: OverlayId,
        patch: OverlayPatch,
        origin: UpdateOrigin,
    },
    Delete(OverlayId),
    Bulk(Vec<BulkOperation>),
    Analytics,
}

impl StoreRequest {
    /// Requests that only read; worthless once nobody waits for the reply.
    fn is_read(&self) -> bool {
        matches!(self, StoreRequest::List(_) | StoreRequest::Analytics)
    }
}

#[derive(Debug)]
pub enum StoreReply {
    Listed(Result<OverlayPage, StoreError>),
    Created(Result<Overlay, StoreError>),
    Updated {
        id: OverlayId,
        origin: UpdateOrigin,
        result: Result<Overlay, StoreError>,
    },
    Deleted {
        id: OverlayId,
        result: Result<(), StoreError>,
    },
    Bulk(Result<Vec<BulkOutcome>, StoreError>),
    Analytics(Result<Option<AnalyticsSummary>, StoreError>),
}

impl StoreReply {
    fn is_err(&self) -> bool {
        match self {
            StoreReply::Listed(result) => result.is_err(),
            StoreReply::Created(result) => result.is_err(),
            StoreReply::Updated { result, .. } => result.is_err(),
            StoreReply::Deleted { result, .. } => result.is_err(),
            StoreReply::Bulk(result) => result.is_err(),
            StoreReply::Analytics(result) => result.is_err(),
        }
    }
}

/// Handle to the store thread.
pub struct StoreWorker {
    requests: Option<Sender<StoreRequest>>,
    replies: Receiver<StoreReply>,
    /// Set when the handle is dropped; the thread then flushes and exits.
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl StoreWorker {
    /// Move `store` onto a new thread and start serving requests.
    pub fn spawn(mut store: Box<dyn OverlayStore + Send>) -> Self {
        let (request_tx, request_rx) = channel::<StoreRequest>();
        let (reply_tx, reply_rx) = channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        let stopping = Arc::clone(&shutdown);

        let handle = std::thread::Builder::new()
            .name("overlay-store".to_string())
            .spawn(move || {
                while let Ok(request) = request_rx.recv() {
                    if stopping.load(Ordering::SeqCst) {
                        let queued: Vec<StoreRequest> = std::iter::once(request)
                            .chain(request_rx.try_iter())
                            .collect();
                        flush(store.as_mut(), queued);
                        break;
                    }
                    let reply = handle_request(store.as_mut(), request);
                    if reply_tx.send(reply).is_err() {
                        break;
                    }
                }
                log::debug!("Overlay store worker stopped");
            });

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("Failed to start overlay store worker: {}", e);
                None
            }
        };

        Self {
            requests: handle.as_ref().map(|_| request_tx),
            replies: reply_rx,
            shutdown,
            handle,
        }
    }

    /// Queue a request. Fails if the worker has stopped.
    pub fn submit(&self, request: StoreRequest) -> Result<(), StoreError> {
        self.requests
            .as_ref()
            .ok_or(StoreError::Unavailable)?
            .send(request)
            .map_err(|_| StoreError::Unavailable)
    }

    /// Next finished reply, if any.
    pub fn try_recv(&self) -> Option<StoreReply> {
        match self.replies.try_recv() {
            Ok(reply) => Some(reply),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Wait up to `timeout` for the next reply.
    #[cfg(test)]
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<StoreReply> {
        self.replies.recv_timeout(timeout).ok()
    }
}

impl Drop for StoreWorker {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Overlay store worker panicked");
            }
        }
    }
}

fn handle_request(store: &mut dyn OverlayStore, request: StoreRequest) -> StoreReply {
    match request {
        StoreRequest::List(query) => StoreReply::Listed(store.list(&query)),
        StoreRequest::Create(draft) => StoreReply::Created(store.create(draft)),
        StoreRequest::Update { id, patch, origin } => {
            let result = store.update(&id, &patch);
            StoreReply::Updated { id, origin, result }
        }
        StoreRequest::Delete(id) => {
            let result = store.delete(&id);
            StoreReply::Deleted { id, result }
        }
        StoreRequest::Bulk(operations) => StoreReply::Bulk(store.bulk(&operations)),
        StoreRequest::Analytics => StoreReply::Analytics(store.analytics()),
    }
}

/// Keep only the last drag move of each overlay, in queue order.
fn coalesce_drags(requests: Vec<StoreRequest>) -> Vec<StoreRequest> {
    let mut seen = HashSet::new();
    let mut kept: Vec<StoreRequest> = requests
        .into_iter()
        .rev()
        .filter(|request| match request {
            StoreRequest::Update {
                id,
                origin: UpdateOrigin::Drag,
                ..
            } => seen.insert(id.clone()),
            _ => true,
        })
        .collect();
    kept.reverse();
    kept
}

/// Serve what was queued at shutdown, giving up at the first failure.
fn flush(store: &mut dyn OverlayStore, queued: Vec<StoreRequest>) {
    let queued_len = queued.len();
    let writes: Vec<StoreRequest> = coalesce_drags(queued)
        .into_iter()
        .filter(|request| !request.is_read())
        .collect();
    log::info!(
        "Flushing {} of {} queued store requests before exit",
        writes.len(),
        queued_len
    );

    let total = writes.len();
    for (served, request) in writes.into_iter().enumerate() {
        let reply = handle_request(store, request);
        if reply.is_err() {
            log::warn!(
                "Store unavailable at exit; dropped {} queued requests",
                total - served - 1
            );
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::overlay::Position;
    use crate::store::memory::MemoryStore;
    use crate::store::testing::OfflineStore;
    use std::time::{Duration, Instant};

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_requests_are_served_in_order() {
        let worker = StoreWorker::spawn(Box::new(MemoryStore::new()));
        worker
            .submit(StoreRequest::Create(NewOverlay {
                content: "queued".to_string(),
                ..Default::default()
            }))
            .unwrap();

        let created = match worker.recv_timeout(WAIT) {
            Some(StoreReply::Created(Ok(overlay))) => overlay,
            other => panic!("unexpected reply: {:?}", other),
        };

        for x in [10.0, 20.0, 30.0] {
            worker
                .submit(StoreRequest::Update {
                    id: created.id.clone(),
                    patch: OverlayPatch::position(Position::new(x, 0.0)),
                    origin: UpdateOrigin::Drag,
                })
                .unwrap();
        }

        let mut seen = Vec::new();
        for _ in 0..3 {
            match worker.recv_timeout(WAIT) {
                Some(StoreReply::Updated {
                    result: Ok(overlay),
                    origin: UpdateOrigin::Drag,
                    ..
                }) => seen.push((overlay.x, overlay.version)),
                other => panic!("unexpected reply: {:?}", other),
            }
        }
        assert_eq!(seen, vec![(10.0, 2), (20.0, 3), (30.0, 4)]);
    }

    #[test]
    fn test_errors_come_back_as_replies() {
        let worker = StoreWorker::spawn(Box::new(MemoryStore::new()));
        worker
            .submit(StoreRequest::Delete(OverlayId::new("missing")))
            .unwrap();

        match worker.recv_timeout(WAIT) {
            Some(StoreReply::Deleted {
                result: Err(StoreError::NotFound(id)),
                ..
            }) => assert_eq!(id.as_str(), "missing"),
            other => panic!("unexpected reply: {:?}", other),
        }
        assert!(worker.try_recv().is_none());
    }

    fn drag_to(id: &str, x: f64) -> StoreRequest {
        StoreRequest::Update {
            id: OverlayId::new(id),
            patch: OverlayPatch::position(Position::new(x, 0.0)),
            origin: UpdateOrigin::Drag,
        }
    }

    #[test]
    fn test_coalesce_keeps_last_move_per_overlay() {
        let queued = vec![
            drag_to("a", 1.0),
            drag_to("b", 1.0),
            drag_to("a", 2.0),
            StoreRequest::Delete(OverlayId::new("c")),
            drag_to("a", 3.0),
            StoreRequest::Update {
                id: OverlayId::new("a"),
                patch: OverlayPatch::visibility(false),
                origin: UpdateOrigin::Visibility,
            },
        ];

        let kept: Vec<String> = coalesce_drags(queued)
            .iter()
            .map(|request| match request {
                StoreRequest::Update {
                    id,
                    patch,
                    origin: UpdateOrigin::Drag,
                } => format!("drag {} {:?}", id, patch.x),
                StoreRequest::Update { id, .. } => format!("update {}", id),
                StoreRequest::Delete(id) => format!("delete {}", id),
                other => format!("{:?}", other),
            })
            .collect();
        assert_eq!(
            kept,
            vec![
                "drag b Some(1.0)",
                "delete c",
                "drag a Some(3.0)",
                "update a",
            ]
        );
    }

    #[test]
    fn test_drop_does_not_replay_queued_drags() {
        let store = OfflineStore::new(MemoryStore::new()).with_delay(Duration::from_millis(50));
        let calls = store.update_calls();
        let worker = StoreWorker::spawn(Box::new(store));

        for i in 0..20 {
            worker.submit(drag_to("live", f64::from(i))).unwrap();
        }
        let started = Instant::now();
        drop(worker);

        // At most the move being served plus the one collapsed flush attempt
        assert!(calls.load(Ordering::SeqCst) <= 2);
        assert!(started.elapsed() < Duration::from_millis(20 * 50));
    }

    #[test]
    fn test_analytics_request_reaches_store() {
        let worker = StoreWorker::spawn(Box::new(MemoryStore::new()));
        worker.submit(StoreRequest::Analytics).unwrap();

        match worker.recv_timeout(WAIT) {
            Some(StoreReply::Analytics(Ok(None))) => {}
            other => panic!("unexpected reply: {:?}", other),
        }
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! REST client for the StreamOverlay API.
//!
//! Routes: `GET/POST /overlays`, `GET/PUT/DELETE /overlays/{id}`,
//! `POST /overlays/bulk` and `GET /analytics/overview`, all JSON.

use crate::analytics::AnalyticsSummary;
use super::{BulkOperation, BulkOutcome, OverlayPage, OverlayQuery, OverlayStore, StoreError};
use crate::models::overlay::{NewOverlay, Overlay, OverlayId, OverlayPatch};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Error body returned by the API on failure.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    messages: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct BulkRequest<'a> {
    operations: &'a [BulkOperation],
}

#[derive(Deserialize)]
struct BulkResponse {
    results: Vec<BulkOutcome>,
}

/// `GET /analytics/overview`; recent activity and system status are not shown.
#[derive(Deserialize)]
struct AnalyticsOverview {
    summary: AnalyticsSummary,
}

/// Blocking HTTP store; meant to run on the store worker thread.
#[derive(Debug)]
pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        url::Url::parse(base_url)
            .map_err(|e| StoreError::Rejected(format!("invalid API URL {:?}: {}", base_url, e)))?;

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        id: Option<&OverlayId>,
    ) -> Result<T, StoreError> {
        let response = request.send()?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(StoreError::NotFound(id.clone()));
            }
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StoreError::Rejected(rejection_message(status, &body)));
        }

        Ok(response.json()?)
    }
}

impl OverlayStore for HttpStore {
    fn list(&mut self, query: &OverlayQuery) -> Result<OverlayPage, StoreError> {
        let mut params = vec![
            ("page", query.page.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(kind) = query.kind {
            params.push(("type", kind.label().to_string()));
        }
        if let Some(visible) = query.visible {
            params.push(("visible", visible.to_string()));
        }

        let request = self.client.get(self.endpoint("overlays")).query(&params);
        self.send(request, None)
    }

    fn get(&mut self, id: &OverlayId) -> Result<Overlay, StoreError> {
        let request = self.client.get(self.endpoint(&format!("overlays/{}", id)));
        self.send(request, Some(id))
    }

    fn create(&mut self, overlay: NewOverlay) -> Result<Overlay, StoreError> {
        let request = self.client.post(self.endpoint("overlays")).json(&overlay);
        let created: Overlay = self.send(request, None)?;
        log::info!("Created overlay: {}", created.id);
        Ok(created)
    }

    fn update(&mut self, id: &OverlayId, patch: &OverlayPatch) -> Result<Overlay, StoreError> {
        let request = self
            .client
            .put(self.endpoint(&format!("overlays/{}", id)))
            .json(patch);
        self.send(request, Some(id))
    }

    fn delete(&mut self, id: &OverlayId) -> Result<(), StoreError> {
        let request = self.client.delete(self.endpoint(&format!("overlays/{}", id)));
        let _: serde_json::Value = self.send(request, Some(id))?;
        log::info!("Deleted overlay: {}", id);
        Ok(())
    }

    fn bulk(&mut self, operations: &[BulkOperation]) -> Result<Vec<BulkOutcome>, StoreError> {
        let request = self
            .client
            .post(self.endpoint("overlays/bulk"))
            .json(&BulkRequest { operations });
        let response: BulkResponse = self.send(request, None)?;
        Ok(response.results)
    }

    fn analytics(&mut self) -> Result<Option<AnalyticsSummary>, StoreError> {
        let request = self.client.get(self.endpoint("analytics/overview"));
        let overview: AnalyticsOverview = self.send(request, None)?;
        log::debug!("Service analytics: {:?}", overview.summary);
        Ok(Some(overview.summary))
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Human-readable reason for a failed response.
fn rejection_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(err) => {
            let detail = err
                .message
                .or_else(|| err.messages.map(|m| m.to_string()));
            match detail {
                Some(detail) => format!("{} ({})", err.error, detail),
                None => err.error,
            }
        }
        Err(_) => format!("server responded with {}", status),
    }
}

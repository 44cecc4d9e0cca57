// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Exportable scene configuration.
//!
//! A scene bundles the stream URL with the overlays placed over it, in the
//! same shape the web client downloads as `stream-config.json`.

use super::overlay::Overlay;
use serde::{Deserialize, Serialize};

/// Complete scene data for import/export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneConfig {
    #[serde(default)]
    pub rtsp_url: String,
    #[serde(default)]
    pub overlays: Vec<Overlay>,
}

impl SceneConfig {
    /// Create a scene for the given stream and overlays.
    pub fn new(rtsp_url: String, overlays: Vec<Overlay>) -> Self {
        Self { rtsp_url, overlays }
    }
}

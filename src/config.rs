// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Settings are read from a YAML file named by `STREAMOVERLAY_CONFIG`, or
//! `streamoverlay.yaml` in the working directory. Every field is optional;
//! a missing file yields the defaults.

use crate::models::stream::{StreamSettings, SAMPLE_VIDEO_URL};
use crate::store::file::FileStore;
use crate::store::http::HttpStore;
use crate::store::memory::MemoryStore;
use crate::store::OverlayStore;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "STREAMOVERLAY_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "streamoverlay.yaml";

/// Where overlays are stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Lost on exit.
    Memory,
    File {
        path: PathBuf,
    },
    Http {
        base_url: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Http {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl StoreConfig {
    /// Build the configured store.
    pub fn open(&self) -> Result<Box<dyn OverlayStore + Send>> {
        let store: Box<dyn OverlayStore + Send> = match self {
            StoreConfig::Memory => Box::new(MemoryStore::new()),
            StoreConfig::File { path } => Box::new(
                FileStore::open(path)
                    .with_context(|| format!("Cannot open overlay file {}", path.display()))?,
            ),
            StoreConfig::Http {
                base_url,
                timeout_secs,
            } => Box::new(
                HttpStore::new(base_url, Duration::from_secs(*timeout_secs))
                    .with_context(|| format!("Cannot reach overlay API at {}", base_url))?,
            ),
        };
        Ok(store)
    }

    pub fn describe(&self) -> String {
        match self {
            StoreConfig::Memory => "in-memory".to_string(),
            StoreConfig::File { path } => format!("file {}", path.display()),
            StoreConfig::Http { base_url, .. } => base_url.clone(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_window_size() -> [f32; 2] {
    [1280.0, 720.0]
}

fn default_toast_duration() -> f32 {
    3.0
}

fn default_image_timeout() -> u64 {
    10
}

fn default_page_size() -> usize {
    50
}

fn default_max_overlays() -> usize {
    10
}

fn default_commit_during_drag() -> bool {
    true
}

fn default_sample_urls() -> Vec<String> {
    vec![
        SAMPLE_VIDEO_URL.to_string(),
        "rtsp://210.61.216.66:554/live.sdp".to_string(),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    /// Initial window size in points.
    #[serde(default = "default_window_size")]
    pub window_size: [f32; 2],
    /// How long toast notifications stay up, in seconds.
    #[serde(default = "default_toast_duration")]
    pub toast_duration_secs: f32,
    /// Give up fetching an overlay image after this many seconds.
    #[serde(default = "default_image_timeout")]
    pub image_timeout_secs: u64,
    /// Overlays requested per load.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Creating more overlays than this is refused by the form.
    #[serde(default = "default_max_overlays")]
    pub max_overlays: usize,
    /// Send every intermediate drag position to the store. When false, only
    /// the final position is saved on release.
    #[serde(default = "default_commit_during_drag")]
    pub commit_during_drag: bool,
    #[serde(default)]
    pub stream: StreamSettings,
    #[serde(default = "default_sample_urls")]
    pub sample_stream_urls: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            window_size: default_window_size(),
            toast_duration_secs: default_toast_duration(),
            image_timeout_secs: default_image_timeout(),
            page_size: default_page_size(),
            max_overlays: default_max_overlays(),
            commit_during_drag: default_commit_during_drag(),
            stream: StreamSettings::default(),
            sample_stream_urls: default_sample_urls(),
        }
    }
}

impl AppConfig {
    /// Load from the path in `STREAMOVERLAY_CONFIG`, else the default file.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: AppConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.commit_during_drag);
        assert_eq!(config.max_overlays, 10);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("streamoverlay.yaml");
        std::fs::write(
            &path,
            "store:\n  kind: file\n  path: overlays.json\ncommit_during_drag: false\nstream:\n  rtspUrl: rtsp://cam.local/feed\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(
            config.store,
            StoreConfig::File {
                path: PathBuf::from("overlays.json")
            }
        );
        assert!(!config.commit_during_drag);
        assert_eq!(config.stream.rtsp_url, "rtsp://cam.local/feed");
        assert_eq!(config.stream.bitrate, 2000);
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn test_http_timeout_default() {
        let store: StoreConfig =
            serde_yaml::from_str("kind: http\nbase_url: http://api.local/api\n").unwrap();
        assert_eq!(
            store,
            StoreConfig::Http {
                base_url: "http://api.local/api".to_string(),
                timeout_secs: 10
            }
        );
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "page_size: [not, a, number]\n").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_memory_store_opens() {
        assert!(StoreConfig::Memory.open().is_ok());
    }
}

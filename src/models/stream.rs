// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Stream source settings.
//!
//! This module holds the stream URL and encoding preferences shown on the
//! landing view, plus the URL checks performed before the video surface opens.

use super::validation::{ValidationErrors, Validator};
use serde::{Deserialize, Serialize};
use url::Url;

/// Public sample used for `sample`/`demo` stream URLs.
pub const SAMPLE_VIDEO_URL: &str =
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4";

const ACCEPTED_SCHEMES: [&str; 4] = ["rtsp", "rtsps", "http", "https"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "480p")]
    Sd480,
    #[default]
    #[serde(rename = "720p")]
    Hd720,
    #[serde(rename = "1080p")]
    Hd1080,
}

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::Sd480, Quality::Hd720, Quality::Hd1080];

    pub fn label(&self) -> &'static str {
        match self {
            Quality::Sd480 => "480p",
            Quality::Hd720 => "720p",
            Quality::Hd1080 => "1080p",
        }
    }
}

fn default_bitrate() -> u32 {
    2000
}

fn default_frame_rate() -> u32 {
    30
}

fn default_auto_reconnect() -> bool {
    true
}

fn default_buffer_size() -> u32 {
    3
}

/// Stream source and playback preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSettings {
    #[serde(default)]
    pub rtsp_url: String,
    #[serde(default)]
    pub quality: Quality,
    /// Kilobits per second.
    #[serde(default = "default_bitrate")]
    pub bitrate: u32,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    #[serde(default = "default_auto_reconnect")]
    pub auto_reconnect: bool,
    /// Seconds of buffered video.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: u32,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            rtsp_url: String::new(),
            quality: Quality::default(),
            bitrate: default_bitrate(),
            frame_rate: default_frame_rate(),
            auto_reconnect: default_auto_reconnect(),
            buffer_size: default_buffer_size(),
        }
    }
}

impl StreamSettings {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        let url_error = validate_stream_url(&self.rtsp_url).err();
        v.check(
            "rtspUrl",
            url_error.is_none(),
            url_error.as_deref().unwrap_or_default(),
        )
        .check(
            "bitrate",
            (500..=10_000).contains(&self.bitrate),
            "must be between 500 and 10000",
        )
        .check(
            "frameRate",
            (15..=60).contains(&self.frame_rate),
            "must be between 15 and 60",
        )
        .check(
            "bufferSize",
            (1..=10).contains(&self.buffer_size),
            "must be between 1 and 10",
        );
        v.finish()
    }
}

/// Check that `raw` is a URL the video surface can open.
///
/// Returns the parsed URL, or a message suitable for an error toast.
pub fn validate_stream_url(raw: &str) -> Result<Url, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("Please enter a valid RTSP URL".to_string());
    }

    let url = Url::parse(trimmed).map_err(|e| format!("Invalid stream URL: {}", e))?;
    if !ACCEPTED_SCHEMES.contains(&url.scheme()) {
        return Err(format!(
            "Unsupported scheme '{}', expected rtsp:// or http(s)://",
            url.scheme()
        ));
    }
    if url.host_str().is_none() {
        return Err("Stream URL has no host".to_string());
    }

    Ok(url)
}

/// URL the player should actually open. Demo and sample sources resolve to a
/// public test video.
pub fn playable_url(raw: &str) -> &str {
    if raw.contains("sample") || raw.contains("demo") {
        SAMPLE_VIDEO_URL
    } else {
        raw
    }
}

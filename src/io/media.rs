// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image loading for poster frames and image overlays.
//!
//! Video frames are not decoded; instead a still image can be loaded as the
//! backdrop of the video surface. Image overlays are fetched from their URL.
//! Both end up as RGBA pixels ready to become an egui texture.

use anyhow::{anyhow, bail, Context, Result};
use std::path::Path;
use std::time::Duration;

/// Decoded image in RGBA8 layout.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl LoadedImage {
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f32 / self.height as f32
    }
}

/// Load an image file and convert it to RGBA.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let img = image::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    Ok(to_loaded(img))
}

/// Decode an encoded image (PNG, JPEG, ...) held in memory.
pub fn decode_image(bytes: &[u8]) -> Result<LoadedImage> {
    let img = image::load_from_memory(bytes).context("Unrecognised image data")?;
    Ok(to_loaded(img))
}

/// Fetch and decode the image at an `http`, `https` or `file` URL.
///
/// Blocks for up to `timeout`; call it off the UI thread.
pub fn fetch_image(url: &str, timeout: Duration) -> Result<LoadedImage> {
    let parsed = url::Url::parse(url).with_context(|| format!("Invalid image URL {}", url))?;
    match parsed.scheme() {
        "file" => {
            let path = parsed
                .to_file_path()
                .map_err(|_| anyhow!("Invalid file URL {}", url))?;
            load_image(&path)
        }
        "http" | "https" => {
            let client = reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()?;
            let bytes = client
                .get(parsed)
                .send()?
                .error_for_status()?
                .bytes()?;
            decode_image(&bytes).with_context(|| format!("Cannot decode {}", url))
        }
        other => bail!("Unsupported image URL scheme: {}", other),
    }
}

fn to_loaded(img: image::DynamicImage) -> LoadedImage {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    LoadedImage {
        width,
        height,
        pixels: rgba.into_raw(),
    }
}

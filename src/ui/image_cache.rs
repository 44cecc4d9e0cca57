// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Textures for image overlays.
//!
//! Each distinct image URL is fetched once on its own thread and decoded
//! there; finished images are turned into textures on the UI thread when
//! polled. Failed URLs are remembered and not retried.

use crate::io::media::{self, LoadedImage};
use crate::models::overlay::{Overlay, OverlayKind};
use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Duration;

type FetchResult = (String, Result<LoadedImage, String>);

enum ImageState {
    Loading,
    Ready {
        texture: egui::TextureHandle,
        /// Width over height.
        aspect: f32,
    },
    Failed,
}

pub struct ImageCache {
    images: HashMap<String, ImageState>,
    timeout: Duration,
    sender: Sender<FetchResult>,
    receiver: Receiver<FetchResult>,
}

impl ImageCache {
    pub fn new(timeout: Duration) -> Self {
        let (sender, receiver) = channel();
        Self {
            images: HashMap::new(),
            timeout,
            sender,
            receiver,
        }
    }

    /// Start fetching the image of every image overlay not seen before.
    pub fn request_all(&mut self, overlays: &[Overlay]) {
        for overlay in overlays.iter().filter(|o| o.kind == OverlayKind::Image) {
            self.request(&overlay.content);
        }
    }

    pub fn request(&mut self, url: &str) {
        if url.trim().is_empty() || self.images.contains_key(url) {
            return;
        }
        self.images.insert(url.to_string(), ImageState::Loading);

        let sender = self.sender.clone();
        let url = url.to_string();
        let timeout = self.timeout;
        std::thread::spawn(move || {
            let result = media::fetch_image(&url, timeout).map_err(|e| format!("{:#}", e));
            let _ = sender.send((url, result));
        });
    }

    /// Upload finished images as textures. True if anything arrived.
    pub fn poll(&mut self, ctx: &egui::Context) -> bool {
        let mut arrived = false;
        while let Ok((url, result)) = self.receiver.try_recv() {
            arrived = true;
            let state = match result {
                Ok(image) => {
                    log::debug!("Loaded overlay image {} ({}x{})", url, image.width, image.height);
                    let size = [image.width as usize, image.height as usize];
                    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &image.pixels);
                    ImageState::Ready {
                        texture: ctx.load_texture(
                            format!("overlay_image:{}", url),
                            color_image,
                            egui::TextureOptions::LINEAR,
                        ),
                        aspect: image.aspect_ratio(),
                    }
                }
                Err(e) => {
                    log::warn!("Failed to load overlay image {}: {}", url, e);
                    ImageState::Failed
                }
            };
            self.images.insert(url, state);
        }
        arrived
    }

    /// True while any image is still being fetched.
    pub fn is_loading(&self) -> bool {
        self.images.values().any(|s| matches!(s, ImageState::Loading))
    }

    pub fn is_failed(&self, url: &str) -> bool {
        matches!(self.images.get(url), Some(ImageState::Failed))
    }

    /// Texture and aspect ratio of a loaded image.
    pub fn texture(&self, url: &str) -> Option<(&egui::TextureHandle, f32)> {
        match self.images.get(url) {
            Some(ImageState::Ready { texture, aspect }) => Some((texture, *aspect)),
            _ => None,
        }
    }
}

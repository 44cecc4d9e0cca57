// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! StreamOverlay - live stream overlay editor
//!
//! A cross-platform desktop application for placing text, image and logo
//! overlays over a live video stream by dragging them into position.

mod analytics;
mod app;
mod config;
mod interaction;
mod io;
mod models;
mod overlays;
mod store;
mod ui;
mod util;

use anyhow::{Context, Result};
use app::StreamOverlayApp;
use config::AppConfig;
use store::worker::StoreWorker;

fn main() -> Result<()> {
    // Initialize logging, defaulting to info
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let store = config
        .store
        .open()
        .with_context(|| format!("Failed to open {}", config.store.describe()))?;
    log::info!("Using {}", config.store.describe());
    let worker = StoreWorker::spawn(store);

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([800.0, 600.0])
            .with_title("StreamOverlay"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "StreamOverlay",
        options,
        Box::new(move |_cc| Ok(Box::new(StreamOverlayApp::new(config, worker)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}

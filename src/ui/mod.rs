// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! User interface components.

pub mod analytics_panel;
pub mod image_cache;
pub mod landing;
pub mod overlay_form;
pub mod overlay_panel;
pub mod stream_controls;
pub mod toast;
pub mod toolbar;
pub mod video_surface;

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: overlays, stream settings and exported scenes.

pub mod overlay;
pub mod scene;
pub mod stream;
pub mod validation;

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for poster images and scene/overlay documents.

pub mod media;
pub mod serialization;

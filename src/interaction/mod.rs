// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer interaction state: overlay dragging and selection.

pub mod drag;
pub mod selection;

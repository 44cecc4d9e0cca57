// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay data structures.
//!
//! This module defines the overlay record rendered above the video surface,
//! the draft used to create one and the partial patch used to update one.
//! Field names follow the overlay API's camelCase JSON.

use super::validation::{in_range, ValidationErrors, Validator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const POSITION_MIN: f64 = 0.0;
pub const POSITION_MAX: f64 = 100.0;
pub const FONT_SIZE_MIN: u32 = 8;
pub const FONT_SIZE_MAX: u32 = 72;

/// Top-left corner of an overlay as a percentage of the container (0 to 100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Opaque overlay identifier assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlayId(String);

impl OverlayId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type of overlay. Text overlays show `content` literally, image and logo
/// overlays treat it as an image URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    #[default]
    Text,
    Image,
    Logo,
}

impl OverlayKind {
    pub const ALL: [OverlayKind; 3] = [OverlayKind::Text, OverlayKind::Image, OverlayKind::Logo];

    pub fn label(&self) -> &'static str {
        match self {
            OverlayKind::Text => "text",
            OverlayKind::Image => "image",
            OverlayKind::Logo => "logo",
        }
    }

    pub fn content_is_url(&self) -> bool {
        !matches!(self, OverlayKind::Text)
    }
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Entrance animation hint stored with the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Animation {
    #[default]
    None,
    Fade,
    Slide,
    Bounce,
}

impl Animation {
    pub const ALL: [Animation; 4] = [
        Animation::None,
        Animation::Fade,
        Animation::Slide,
        Animation::Bounce,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Animation::None => "none",
            Animation::Fade => "fade",
            Animation::Slide => "slide",
            Animation::Bounce => "bounce",
        }
    }
}

fn default_font_size() -> u32 {
    16
}

fn default_color() -> String {
    "#ffffff".to_string()
}

fn default_background_color() -> String {
    "rgba(0,0,0,0.5)".to_string()
}

fn default_opacity() -> f64 {
    1.0
}

fn default_z_index() -> i32 {
    1
}

fn default_visible() -> bool {
    true
}

/// A positioned visual element rendered above the video surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    #[serde(rename = "_id", alias = "id")]
    pub id: OverlayId,
    #[serde(rename = "type")]
    pub kind: OverlayKind,
    pub content: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_background_color")]
    pub background_color: String,
    #[serde(default)]
    pub border_radius: u32,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_z_index")]
    pub z_index: i32,
    #[serde(default)]
    pub animation: Animation,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub version: u32,
}

impl Overlay {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Copy of this overlay moved to `position`, every other field unchanged.
    pub fn with_position(&self, position: Position) -> Overlay {
        Overlay {
            x: position.x,
            y: position.y,
            ..self.clone()
        }
    }

    /// Merge the fields present in `patch` into this overlay.
    pub fn apply(&mut self, patch: &OverlayPatch) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(ref content) = patch.content {
            self.content = content.clone();
        }
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(font_size) = patch.font_size {
            self.font_size = font_size;
        }
        if let Some(ref color) = patch.color {
            self.color = color.clone();
        }
        if let Some(ref background_color) = patch.background_color {
            self.background_color = background_color.clone();
        }
        if let Some(border_radius) = patch.border_radius {
            self.border_radius = border_radius;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(z_index) = patch.z_index {
            self.z_index = z_index;
        }
        if let Some(animation) = patch.animation {
            self.animation = animation;
        }
        if let Some(is_visible) = patch.is_visible {
            self.is_visible = is_visible;
        }
    }

    /// First `max_chars` characters of the content, with an ellipsis when cut.
    pub fn content_preview(&self, max_chars: usize) -> String {
        let mut preview: String = self.content.chars().take(max_chars).collect();
        if self.content.chars().count() > max_chars {
            preview.push_str("...");
        }
        preview
    }
}

/// Draft for a new overlay, as edited in the overlay form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOverlay {
    #[serde(rename = "type")]
    pub kind: OverlayKind,
    pub content: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub font_size: u32,
    pub color: String,
    pub background_color: String,
    pub border_radius: u32,
    pub opacity: f64,
    pub rotation: f64,
    pub z_index: i32,
    pub animation: Animation,
    pub is_visible: bool,
}

impl Default for NewOverlay {
    fn default() -> Self {
        Self {
            kind: OverlayKind::Text,
            content: String::new(),
            x: 50.0,
            y: 50.0,
            width: 200.0,
            height: 50.0,
            font_size: default_font_size(),
            color: default_color(),
            background_color: default_background_color(),
            border_radius: 5,
            opacity: default_opacity(),
            rotation: 0.0,
            z_index: default_z_index(),
            animation: Animation::None,
            is_visible: true,
        }
    }
}

impl NewOverlay {
    /// Draft pre-filled from an existing overlay (for editing or re-import).
    pub fn from_overlay(overlay: &Overlay) -> Self {
        Self {
            kind: overlay.kind,
            content: overlay.content.clone(),
            x: overlay.x,
            y: overlay.y,
            width: overlay.width,
            height: overlay.height,
            font_size: overlay.font_size,
            color: overlay.color.clone(),
            background_color: overlay.background_color.clone(),
            border_radius: overlay.border_radius,
            opacity: overlay.opacity,
            rotation: overlay.rotation,
            z_index: overlay.z_index,
            animation: overlay.animation,
            is_visible: overlay.is_visible,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check("content", !self.content.trim().is_empty(), "is required");
        check_geometry(
            &mut v,
            Some(self.x),
            Some(self.y),
            Some(self.width),
            Some(self.height),
        );
        check_presentation(&mut v, Some(self.font_size), Some(self.opacity), Some(self.rotation));
        v.finish()
    }

    /// Materialize the draft as a stored overlay.
    pub fn into_overlay(self, id: OverlayId, now: DateTime<Utc>) -> Overlay {
        Overlay {
            id,
            kind: self.kind,
            content: self.content,
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            font_size: self.font_size,
            color: self.color,
            background_color: self.background_color,
            border_radius: self.border_radius,
            opacity: self.opacity,
            rotation: self.rotation,
            z_index: self.z_index,
            animation: self.animation,
            is_visible: self.is_visible,
            created_at: Some(now),
            updated_at: Some(now),
            version: 1,
        }
    }
}

/// Partial update: only the present fields are merged into the overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayPatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<OverlayKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
}

impl OverlayPatch {
    /// Patch moving an overlay, as emitted by a drag.
    pub fn position(position: Position) -> Self {
        Self {
            x: Some(position.x),
            y: Some(position.y),
            ..Default::default()
        }
    }

    pub fn visibility(is_visible: bool) -> Self {
        Self {
            is_visible: Some(is_visible),
            ..Default::default()
        }
    }

    /// Patch replacing every editable field with the draft's values.
    pub fn from_draft(draft: &NewOverlay) -> Self {
        Self {
            kind: Some(draft.kind),
            content: Some(draft.content.clone()),
            x: Some(draft.x),
            y: Some(draft.y),
            width: Some(draft.width),
            height: Some(draft.height),
            font_size: Some(draft.font_size),
            color: Some(draft.color.clone()),
            background_color: Some(draft.background_color.clone()),
            border_radius: Some(draft.border_radius),
            opacity: Some(draft.opacity),
            rotation: Some(draft.rotation),
            z_index: Some(draft.z_index),
            animation: Some(draft.animation),
            is_visible: Some(draft.is_visible),
        }
    }

    pub fn is_position_only(&self) -> bool {
        *self
            == Self {
                x: self.x,
                y: self.y,
                ..Default::default()
            }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Some(ref content) = self.content {
            v.check("content", !content.trim().is_empty(), "is required");
        }
        check_geometry(&mut v, self.x, self.y, self.width, self.height);
        check_presentation(&mut v, self.font_size, self.opacity, self.rotation);
        v.finish()
    }
}

fn check_geometry(
    v: &mut Validator,
    x: Option<f64>,
    y: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
) {
    if let Some(x) = x {
        v.check("x", in_range(x, POSITION_MIN, POSITION_MAX), "must be between 0 and 100");
    }
    if let Some(y) = y {
        v.check("y", in_range(y, POSITION_MIN, POSITION_MAX), "must be between 0 and 100");
    }
    if let Some(width) = width {
        v.check("width", width.is_finite() && width > 0.0, "must be positive");
    }
    if let Some(height) = height {
        v.check("height", height.is_finite() && height > 0.0, "must be positive");
    }
}

fn check_presentation(
    v: &mut Validator,
    font_size: Option<u32>,
    opacity: Option<f64>,
    rotation: Option<f64>,
) {
    if let Some(font_size) = font_size {
        v.check(
            "fontSize",
            (FONT_SIZE_MIN..=FONT_SIZE_MAX).contains(&font_size),
            "must be between 8 and 72",
        );
    }
    if let Some(opacity) = opacity {
        v.check("opacity", in_range(opacity, 0.0, 1.0), "must be between 0 and 1");
    }
    if let Some(rotation) = rotation {
        v.check("rotation", rotation.is_finite(), "must be a number");
    }
}

/// The overlay API emits RFC 2822 dates, local files carry RFC 3339.
mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| parse(&s).map_err(serde::de::Error::custom))
            .transpose()
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::parse_from_rfc2822(raw))
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| format!("unrecognised timestamp {raw:?}: {e}"))
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! CSS color parsing for overlay colors.
//!
//! Overlays store colors the way the web client writes them (`#fff`,
//! `#ffffff`, `#ffffff80`, `rgb(...)`, `rgba(...)`). This converts them to
//! egui colors and back.

use egui::Color32;

/// Parse a CSS color string. Returns `None` for anything unrecognised.
pub fn parse_css_color(raw: &str) -> Option<Color32> {
    let s = raw.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = s.to_ascii_lowercase();
    let (body, has_alpha) = if let Some(rest) = lower.strip_prefix("rgba(") {
        (rest.strip_suffix(')')?, true)
    } else if let Some(rest) = lower.strip_prefix("rgb(") {
        (rest.strip_suffix(')')?, false)
    } else {
        return None;
    };

    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != if has_alpha { 4 } else { 3 } {
        return None;
    }

    let channel = |p: &str| -> Option<u8> {
        let v: f32 = p.parse().ok()?;
        v.is_finite().then(|| v.clamp(0.0, 255.0).round() as u8)
    };
    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = if has_alpha {
        let alpha: f32 = parts[3].parse().ok()?;
        if !alpha.is_finite() {
            return None;
        }
        (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
    } else {
        255
    };

    Some(Color32::from_rgba_unmultiplied(r, g, b, a))
}

fn parse_hex(hex: &str) -> Option<Color32> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => Some(Color32::from_rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        6 => Some(Color32::from_rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color32::from_rgba_unmultiplied(
            byte(0)?,
            byte(2)?,
            byte(4)?,
            byte(6)?,
        )),
        _ => None,
    }
}

/// Parse `raw`, falling back to `fallback` when it is not a color.
pub fn color_or(raw: &str, fallback: Color32) -> Color32 {
    parse_css_color(raw).unwrap_or_else(|| {
        log::debug!("Unrecognised color {:?}, using fallback", raw);
        fallback
    })
}

/// Format a color for storage: `#rrggbb` when opaque, `rgba(...)` otherwise.
pub fn to_css(color: Color32) -> String {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    if a == 255 {
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    } else {
        let alpha = (a as f32 / 255.0 * 100.0).round() / 100.0;
        format!("rgba({},{},{},{})", r, g, b, alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_css_color("#fff"), Some(Color32::WHITE));
        assert_eq!(parse_css_color("#3b82f6"), Some(Color32::from_rgb(0x3b, 0x82, 0xf6)));
        assert_eq!(
            parse_css_color("#00000000"),
            Some(Color32::from_rgba_unmultiplied(0, 0, 0, 0))
        );
        assert_eq!(parse_css_color("#12345"), None);
        assert_eq!(parse_css_color("#ggg"), None);
    }

    #[test]
    fn test_parse_rgb_functions() {
        assert_eq!(parse_css_color("rgb(255, 0, 0)"), Some(Color32::from_rgb(255, 0, 0)));
        assert_eq!(
            parse_css_color("rgba(0,0,0,0.5)"),
            Some(Color32::from_rgba_unmultiplied(0, 0, 0, 128))
        );
        assert_eq!(parse_css_color("rgba(0,0,0)"), None);
        assert_eq!(parse_css_color("hsl(0, 50%, 50%)"), None);
    }

    #[test]
    fn test_color_or_falls_back() {
        assert_eq!(color_or("nonsense", Color32::RED), Color32::RED);
    }

    #[test]
    fn test_to_css() {
        assert_eq!(to_css(Color32::from_rgb(255, 0, 16)), "#ff0010");
        assert_eq!(to_css(Color32::from_rgba_unmultiplied(0, 0, 0, 128)), "rgba(0,0,0,0.5)");
    }
}

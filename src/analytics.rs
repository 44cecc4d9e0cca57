// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Usage analytics.
//!
//! Summary counts come from the overlay service when it keeps them, and are
//! otherwise derived from the overlay cache and stream session. Usage
//! counters are accumulated for the lifetime of the process.

use crate::models::overlay::Overlay;
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Headline numbers shown at the top of the analytics window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_overlays: usize,
    pub active_overlays: usize,
    pub total_streams: usize,
    pub active_streams: usize,
}

impl AnalyticsSummary {
    pub fn collect(overlays: &[Overlay], usage: &UsageStats, stream_active: bool) -> Self {
        Self {
            total_overlays: overlays.len(),
            active_overlays: overlays.iter().filter(|o| o.is_visible).count(),
            total_streams: usage.streams_opened,
            active_streams: usize::from(stream_active),
        }
    }
}

/// Where the headline numbers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySource {
    /// Totals reported by the overlay service.
    Service,
    /// Counts for this session only.
    Session,
}

impl SummarySource {
    pub fn label(self) -> &'static str {
        match self {
            SummarySource::Service => "Totals from the overlay service",
            SummarySource::Session => "This session only; the store keeps no totals",
        }
    }
}

/// Service totals when available, else counts from this session.
pub fn current_summary(
    service: Option<AnalyticsSummary>,
    overlays: &[Overlay],
    usage: &UsageStats,
    stream_active: bool,
) -> (AnalyticsSummary, SummarySource) {
    match service {
        Some(summary) => (summary, SummarySource::Service),
        None => (
            AnalyticsSummary::collect(overlays, usage, stream_active),
            SummarySource::Session,
        ),
    }
}

#[derive(Debug, Clone)]
pub struct UsageStats {
    started: Instant,
    pub drags_started: usize,
    pub position_updates: usize,
    pub overlays_created: usize,
    pub overlays_updated: usize,
    pub overlays_deleted: usize,
    pub store_failures: usize,
    pub streams_opened: usize,
}

impl Default for UsageStats {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageStats {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            drags_started: 0,
            position_updates: 0,
            overlays_created: 0,
            overlays_updated: 0,
            overlays_deleted: 0,
            store_failures: 0,
            streams_opened: 0,
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// Average position updates per drag gesture.
    pub fn updates_per_drag(&self) -> f64 {
        if self.drags_started == 0 {
            0.0
        } else {
            self.position_updates as f64 / self.drags_started as f64
        }
    }
}

/// Format a duration as `2h 34m`, or `34m 5s` under an hour.
pub fn format_uptime(duration: Duration) -> String {
    let secs = duration.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m {}s", minutes, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::overlay::{NewOverlay, OverlayId};

    #[test]
    fn test_summary_counts_visible_overlays() {
        let overlays: Vec<Overlay> = (0..4)
            .map(|i| {
                NewOverlay {
                    content: format!("o{}", i),
                    is_visible: i != 0,
                    ..Default::default()
                }
                .into_overlay(OverlayId::new(format!("o{}", i)), chrono::Utc::now())
            })
            .collect();
        let mut usage = UsageStats::new();
        usage.streams_opened = 2;

        let summary = AnalyticsSummary::collect(&overlays, &usage, true);
        assert_eq!(
            summary,
            AnalyticsSummary {
                total_overlays: 4,
                active_overlays: 3,
                total_streams: 2,
                active_streams: 1,
            }
        );
    }

    #[test]
    fn test_service_totals_take_precedence() {
        let mut usage = UsageStats::new();
        usage.streams_opened = 1;
        let service = AnalyticsSummary {
            total_overlays: 12,
            active_overlays: 7,
            total_streams: 30,
            active_streams: 4,
        };

        let (summary, source) = current_summary(Some(service), &[], &usage, true);
        assert_eq!(summary, service);
        assert_eq!(source, SummarySource::Service);

        let (summary, source) = current_summary(None, &[], &usage, true);
        assert_eq!(summary.total_streams, 1);
        assert_eq!(source, SummarySource::Session);
    }

    #[test]
    fn test_summary_reads_api_field_names() {
        let summary: AnalyticsSummary = serde_json::from_str(
            r#"{"totalOverlays": 5, "activeOverlays": 3, "totalStreams": 9, "activeStreams": 2}"#,
        )
        .unwrap();
        assert_eq!(summary.total_streams, 9);
        assert_eq!(summary.active_overlays, 3);
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(2 * 3600 + 34 * 60 + 9)), "2h 34m");
        assert_eq!(format_uptime(Duration::from_secs(65)), "1m 5s");
        assert_eq!(format_uptime(Duration::ZERO), "0m 0s");
    }

    #[test]
    fn test_updates_per_drag() {
        let mut usage = UsageStats::new();
        assert_eq!(usage.updates_per_drag(), 0.0);
        usage.drags_started = 2;
        usage.position_updates = 9;
        assert!((usage.updates_per_drag() - 4.5).abs() < 0.0001);
    }
}

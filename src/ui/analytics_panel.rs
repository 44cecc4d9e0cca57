// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Analytics window.

use crate::analytics::{format_uptime, AnalyticsSummary, SummarySource, UsageStats};

/// Display the analytics window; clears `open` when closed.
pub fn show(
    ctx: &egui::Context,
    open: &mut bool,
    summary: &AnalyticsSummary,
    source: SummarySource,
    usage: &UsageStats,
) {
    egui::Window::new("Analytics")
        .open(open)
        .resizable(false)
        .default_width(320.0)
        .show(ctx, |ui| {
            ui.columns(4, |columns| {
                stat(&mut columns[0], "Overlays", summary.total_overlays);
                stat(&mut columns[1], "Visible", summary.active_overlays);
                stat(&mut columns[2], "Streams", summary.total_streams);
                stat(&mut columns[3], "Live", summary.active_streams);
            });
            ui.label(egui::RichText::new(source.label()).small().italics().weak());

            ui.separator();

            egui::Grid::new("usage_stats")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui| {
                    let rows = [
                        ("Drags", usage.drags_started.to_string()),
                        ("Position updates", usage.position_updates.to_string()),
                        ("Updates per drag", format!("{:.1}", usage.updates_per_drag())),
                        ("Overlays created", usage.overlays_created.to_string()),
                        ("Overlays updated", usage.overlays_updated.to_string()),
                        ("Overlays deleted", usage.overlays_deleted.to_string()),
                        ("Store failures", usage.store_failures.to_string()),
                        ("Uptime", format_uptime(usage.uptime())),
                    ];
                    for (label, value) in rows {
                        ui.label(label);
                        ui.label(egui::RichText::new(value).monospace());
                        ui.end_row();
                    }
                });
        });
}

fn stat(ui: &mut egui::Ui, label: &str, value: usize) {
    ui.vertical_centered(|ui| {
        ui.label(egui::RichText::new(value.to_string()).size(22.0).strong());
        ui.label(egui::RichText::new(label).small().weak());
    });
}

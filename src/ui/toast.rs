// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toast notifications.
//!
//! Status messages are shown with `egui_toast` in the top-right corner and
//! disappear after the configured duration. The most recent ones are also
//! kept for the notifications window.

pub use egui_toast::ToastKind;
use egui_toast::{Toast, ToastOptions, Toasts};
use std::collections::VecDeque;

const RECENT_CAPACITY: usize = 50;

/// A message that was shown as a toast.
#[derive(Clone)]
pub struct Notice {
    pub kind: ToastKind,
    pub message: String,
}

pub struct Notifications {
    toasts: Toasts,
    duration_secs: f64,
    recent: VecDeque<Notice>,
}

impl Notifications {
    pub fn new(duration_secs: f32) -> Self {
        Self {
            toasts: Toasts::new().anchor(egui::Align2::RIGHT_TOP, [-10.0, 40.0]),
            duration_secs: duration_secs.max(0.5) as f64,
            recent: VecDeque::with_capacity(RECENT_CAPACITY),
        }
    }

    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            ToastKind::Error | ToastKind::Warning => log::warn!("{}", message),
            _ => log::info!("{}", message),
        }

        self.toasts.add(Toast {
            text: message.clone().into(),
            kind,
            options: ToastOptions::default().duration_in_seconds(self.duration_secs),
            ..Default::default()
        });

        if self.recent.len() == RECENT_CAPACITY {
            self.recent.pop_front();
        }
        self.recent.push_back(Notice { kind, message });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Error, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Warning, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Info, message);
    }

    /// Messages shown so far, oldest first.
    pub fn recent(&self) -> impl DoubleEndedIterator<Item = &Notice> {
        self.recent.iter()
    }

    /// Number of recent messages of the given kind.
    pub fn count(&self, kind: ToastKind) -> usize {
        self.recent
            .iter()
            .filter(|n| std::mem::discriminant(&n.kind) == std::mem::discriminant(&kind))
            .count()
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        self.toasts.show(ctx);
    }
}

fn kind_label(kind: ToastKind) -> &'static str {
    match kind {
        ToastKind::Success => "✔",
        ToastKind::Error => "⚠",
        ToastKind::Warning => "⚠",
        _ => "ℹ",
    }
}

/// Window listing recent notifications, newest first.
pub fn show_recent(ctx: &egui::Context, open: &mut bool, notifications: &Notifications) {
    egui::Window::new("Notifications")
        .open(open)
        .default_width(320.0)
        .show(ctx, |ui| {
            if notifications.recent.is_empty() {
                ui.label(egui::RichText::new("Nothing yet").weak());
                return;
            }
            egui::ScrollArea::vertical().max_height(300.0).show(ui, |ui| {
                for notice in notifications.recent().rev() {
                    ui.label(format!("{} {}", kind_label(notice.kind), notice.message));
                }
            });
        });
}

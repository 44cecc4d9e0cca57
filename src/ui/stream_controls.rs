// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback controls shown under the video surface.
//!
//! Play/pause, mute and volume. Frames are not decoded, so this tracks the
//! player state that an attached decoder would follow.

/// Player state driven by the controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub playing: bool,
    /// 0.0 to 1.0
    volume: f32,
    muted: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            playing: false,
            volume: 0.8,
            muted: false,
        }
    }
}

impl PlaybackState {
    pub fn toggle_play(&mut self) {
        self.playing = !self.playing;
        log::info!("Playback {}", if self.playing { "started" } else { "paused" });
    }

    /// Set the volume; zero mutes, raising it again unmutes.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if self.volume == 0.0 {
            self.muted = true;
        } else if self.muted {
            self.muted = false;
        }
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Volume actually heard.
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    pub fn volume_label(&self) -> String {
        format!("{}%", (self.effective_volume() * 100.0).round() as u32)
    }
}

/// Display the play/mute/volume controls.
pub fn show(ui: &mut egui::Ui, state: &mut PlaybackState) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let play_label = if state.playing { "⏸ Pause" } else { "▶ Play" };
        if ui.button(play_label).clicked() {
            state.toggle_play();
        }

        ui.separator();

        let mute_label = if state.is_muted() { "🔇" } else { "🔊" };
        if ui.button(mute_label).on_hover_text("Toggle mute").clicked() {
            state.toggle_mute();
        }

        let mut volume = state.effective_volume();
        if ui
            .add(
                egui::Slider::new(&mut volume, 0.0..=1.0)
                    .step_by(0.1)
                    .show_value(false),
            )
            .changed()
        {
            state.set_volume(volume);
        }
        ui.label(state.volume_label());
    });
}

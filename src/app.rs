// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the eframe::App trait. It routes pointer events from the video surface
//! through the drag controller, keeps the overlay cache in sync with the
//! store worker, and lays out the landing and stream views.

use crate::analytics::{current_summary, AnalyticsSummary, UsageStats};
use crate::config::AppConfig;
use crate::interaction::drag::DragController;
use crate::interaction::selection::Selection;
use crate::io::media::LoadedImage;
use crate::models::overlay::{NewOverlay, OverlayId, OverlayPatch};
use crate::models::scene::SceneConfig;
use crate::models::stream::{playable_url, StreamSettings};
use crate::overlays::{CacheEvent, OverlayCache};
use crate::store::worker::{StoreWorker, UpdateOrigin};
use crate::ui::overlay_form::{self, FormAction, OverlayForm};
use crate::ui::overlay_panel::{self, PanelAction};
use crate::ui::stream_controls::{self, PlaybackState};
use crate::ui::image_cache::ImageCache;
use crate::ui::toast::{self, Notifications};
use crate::ui::toolbar::{self, ToolbarAction};
use crate::ui::video_surface::{self, Poster, SurfaceEvent};
use crate::ui::{analytics_panel, landing};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Landing,
    Stream,
}

/// Main application state.
pub struct StreamOverlayApp {
    config: AppConfig,

    view: View,

    /// Settings being edited on the landing view
    stream_draft: StreamSettings,

    /// Stream currently shown on the video surface
    active_stream: Option<StreamSettings>,

    /// Local copy of the store's overlays
    cache: OverlayCache,

    drag: DragController,

    selection: Selection,

    playback: PlaybackState,

    toasts: Notifications,

    /// Textures for image overlays
    images: ImageCache,

    usage: UsageStats,

    /// Totals reported by the overlay service, when it keeps any
    service_summary: Option<AnalyticsSummary>,

    /// Open create/edit form
    form: Option<OverlayForm>,

    show_analytics: bool,

    show_notifications: bool,

    /// Still frame behind the overlays
    poster: Option<Poster>,

    /// Receiver for background poster loading
    poster_loader: Option<Receiver<Result<LoadedImage, String>>>,

    /// Loading state message
    loading_message: Option<String>,
}

impl StreamOverlayApp {
    /// Create the application around an already running store worker.
    pub fn new(config: AppConfig, worker: StoreWorker) -> Self {
        Self {
            stream_draft: config.stream.clone(),
            cache: OverlayCache::new(worker, config.page_size),
            view: View::Landing,
            active_stream: None,
            drag: DragController::new(),
            selection: Selection::new(),
            playback: PlaybackState::default(),
            toasts: Notifications::new(config.toast_duration_secs),
            images: ImageCache::new(Duration::from_secs(config.image_timeout_secs)),
            usage: UsageStats::new(),
            service_summary: None,
            form: None,
            show_analytics: false,
            show_notifications: false,
            poster: None,
            poster_loader: None,
            loading_message: None,
            config,
        }
    }

    fn start_stream(&mut self, settings: StreamSettings) {
        log::info!("Opening stream {}", settings.rtsp_url);
        self.usage.streams_opened += 1;
        self.active_stream = Some(settings);
        self.view = View::Stream;
        self.playback.playing = true;
        self.toasts.success("Stream started");
        self.cache.fetch();
    }

    fn leave_stream(&mut self) {
        if let Some(stream) = self.active_stream.take() {
            log::info!("Closing stream {}", stream.rtsp_url);
            self.stream_draft = stream;
        }
        self.drag.reset();
        self.selection.clear();
        self.form = None;
        self.playback.playing = false;
        self.view = View::Landing;
    }

    /// Apply finished store requests and report them to the user.
    fn process_cache_events(&mut self) {
        for event in self.cache.poll() {
            match event {
                CacheEvent::Loaded { count, total } => {
                    log::debug!("Cache holds {} of {} overlays", count, total);
                    self.selection.retain_existing(self.cache.overlays());
                }
                CacheEvent::Created(overlay) => {
                    self.usage.overlays_created += 1;
                    log::info!("Created overlay {}", overlay.id);
                    self.toasts.success("Overlay created");
                }
                CacheEvent::Updated { overlay, origin } => match origin {
                    UpdateOrigin::Form => {
                        self.usage.overlays_updated += 1;
                        log::info!("Updated overlay {}", overlay.id);
                        self.toasts.success("Overlay updated");
                    }
                    UpdateOrigin::Drag | UpdateOrigin::Visibility => {
                        log::debug!(
                            "Store confirmed overlay {} at ({:.1}, {:.1})",
                            overlay.id,
                            overlay.x,
                            overlay.y
                        );
                    }
                },
                CacheEvent::Deleted(id) => {
                    self.usage.overlays_deleted += 1;
                    self.forget_overlay(&id);
                    self.toasts.success("Overlay deleted");
                }
                CacheEvent::BulkApplied { succeeded, failed } => {
                    if failed > 0 {
                        self.toasts.warning(format!(
                            "Updated {} overlays, {} failed",
                            succeeded, failed
                        ));
                    } else {
                        self.toasts.success(format!("Updated {} overlays", succeeded));
                    }
                }
                CacheEvent::Analytics(summary) => {
                    if summary.is_none() {
                        log::debug!("Store keeps no totals; showing session counts");
                    }
                    self.service_summary = summary;
                }
                CacheEvent::Failed { action, message } => {
                    self.usage.store_failures += 1;
                    self.toasts.error(format!("Failed to {}: {}", action, message));
                }
            }
        }
    }

    /// Drop every reference to an overlay that no longer exists.
    fn forget_overlay(&mut self, id: &OverlayId) {
        self.drag.cancel_if(id);
        self.selection.retain_existing(self.cache.overlays());
        if self.form.as_ref().and_then(|f| f.editing()) == Some(id) {
            log::info!("Closing form for removed overlay {}", id);
            self.form = None;
        }
    }

    fn delete_overlay(&mut self, id: &OverlayId) {
        // A drag of the overlay ends now rather than when the store replies
        self.drag.cancel_if(id);
        self.cache.delete(id);
    }

    fn handle_surface_events(&mut self, events: Vec<SurfaceEvent>) {
        for event in events {
            match event {
                SurfaceEvent::PointerDown {
                    id,
                    pointer,
                    overlay_rect,
                } => {
                    let Some(overlay) = self.cache.get(&id).cloned() else {
                        continue;
                    };
                    if self
                        .drag
                        .pointer_down(&overlay, pointer, &overlay_rect, &mut self.selection)
                        .is_some()
                    {
                        self.usage.drags_started += 1;
                    }
                }
                SurfaceEvent::BackgroundPressed => {
                    if !self.drag.is_dragging() {
                        self.selection.clear();
                    }
                }
                SurfaceEvent::PointerMoved { pointer, container } => {
                    let Some(update) = self.drag.pointer_move(pointer, &container) else {
                        continue;
                    };
                    self.usage.position_updates += 1;
                    if self.config.commit_during_drag {
                        self.cache
                            .update(&update.id, update.patch(), UpdateOrigin::Drag);
                    } else {
                        self.cache.preview_position(&update.id, update.position);
                    }
                }
                SurfaceEvent::PointerReleased => {
                    let Some(session) = self.drag.pointer_up() else {
                        continue;
                    };
                    log::debug!(
                        "Drag of {} from ({:.1}, {:.1}) produced {} updates",
                        session.overlay_id(),
                        session.start_position().x,
                        session.start_position().y,
                        session.updates_emitted()
                    );
                    if !self.config.commit_during_drag {
                        if let Some(position) = session.last_position() {
                            self.cache.update(
                                session.overlay_id(),
                                OverlayPatch::position(position),
                                UpdateOrigin::Drag,
                            );
                        }
                    }
                }
                SurfaceEvent::EscapePressed => {
                    if !self.drag.is_dragging() {
                        self.selection.clear();
                    }
                }
            }
        }
    }

    fn handle_panel_action(&mut self, action: PanelAction) {
        match action {
            PanelAction::Select(id) => self.selection.select(id),
            PanelAction::Edit(id) => {
                if let Some(overlay) = self.cache.get(&id) {
                    self.form = Some(OverlayForm::edit(overlay));
                }
            }
            PanelAction::Delete(id) => self.delete_overlay(&id),
            PanelAction::ToggleVisibility(id, is_visible) => {
                self.cache.set_visibility(&id, is_visible);
            }
            PanelAction::None => {}
        }
    }

    fn handle_form_action(&mut self, action: FormAction) {
        match action {
            FormAction::Save {
                editing: Some(id),
                draft,
            } => {
                self.cache
                    .update(&id, OverlayPatch::from_draft(&draft), UpdateOrigin::Form);
                self.form = None;
            }
            FormAction::Save {
                editing: None,
                draft,
            } => {
                if self.at_overlay_limit() {
                    self.toasts.warning(format!(
                        "At most {} overlays are allowed",
                        self.config.max_overlays
                    ));
                    return;
                }
                self.cache.create(draft);
                self.form = None;
            }
            FormAction::Cancel => self.form = None,
            FormAction::None => {}
        }
    }

    fn handle_toolbar_action(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::AddOverlay => {
                if self.at_overlay_limit() {
                    self.toasts.warning(format!(
                        "At most {} overlays are allowed",
                        self.config.max_overlays
                    ));
                } else {
                    self.form = Some(OverlayForm::create());
                }
            }
            ToolbarAction::Refresh => {
                self.cache.fetch();
                if self.show_analytics {
                    self.cache.fetch_analytics();
                }
            }
            ToolbarAction::ShowAll => self.cache.set_all_visibility(true),
            ToolbarAction::HideAll => self.cache.set_all_visibility(false),
            ToolbarAction::ToggleAnalytics => self.set_analytics_open(!self.show_analytics),
            ToolbarAction::ChangeStream => self.leave_stream(),
            ToolbarAction::None => {}
        }
    }

    /// Overlays that exist or are being created.
    fn overlay_count(&self) -> usize {
        self.cache.overlays().len() + self.cache.pending_creates()
    }

    fn at_overlay_limit(&self) -> bool {
        self.overlay_count() >= self.config.max_overlays
    }

    /// Opening the analytics window asks the store for fresh totals.
    fn set_analytics_open(&mut self, open: bool) {
        self.show_analytics = open;
        if open {
            self.cache.fetch_analytics();
        }
    }

    fn current_stream_url(&self) -> &str {
        self.active_stream
            .as_ref()
            .map(|s| s.rtsp_url.as_str())
            .unwrap_or(self.stream_draft.rtsp_url.as_str())
    }

    /// Write the stream URL and overlays to `path` (format from extension).
    fn export_scene(&mut self, path: PathBuf) {
        let scene = SceneConfig::new(
            self.current_stream_url().to_string(),
            self.cache.overlays().to_vec(),
        );
        match crate::io::serialization::export(&scene, &path) {
            Ok(()) => {
                log::info!(
                    "Exported {} overlays to {}",
                    scene.overlays.len(),
                    path.display()
                );
                self.toasts.success("Configuration exported");
            }
            Err(e) => {
                log::error!("Failed to export configuration: {:#}", e);
                self.toasts.error(format!("Export failed: {}", e));
            }
        }
    }

    /// Load a scene, take its stream URL and recreate its overlays in the store.
    fn import_scene(&mut self, path: PathBuf) {
        let scene: SceneConfig = match crate::io::serialization::import(&path) {
            Ok(scene) => scene,
            Err(e) => {
                log::error!("Failed to import configuration: {:#}", e);
                self.toasts.error(format!("Import failed: {}", e));
                return;
            }
        };

        if !scene.rtsp_url.is_empty() {
            match self.active_stream {
                Some(ref mut stream) => stream.rtsp_url = scene.rtsp_url.clone(),
                None => self.stream_draft.rtsp_url = scene.rtsp_url.clone(),
            }
        }

        let capacity = self
            .config
            .max_overlays
            .saturating_sub(self.overlay_count());
        let skipped = scene.overlays.len().saturating_sub(capacity);
        for overlay in scene.overlays.iter().take(capacity) {
            self.cache.create(NewOverlay::from_overlay(overlay));
        }

        log::info!(
            "Imported {} overlays from {}",
            scene.overlays.len() - skipped,
            path.display()
        );
        if skipped > 0 {
            self.toasts.warning(format!(
                "Skipped {} overlays over the limit of {}",
                skipped, self.config.max_overlays
            ));
        } else {
            self.toasts.success("Configuration imported");
        }
    }

    /// Load a poster frame image (asynchronously).
    fn load_poster(&mut self, path: PathBuf) {
        let (sender, receiver) = channel();
        self.poster_loader = Some(receiver);
        self.loading_message = Some("Loading poster frame...".to_string());

        // Spawn background thread for loading
        std::thread::spawn(move || {
            let result = crate::io::media::load_image(&path)
                .map(|image| {
                    log::info!(
                        "Loaded poster frame: {} ({}x{})",
                        path.display(),
                        image.width,
                        image.height
                    );
                    image
                })
                .map_err(|e| format!("Failed to load image: {:#}", e));
            let _ = sender.send(result);
        });
    }

    fn poll_poster(&mut self, ctx: &egui::Context) {
        let Some(ref receiver) = self.poster_loader else {
            return;
        };
        let Ok(result) = receiver.try_recv() else {
            return;
        };
        self.poster_loader = None;
        self.loading_message = None;

        match result {
            Ok(image) => {
                let size = [image.width as usize, image.height as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &image.pixels);
                let texture =
                    ctx.load_texture("poster_frame", color_image, egui::TextureOptions::LINEAR);
                self.poster = Some(Poster {
                    texture,
                    aspect: image.aspect_ratio(),
                });
                self.toasts
                    .info(format!("Poster frame {}x{}", image.width, image.height));
            }
            Err(e) => {
                log::error!("{}", e);
                self.toasts.error(e);
            }
        }
    }

    fn show_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Poster Frame...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Images", &["jpg", "jpeg", "png", "bmp", "tiff", "tif"])
                            .pick_file()
                        {
                            self.load_poster(path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Import Configuration...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Configuration", &["json", "yaml", "yml"])
                            .pick_file()
                        {
                            self.import_scene(path);
                        }
                        ui.close_menu();
                    }
                    ui.menu_button("Export Configuration", |ui| {
                        if ui.button("JSON...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("JSON", &["json"])
                                .set_file_name("stream-config.json")
                                .save_file()
                            {
                                self.export_scene(path);
                            }
                            ui.close_menu();
                        }
                        if ui.button("YAML...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("YAML", &["yaml", "yml"])
                                .set_file_name("stream-config.yaml")
                                .save_file()
                            {
                                self.export_scene(path);
                            }
                            ui.close_menu();
                        }
                    });
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    let mut analytics = self.show_analytics;
                    if ui.checkbox(&mut analytics, "Analytics").clicked() {
                        self.set_analytics_open(analytics);
                        ui.close_menu();
                    }
                    if ui.checkbox(&mut self.show_notifications, "Notifications").clicked() {
                        ui.close_menu();
                    }
                    if self.view == View::Stream && ui.button("Change Stream").clicked() {
                        self.leave_stream();
                        ui.close_menu();
                    }
                });

                ui.menu_button("Help", |ui| {
                    ui.label(format!("StreamOverlay {}", env!("CARGO_PKG_VERSION")));
                    ui.label(egui::RichText::new(self.config.store.describe()).weak());
                });
            });
        });
    }

    fn show_stream_view(&mut self, ctx: &egui::Context) {
        let stream_url = self.current_stream_url().to_string();

        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                toolbar::show(
                    ui,
                    &stream_url,
                    self.cache.overlays().len(),
                    self.config.max_overlays,
                    self.cache.is_loading(),
                )
            })
            .inner;
        self.handle_toolbar_action(toolbar_action);

        egui::TopBottomPanel::bottom("playback").show(ctx, |ui| {
            ui.horizontal(|ui| {
                stream_controls::show(ui, &mut self.playback);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(ref message) = self.loading_message {
                        ui.label(message);
                        ui.spinner();
                    }
                });
            });
        });

        let panel_action = egui::SidePanel::right("overlays")
            .default_width(260.0)
            .show(ctx, |ui| {
                overlay_panel::show(ui, self.cache.overlays(), &self.selection, self.cache.error())
            })
            .inner;
        self.handle_panel_action(panel_action);

        self.images.request_all(self.cache.overlays());
        let surface_events = egui::CentralPanel::default()
            .show(ctx, |ui| {
                video_surface::show(
                    ui,
                    self.cache.overlays(),
                    &self.selection,
                    self.drag.is_dragging(),
                    self.poster.as_ref(),
                    &self.images,
                    playable_url(&stream_url),
                )
            })
            .inner;
        self.handle_surface_events(surface_events);

        // Delete the selected overlay, unless a text field is being edited
        if !ctx.wants_keyboard_input()
            && ctx.input(|i| i.key_pressed(egui::Key::Delete))
        {
            if let Some(id) = self.selection.selected().cloned() {
                self.delete_overlay(&id);
            }
        }

        let form_action = self.form.as_mut().map(|form| overlay_form::show(ctx, form));
        if let Some(action) = form_action {
            self.handle_form_action(action);
        }
    }

    fn show_landing_view(&mut self, ctx: &egui::Context) {
        let action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                landing::show(ui, &mut self.stream_draft, &self.config.sample_stream_urls)
            })
            .inner;

        match action {
            landing::LandingAction::Start(settings) => self.start_stream(settings),
            landing::LandingAction::Invalid(message) => {
                log::warn!("Stream rejected: {}", message);
                self.toasts.error(message);
            }
            landing::LandingAction::None => {}
        }
    }
}

impl eframe::App for StreamOverlayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_poster(ctx);
        self.process_cache_events();
        self.images.poll(ctx);

        self.show_menu_bar(ctx);
        match self.view {
            View::Landing => self.show_landing_view(ctx),
            View::Stream => self.show_stream_view(ctx),
        }

        if self.show_analytics {
            let (summary, source) = current_summary(
                self.service_summary,
                self.cache.overlays(),
                &self.usage,
                self.view == View::Stream,
            );
            analytics_panel::show(ctx, &mut self.show_analytics, &summary, source, &self.usage);
        }
        if self.show_notifications {
            toast::show_recent(ctx, &mut self.show_notifications, &self.toasts);
        }

        self.toasts.show(ctx);

        // Keep polling while work is outstanding
        if self.cache.has_pending() || self.loading_message.is_some() || self.images.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::overlay::{Overlay, Position};
    use crate::store::memory::MemoryStore;
    use crate::store::testing::OfflineStore;
    use crate::store::{OverlayPage, OverlayQuery, OverlayStore, StoreError};
    use crate::ui::toast::ToastKind;
    use crate::util::geometry::{ScreenPoint, ScreenRect};
    use std::time::Instant;

    fn seeded_overlay() -> Overlay {
        NewOverlay {
            content: "LIVE".to_string(),
            x: 10.0,
            y: 10.0,
            width: 100.0,
            height: 40.0,
            ..Default::default()
        }
        .into_overlay(OverlayId::new("live"), chrono::Utc::now())
    }

    fn seeded_store() -> MemoryStore {
        MemoryStore::with_overlays(vec![seeded_overlay()])
    }

    fn app(commit_during_drag: bool) -> StreamOverlayApp {
        let config = AppConfig {
            commit_during_drag,
            ..Default::default()
        };
        app_with(config, Box::new(seeded_store()))
    }

    fn app_with(config: AppConfig, store: Box<dyn OverlayStore + Send>) -> StreamOverlayApp {
        let mut app = StreamOverlayApp::new(config, StoreWorker::spawn(store));
        app.start_stream(StreamSettings {
            rtsp_url: "rtsp://cam.local/live".to_string(),
            ..Default::default()
        });
        settle(&mut app);
        app
    }

    fn settle(app: &mut StreamOverlayApp) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while app.cache.has_pending() && Instant::now() < deadline {
            app.process_cache_events();
            std::thread::sleep(Duration::from_millis(5));
        }
        app.process_cache_events();
    }

    fn container() -> ScreenRect {
        ScreenRect::new(0.0, 0.0, 1000.0, 500.0)
    }

    fn press(app: &mut StreamOverlayApp) {
        // The overlay is drawn at (100, 50); grab it 10px in
        app.handle_surface_events(vec![SurfaceEvent::PointerDown {
            id: OverlayId::new("live"),
            pointer: ScreenPoint::new(110.0, 60.0),
            overlay_rect: ScreenRect::new(100.0, 50.0, 100.0, 40.0),
        }]);
    }

    fn move_to(app: &mut StreamOverlayApp, x: f32, y: f32) {
        app.handle_surface_events(vec![SurfaceEvent::PointerMoved {
            pointer: ScreenPoint::new(x, y),
            container: container(),
        }]);
    }

    fn position(app: &StreamOverlayApp) -> Position {
        app.cache
            .get(&OverlayId::new("live"))
            .map(|o| o.position())
            .unwrap()
    }

    #[test]
    fn test_drag_commits_every_move() {
        let mut app = app(true);
        assert_eq!(app.cache.overlays().len(), 1);

        press(&mut app);
        assert!(app.selection.is_selected(&OverlayId::new("live")));

        move_to(&mut app, 310.0, 160.0);
        assert!(app.cache.has_pending());
        move_to(&mut app, 510.0, 260.0);
        app.handle_surface_events(vec![SurfaceEvent::PointerReleased]);
        settle(&mut app);

        let moved = position(&app);
        assert!((moved.x - 50.0).abs() < 1e-6);
        assert!((moved.y - 50.0).abs() < 1e-6);
        assert_eq!(app.usage.drags_started, 1);
        assert_eq!(app.usage.position_updates, 2);
        assert!(!app.drag.is_dragging());
        assert_eq!(app.usage.store_failures, 0);
    }

    #[test]
    fn test_preview_mode_commits_on_release() {
        let mut app = app(false);

        press(&mut app);
        move_to(&mut app, 510.0, 260.0);
        assert!(!app.cache.has_pending());
        assert!((position(&app).x - 50.0).abs() < 1e-6);

        app.handle_surface_events(vec![SurfaceEvent::PointerReleased]);
        assert!(app.cache.has_pending());
        settle(&mut app);

        let stored = app.cache.get(&OverlayId::new("live")).unwrap();
        assert!((stored.x - 50.0).abs() < 1e-6);
        assert_eq!(stored.version, 2);
    }

    #[test]
    fn test_background_press_clears_selection_when_idle() {
        let mut app = app(true);
        press(&mut app);
        app.handle_surface_events(vec![SurfaceEvent::PointerReleased]);
        assert!(app.selection.selected().is_some());

        app.handle_surface_events(vec![SurfaceEvent::BackgroundPressed]);
        assert!(app.selection.selected().is_none());
    }

    #[test]
    fn test_delete_ends_drag_and_selection() {
        let mut app = app(true);
        press(&mut app);
        assert!(app.drag.is_dragging());

        app.handle_panel_action(PanelAction::Delete(OverlayId::new("live")));
        assert!(!app.drag.is_dragging());
        settle(&mut app);

        assert!(app.cache.overlays().is_empty());
        assert!(app.selection.selected().is_none());
        assert_eq!(app.usage.overlays_deleted, 1);
    }

    #[test]
    fn test_create_respects_overlay_limit() {
        let mut app = app(true);
        app.config.max_overlays = 1;

        app.handle_toolbar_action(ToolbarAction::AddOverlay);
        assert!(app.form.is_none());

        app.handle_form_action(FormAction::Save {
            editing: None,
            draft: NewOverlay {
                content: "extra".to_string(),
                ..Default::default()
            },
        });
        assert!(!app.cache.has_pending());
        // Once from the toolbar, once from the form
        assert_eq!(app.toasts.count(ToastKind::Warning), 2);
    }

    #[test]
    fn test_escape_clears_selection_when_idle() {
        let mut app = app(true);
        app.selection.select(OverlayId::new("live"));

        app.handle_surface_events(vec![SurfaceEvent::EscapePressed]);
        assert!(app.selection.selected().is_none());
    }

    #[test]
    fn test_background_press_and_escape_during_drag_keep_selection() {
        let mut app = app(true);
        press(&mut app);
        assert!(app.drag.is_dragging());

        app.handle_surface_events(vec![
            SurfaceEvent::BackgroundPressed,
            SurfaceEvent::EscapePressed,
        ]);
        assert!(app.drag.is_dragging());
        assert!(app.selection.is_selected(&OverlayId::new("live")));

        app.handle_surface_events(vec![SurfaceEvent::PointerReleased]);
        assert!(app.selection.is_selected(&OverlayId::new("live")));
    }

    #[test]
    fn test_failed_drag_shows_one_error() {
        let mut app = app_with(AppConfig::default(), Box::new(OfflineStore::new(seeded_store())));

        press(&mut app);
        for step in 0..40 {
            move_to(&mut app, 200.0 + step as f32 * 5.0, 100.0);
        }
        app.handle_surface_events(vec![SurfaceEvent::PointerReleased]);
        settle(&mut app);

        assert_eq!(app.usage.position_updates, 40);
        assert_eq!(app.usage.store_failures, 1);
        assert_eq!(app.toasts.count(ToastKind::Error), 1);
        // Resynced to the stored position
        assert!((position(&app).x - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_creates_in_flight_count_toward_limit() {
        let mut app = app(true);
        app.config.max_overlays = 2;

        for content in ["first", "second"] {
            app.handle_form_action(FormAction::Save {
                editing: None,
                draft: NewOverlay {
                    content: content.to_string(),
                    ..Default::default()
                },
            });
        }
        assert_eq!(app.cache.pending_creates(), 1);
        assert_eq!(app.toasts.count(ToastKind::Warning), 1);

        settle(&mut app);
        assert_eq!(app.cache.overlays().len(), 2);
    }

    #[test]
    fn test_import_leaves_room_for_creates_in_flight() {
        let mut app = app(true);
        app.config.max_overlays = 3;
        app.cache.create(NewOverlay {
            content: "pending".to_string(),
            ..Default::default()
        });

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        let imported: Vec<Overlay> = (0..3)
            .map(|i| {
                NewOverlay {
                    content: format!("imported {}", i),
                    ..Default::default()
                }
                .into_overlay(OverlayId::new(format!("i{}", i)), chrono::Utc::now())
            })
            .collect();
        crate::io::serialization::export(
            &SceneConfig::new("rtsp://cam.local/other".to_string(), imported),
            &path,
        )
        .unwrap();

        app.import_scene(path);
        settle(&mut app);

        assert_eq!(app.cache.overlays().len(), 3);
        assert_eq!(app.toasts.count(ToastKind::Warning), 1);
        assert_eq!(app.current_stream_url(), "rtsp://cam.local/other");
    }

    /// Memory store that also reports service-wide totals.
    struct ReportingStore(MemoryStore);

    impl OverlayStore for ReportingStore {
        fn list(&mut self, query: &OverlayQuery) -> Result<OverlayPage, StoreError> {
            self.0.list(query)
        }

        fn get(&mut self, id: &OverlayId) -> Result<Overlay, StoreError> {
            self.0.get(id)
        }

        fn create(&mut self, overlay: NewOverlay) -> Result<Overlay, StoreError> {
            self.0.create(overlay)
        }

        fn update(&mut self, id: &OverlayId, patch: &OverlayPatch) -> Result<Overlay, StoreError> {
            self.0.update(id, patch)
        }

        fn delete(&mut self, id: &OverlayId) -> Result<(), StoreError> {
            self.0.delete(id)
        }

        fn analytics(&mut self) -> Result<Option<AnalyticsSummary>, StoreError> {
            Ok(Some(AnalyticsSummary {
                total_overlays: 40,
                active_overlays: 31,
                total_streams: 12,
                active_streams: 3,
            }))
        }
    }

    #[test]
    fn test_opening_analytics_uses_service_totals() {
        let mut app = app_with(AppConfig::default(), Box::new(ReportingStore(seeded_store())));
        assert!(app.service_summary.is_none());

        app.handle_toolbar_action(ToolbarAction::ToggleAnalytics);
        assert!(app.show_analytics);
        settle(&mut app);

        assert_eq!(app.service_summary.map(|s| s.total_streams), Some(12));
    }

    #[test]
    fn test_analytics_without_service_totals_uses_session() {
        let mut app = app(true);
        app.handle_toolbar_action(ToolbarAction::ToggleAnalytics);
        settle(&mut app);

        assert!(app.service_summary.is_none());
        let (summary, source) = current_summary(
            app.service_summary,
            app.cache.overlays(),
            &app.usage,
            true,
        );
        assert_eq!(source, crate::analytics::SummarySource::Session);
        assert_eq!(summary.total_streams, 1);
        assert_eq!(summary.total_overlays, 1);
    }
}

use std::time::Instant;

use crate::{
    album::Album,
    collage::Collage,
    config::AppConfig,
    gallery::Gallery,
    history::{History, HistoryStack, PopStateEvent},
    lightbox::Lightbox,
    resize::{LoadingIndicator, ResizeLayoutController},
    sync::HistorySyncController,
    thumbnail::ThumbnailLoader,
};

/// Horizontal space the central panel and scroll bar take from the window.
const CONTENT_MARGIN: f32 = 28.0;

#[derive(Debug)]
struct Spinner {
    visible: bool,
}

impl LoadingIndicator for Spinner {
    fn hide(&mut self) {
        self.visible = false;
    }
}

pub struct CollageApp {
    album: Album,
    thumbs: ThumbnailLoader,
    collage: Collage,
    lightbox: Lightbox,
    spinner: Spinner,
    history: HistoryStack,
    sync: HistorySyncController,
    resize: ResizeLayoutController,
    loaded: bool,
    address: String,
    shown_title: String,
    config: AppConfig,
}

impl CollageApp {
    /// `initial_width` is the inner width the window was opened with. egui
    /// reports a placeholder screen rect until the first frame.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        album: Album,
        start_path: String,
        initial_width: u32,
    ) -> Self {
        let mut app = Self::from_parts(config, album, start_path, initial_width);
        app.thumbs.start(
            app.album.photos.iter().map(|p| p.path.clone()).collect(),
            app.album.dir.join(".thumbnails"),
            &cc.egui_ctx,
        );
        app
    }

    /// Everything except the thumbnail workers, which need the egui context.
    fn from_parts(config: AppConfig, album: Album, start_path: String, viewport_width: u32) -> Self {
        let history = HistoryStack::new(&start_path, &album.title);
        let sync = HistorySyncController::new(history.location(), &album.title);
        let resize = ResizeLayoutController::new(
            viewport_width,
            config.resize_debounce(),
            config.layout_params(),
        );

        Self {
            collage: Collage::new(album.len()),
            lightbox: Lightbox::new(album.photos.clone(), config.counter_template()),
            spinner: Spinner { visible: true },
            thumbs: ThumbnailLoader::new(),
            history,
            sync,
            resize,
            loaded: false,
            address: start_path,
            shown_title: String::new(),
            album,
            config,
        }
    }

    /// Runs once every thumbnail has settled, like a page's `load` event.
    fn on_album_loaded(&mut self) {
        self.loaded = true;
        let history = &self.history;
        let sync = &self.sync;
        let lightbox = &mut self.lightbox;
        self.resize.initial_layout(&mut self.collage, &mut self.spinner, || {
            sync.initialize_from_current_location(history.location(), lightbox);
        });
    }

    fn on_pop_state(&mut self, event: Option<PopStateEvent>) {
        let Some(event) = event else {
            return;
        };
        self.sync
            .on_pop_state(&event, self.history.location(), &mut self.lightbox);
    }

    /// Typing a path in the address bar loads the page fresh.
    fn load_location(&mut self, path: String) {
        tracing::info!(path = %path, "loading location");
        self.history.reload(&path, &self.album.title);
        self.sync.reload(&path);
        if self.loaded {
            self.sync
                .initialize_from_current_location(self.history.location(), &mut self.lightbox);
        }
    }

    fn dispatch_gallery_events(&mut self) {
        for event in self.lightbox.take_events() {
            self.sync.dispatch(event, &mut self.history);
        }
    }

    /// Leaves the popup for the collage, recording the base path.
    fn show_all_photos(&mut self) {
        self.lightbox.close();
        self.dispatch_gallery_events();
    }

    fn show_nav(&mut self, ctx: &egui::Context) {
        let mut pop: Option<Option<PopStateEvent>> = None;
        let mut submitted: Option<String> = None;
        let mut all_photos = false;

        let (alt_left, alt_right) = ctx.input(|i| {
            (
                i.modifiers.alt && i.key_pressed(egui::Key::ArrowLeft),
                i.modifiers.alt && i.key_pressed(egui::Key::ArrowRight),
            )
        });
        if alt_left {
            pop = Some(self.history.back());
        } else if alt_right {
            pop = Some(self.history.forward());
        }

        egui::TopBottomPanel::top("address_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(self.history.can_go_back(), egui::Button::new("◀"))
                    .on_hover_text("Back")
                    .clicked()
                {
                    pop = Some(self.history.back());
                }
                if ui
                    .add_enabled(self.history.can_go_forward(), egui::Button::new("▶"))
                    .on_hover_text("Forward")
                    .clicked()
                {
                    pop = Some(self.history.forward());
                }
                if ui
                    .add_enabled(self.sync.is_gallery_open(), egui::Button::new("⊞"))
                    .on_hover_text(format!("All photos ({})", self.sync.base_path()))
                    .clicked()
                {
                    all_photos = true;
                }
                let resp = ui.add(
                    egui::TextEdit::singleline(&mut self.address)
                        .desired_width(ui.available_width())
                        .font(egui::TextStyle::Monospace),
                );
                if resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submitted = Some(self.address.trim().to_string());
                } else if !resp.has_focus() && self.address != self.history.location() {
                    self.address = self.history.location().to_string();
                }
            });
        });

        if let Some(event) = pop {
            self.on_pop_state(event);
        }
        if all_photos {
            self.show_all_photos();
        }
        if let Some(path) = submitted.filter(|p| !p.is_empty()) {
            self.load_location(path);
        }
    }

    fn sync_window_title(&mut self, ctx: &egui::Context) {
        if self.shown_title != self.history.title() {
            self.shown_title = self.history.title().to_string();
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(self.shown_title.clone()));
        }
    }
}

fn viewport_width(ctx: &egui::Context) -> u32 {
    ctx.screen_rect().width().round().max(0.0) as u32
}

impl eframe::App for CollageApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let viewport_rect = ctx.input(|i| i.viewport().inner_rect);

        // Track window size for saving on exit
        if let Some(rect) = viewport_rect {
            self.config.window_width = Some(rect.width());
            self.config.window_height = Some(rect.height());
        }

        self.thumbs.drain(ctx);
        self.resize
            .on_resize(viewport_width(ctx), now, &mut self.collage);
        self.collage
            .set_container_width(self.resize.viewport_width() as f32 - CONTENT_MARGIN);
        if !self.loaded && self.thumbs.all_settled() {
            self.on_album_loaded();
        }
        self.resize.poll(now, &mut self.collage);
        if let Some(remaining) = self.resize.time_until_relayout(now) {
            ctx.request_repaint_after(remaining);
        }

        self.show_nav(ctx);
        self.dispatch_gallery_events();

        let mut clicked = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.spinner.visible {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.spinner();
                        ui.label(format!(
                            "Loading {}/{}",
                            self.thumbs.settled(),
                            self.thumbs.len()
                        ));
                    });
                });
                return;
            }
            if self.lightbox.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label("No photos in this album");
                });
                return;
            }
            ui.heading(&self.album.title);
            if let Some(desc) = &self.album.desc {
                ui.label(egui::RichText::new(desc).weak());
            }
            ui.add_space(8.0);
            clicked = self.collage.show(ui, &self.album.photos, &self.thumbs);
        });
        if let Some(index) = clicked {
            self.lightbox.open_at(index);
        }

        self.lightbox.show(ctx);
        self.dispatch_gallery_events();
        self.sync_window_title(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.config.album_dir = Some(self.album.dir.clone());
        self.config.save();
    }
}

use std::collections::HashMap;
use std::sync::mpsc;

use image::RgbaImage;

use crate::album::Photo;
use crate::gallery::{Gallery, GalleryCursor, GalleryEvent};

const BACKDROP_ALPHA: u8 = 220;
const CAPTION_BAND: f32 = 56.0;
const ARROW_SIZE: egui::Vec2 = egui::vec2(44.0, 64.0);

/// Substitutes `%curr%` (1-based) and `%total%` in a counter template.
pub fn format_counter(template: &str, current: usize, total: usize) -> String {
    template
        .replace("%curr%", &current.to_string())
        .replace("%total%", &total.to_string())
}

enum PreviewState {
    Loading,
    Ready(egui::TextureHandle),
    Failed,
}

struct PreviewResult {
    index: usize,
    rgba: Option<RgbaImage>,
}

/// Full-window photo popup over the collage.
pub struct Lightbox {
    cursor: GalleryCursor,
    photos: Vec<Photo>,
    counter_template: String,
    previews: HashMap<usize, PreviewState>,
    tx: mpsc::Sender<PreviewResult>,
    rx: mpsc::Receiver<PreviewResult>,
}

impl Lightbox {
    pub fn new(photos: Vec<Photo>, counter_template: &str) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            cursor: GalleryCursor::new(photos.len()),
            photos,
            counter_template: counter_template.to_string(),
            previews: HashMap::new(),
            tx,
            rx,
        }
    }

    /// Opens on a photo clicked in the collage.
    pub fn open_at(&mut self, index: usize) {
        self.cursor.open_at(index);
    }

    pub fn take_events(&mut self) -> Vec<GalleryEvent> {
        self.cursor.take_events()
    }

    fn request_preview(&mut self, index: usize, ctx: &egui::Context) {
        if self.previews.contains_key(&index) {
            return;
        }
        let Some(photo) = self.photos.get(index) else {
            return;
        };
        self.previews.insert(index, PreviewState::Loading);
        let path = photo.path.clone();
        let tx = self.tx.clone();
        let ctx2 = ctx.clone();
        rayon::spawn(move || {
            let rgba = match crate::thumbnail::load_preview(&path) {
                Ok(img) => Some(img),
                Err(err) => {
                    tracing::warn!(path = %path.display(), "preview failed: {:#}", err);
                    None
                }
            };
            let _ = tx.send(PreviewResult { index, rgba });
            ctx2.request_repaint();
        });
    }

    fn drain(&mut self, ctx: &egui::Context) {
        while let Ok(PreviewResult { index, rgba }) = self.rx.try_recv() {
            let state = match rgba {
                Some(img) => {
                    let size = [img.width() as usize, img.height() as usize];
                    let color = egui::ColorImage::from_rgba_unmultiplied(size, img.as_raw());
                    PreviewState::Ready(ctx.load_texture(
                        format!("preview_{}", index),
                        color,
                        egui::TextureOptions::LINEAR,
                    ))
                }
                None => PreviewState::Failed,
            };
            self.previews.insert(index, state);
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let (left, right, escape) = ctx.input(|i| {
            let plain = !i.modifiers.alt && !i.modifiers.command;
            (
                plain && i.key_pressed(egui::Key::ArrowLeft),
                plain && i.key_pressed(egui::Key::ArrowRight),
                i.key_pressed(egui::Key::Escape),
            )
        });
        if escape {
            self.cursor.close();
        } else if left {
            self.cursor.prev();
        } else if right {
            self.cursor.next();
        }
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        self.drain(ctx);
        if !self.cursor.is_open() {
            return;
        }
        self.handle_keys(ctx);
        if !self.cursor.is_open() {
            return;
        }

        let len = self.cursor.len();
        let index = self.cursor.current_index();
        // Current photo plus one on each side.
        for i in [index, (index + 1) % len, (index + len - 1) % len] {
            self.request_preview(i, ctx);
        }

        let screen = ctx.screen_rect();
        let mut close = false;
        let mut step: Option<bool> = None;
        let mut open_source = false;

        egui::Area::new(egui::Id::new("lightbox"))
            .order(egui::Order::Foreground)
            .fixed_pos(screen.min)
            .show(ctx, |ui| {
                let backdrop = ui.allocate_rect(screen, egui::Sense::click());
                ui.painter()
                    .rect_filled(screen, 0.0, egui::Color32::from_black_alpha(BACKDROP_ALPHA));

                let stage = egui::Rect::from_min_max(
                    screen.min + egui::vec2(ARROW_SIZE.x + 16.0, 24.0),
                    screen.max - egui::vec2(ARROW_SIZE.x + 16.0, CAPTION_BAND + 8.0),
                );
                let image_rect = match self.previews.get(&index) {
                    Some(PreviewState::Ready(tex)) => {
                        let tex_size = tex.size_vec2();
                        let scale = (stage.width() / tex_size.x)
                            .min(stage.height() / tex_size.y)
                            .min(1.0);
                        let rect = egui::Rect::from_center_size(stage.center(), tex_size * scale);
                        ui.painter().image(
                            tex.id(),
                            rect,
                            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                            egui::Color32::WHITE,
                        );
                        rect
                    }
                    Some(PreviewState::Failed) => {
                        ui.painter().text(
                            stage.center(),
                            egui::Align2::CENTER_CENTER,
                            "⚠ Could not open image",
                            egui::FontId::proportional(16.0),
                            egui::Color32::LIGHT_GRAY,
                        );
                        egui::Rect::from_center_size(stage.center(), egui::vec2(240.0, 40.0))
                    }
                    _ => {
                        let rect = egui::Rect::from_center_size(stage.center(), egui::vec2(40.0, 40.0));
                        ui.put(rect, egui::Spinner::new().size(32.0));
                        rect
                    }
                };
                // Clicks on the photo itself keep the popup open.
                ui.interact(image_rect, egui::Id::new("lightbox_image"), egui::Sense::click());

                let arrow_y = screen.center().y - ARROW_SIZE.y * 0.5;
                let prev_rect = egui::Rect::from_min_size(
                    egui::pos2(screen.min.x + 8.0, arrow_y),
                    ARROW_SIZE,
                );
                let next_rect = egui::Rect::from_min_size(
                    egui::pos2(screen.max.x - 8.0 - ARROW_SIZE.x, arrow_y),
                    ARROW_SIZE,
                );
                if ui.put(prev_rect, egui::Button::new("◀")).clicked() {
                    step = Some(false);
                }
                if ui.put(next_rect, egui::Button::new("▶")).clicked() {
                    step = Some(true);
                }
                let close_rect = egui::Rect::from_min_size(
                    egui::pos2(screen.max.x - 40.0, screen.min.y + 8.0),
                    egui::vec2(32.0, 32.0),
                );
                if ui.put(close_rect, egui::Button::new("✕")).clicked() {
                    close = true;
                }

                let band = egui::Rect::from_min_max(
                    egui::pos2(stage.min.x, screen.max.y - CAPTION_BAND),
                    egui::pos2(stage.max.x, screen.max.y - 8.0),
                );
                ui.allocate_new_ui(egui::UiBuilder::new().max_rect(band), |ui| {
                    ui.horizontal(|ui| {
                        if let Some(photo) = self.photos.get(index) {
                            ui.label(egui::RichText::new(&photo.title).color(egui::Color32::WHITE).strong());
                            ui.label(egui::RichText::new("·").weak());
                            if ui.link("full size").on_hover_text("Open the original file").clicked() {
                                open_source = true;
                            }
                        }
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            ui.label(
                                egui::RichText::new(format_counter(&self.counter_template, index + 1, len))
                                    .color(egui::Color32::LIGHT_GRAY),
                            );
                        });
                    });
                    if let Some(desc) = self.photos.get(index).and_then(|p| p.desc.as_deref()) {
                        ui.label(egui::RichText::new(desc).color(egui::Color32::LIGHT_GRAY));
                    }
                });

                if backdrop.clicked() {
                    close = true;
                }
            });

        if open_source {
            if let Some(photo) = self.photos.get(index) {
                if let Err(err) = open::that(&photo.path) {
                    tracing::warn!(path = %photo.path.display(), %err, "could not open original");
                }
            }
        }
        match (close, step) {
            (true, _) => self.cursor.close(),
            (false, Some(true)) => self.cursor.next(),
            (false, Some(false)) => self.cursor.prev(),
            (false, None) => {}
        }
    }
}

impl Gallery for Lightbox {
    fn open(&mut self) {
        self.cursor.open();
    }

    fn go_to(&mut self, index: usize) {
        self.cursor.go_to(index);
    }

    fn close(&mut self) {
        self.cursor.close();
    }

    fn is_open(&self) -> bool {
        self.cursor.is_open()
    }

    fn current_index(&self) -> usize {
        self.cursor.current_index()
    }

    fn len(&self) -> usize {
        self.cursor.len()
    }
}

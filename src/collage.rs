use std::time::{Duration, Instant};

use crate::album::Photo;
use crate::resize::{CollageLayout, LayoutParams};
use crate::thumbnail::{ThumbState, ThumbnailLoader};

const SPACING: f32 = 8.0;
const CAPTION_HEIGHT: f32 = 22.0;

/// Cell rectangles, relative to the collage's top-left corner.
///
/// Cells are squares of `target_row_height` (narrower if the container is),
/// packed left to right. Without `allow_partial_last_row` an incomplete
/// last row is stretched to the container width.
pub fn grid_placements(count: usize, width: f32, params: &LayoutParams) -> Vec<egui::Rect> {
    if count == 0 || width <= 0.0 {
        return Vec::new();
    }
    let side = params.target_row_height.min(width);
    let cols = (((width + SPACING) / (side + SPACING)) as usize).max(1);
    let last_row_len = count % cols;
    let last_row_start = count - last_row_len;

    (0..count)
        .map(|i| {
            let row = i / cols;
            let col = i % cols;
            let cell_w = if !params.allow_partial_last_row && last_row_len > 0 && i >= last_row_start {
                (width - SPACING * (last_row_len - 1) as f32) / last_row_len as f32
            } else {
                side
            };
            let min = egui::pos2(col as f32 * (cell_w + SPACING), row as f32 * (side + SPACING));
            egui::Rect::from_min_size(min, egui::vec2(cell_w, side))
        })
        .collect()
}

/// Album thumbnails laid out in rows, fading in after each layout.
pub struct Collage {
    count: usize,
    container_width: f32,
    placements: Vec<egui::Rect>,
    hidden: bool,
    fade: Duration,
    laid_out_at: Option<Instant>,
}

impl Collage {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            container_width: 0.0,
            placements: Vec::new(),
            hidden: true,
            fade: Duration::ZERO,
            laid_out_at: None,
        }
    }

    pub fn set_container_width(&mut self, width: f32) {
        self.container_width = width.max(0.0);
    }

    /// Item opacity at `now`, 0 while hidden.
    pub fn opacity(&self, now: Instant) -> f32 {
        if self.hidden {
            return 0.0;
        }
        let Some(at) = self.laid_out_at else {
            return 0.0;
        };
        if self.fade.is_zero() {
            return 1.0;
        }
        (now.saturating_duration_since(at).as_secs_f32() / self.fade.as_secs_f32()).min(1.0)
    }

    fn content_height(&self) -> f32 {
        self.placements
            .iter()
            .map(|r| r.max.y)
            .fold(0.0, f32::max)
    }

    /// Draws the collage. Returns the index of a clicked photo.
    pub fn show(&mut self, ui: &mut egui::Ui, photos: &[Photo], thumbs: &ThumbnailLoader) -> Option<usize> {
        self.set_container_width(ui.available_width());
        let now = Instant::now();
        let opacity = self.opacity(now);
        if opacity > 0.0 && opacity < 1.0 {
            ui.ctx().request_repaint();
        }

        let mut clicked = None;
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let size = egui::vec2(ui.available_width(), self.content_height());
                let (area, _) = ui.allocate_exact_size(size, egui::Sense::hover());
                for (i, cell) in self.placements.iter().enumerate() {
                    let rect = cell.translate(area.min.to_vec2());
                    let resp = ui.interact(rect, ui.id().with(("collage_item", i)), egui::Sense::click());
                    let title = photos.get(i).map(|p| p.title.as_str()).unwrap_or_default();
                    draw_item(ui, rect, thumbs.get(i), title, opacity, resp.hovered());
                    if resp.clicked() && opacity > 0.0 {
                        clicked = Some(i);
                    }
                }
            });
        clicked
    }
}

impl CollageLayout for Collage {
    fn layout(&mut self, params: LayoutParams) {
        self.placements = grid_placements(self.count, self.container_width, &params);
        self.hidden = false;
        self.fade = Duration::from_millis(params.fade_speed_ms);
        self.laid_out_at = Some(Instant::now());
        tracing::debug!(width = self.container_width, items = self.count, "collage laid out");
    }

    fn hide_items(&mut self) {
        self.hidden = true;
    }
}

fn draw_item(
    ui: &egui::Ui,
    rect: egui::Rect,
    thumb: Option<&ThumbState>,
    title: &str,
    opacity: f32,
    hovered: bool,
) {
    if opacity <= 0.0 {
        return;
    }
    let painter = ui.painter_at(rect);
    match thumb {
        Some(ThumbState::Ready(tex)) => {
            // Cover the cell, cropping the overflowing axis.
            let tex_size = tex.size_vec2();
            let scale = (rect.width() / tex_size.x).max(rect.height() / tex_size.y);
            let shown = egui::vec2(rect.width(), rect.height()) / (tex_size * scale);
            let uv_min = egui::pos2((1.0 - shown.x) * 0.5, (1.0 - shown.y) * 0.5);
            let uv = egui::Rect::from_min_size(uv_min, shown);
            painter.image(tex.id(), rect, uv, egui::Color32::WHITE.gamma_multiply(opacity));
        }
        Some(ThumbState::Failed) => {
            painter.rect_filled(rect, 0.0, egui::Color32::from_gray(40).gamma_multiply(opacity));
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "⚠",
                egui::FontId::proportional(22.0),
                egui::Color32::GRAY.gamma_multiply(opacity),
            );
        }
        _ => {
            painter.rect_filled(rect, 0.0, egui::Color32::from_gray(40).gamma_multiply(opacity));
        }
    }

    if hovered {
        let band = egui::Rect::from_min_max(
            egui::pos2(rect.min.x, rect.max.y - CAPTION_HEIGHT),
            rect.max,
        );
        painter.rect_filled(band, 0.0, egui::Color32::from_black_alpha(160));
        painter.text(
            band.left_center() + egui::vec2(6.0, 0.0),
            egui::Align2::LEFT_CENTER,
            title,
            egui::FontId::proportional(12.0),
            egui::Color32::WHITE,
        );
    }
}

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use anyhow::Context;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, RgbaImage};

pub const THUMB_SIZE: u32 = 450;
/// Downscale popup images to this longest-edge size.
pub const PREVIEW_MAX: u32 = 1920;

static SUPPORTED_IMAGE_EXTS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Returns `true` if the path has a supported image extension.
pub fn is_supported_image(path: &Path) -> bool {
    let Some(ext) = path.extension().map(|e| e.to_string_lossy()) else {
        return false;
    };
    SUPPORTED_IMAGE_EXTS
        .iter()
        .any(|known| ext.eq_ignore_ascii_case(known))
}

/// Returns the cached thumbnail path for a given source image.
pub fn cache_path(source: &Path, cache_dir: &Path) -> PathBuf {
    let stem = source.file_name().unwrap_or_default().to_string_lossy();
    cache_dir.join(format!("{}.webp", stem))
}

/// Decodes `path` and applies its EXIF orientation, so portrait shots taken
/// with a rotated camera come out upright.
pub fn open_image(path: &Path) -> anyhow::Result<DynamicImage> {
    decode_upright(path).with_context(|| format!("decoding {}", path.display()))
}

fn decode_upright(path: &Path) -> image::ImageResult<DynamicImage> {
    let mut decoder = image::ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Loads the thumbnail from the cache, generating and caching it on a miss.
pub fn load_thumbnail(source: &Path, cache_dir: &Path) -> anyhow::Result<RgbaImage> {
    let cached = cache_path(source, cache_dir);
    if cached.exists() {
        match image::open(&cached) {
            Ok(img) => return Ok(img.to_rgba8()),
            Err(err) => tracing::warn!(path = %cached.display(), %err, "regenerating bad cache entry"),
        }
    }

    let thumb = open_image(source)?.thumbnail(THUMB_SIZE, THUMB_SIZE);
    if let Err(err) = std::fs::create_dir_all(cache_dir) {
        tracing::warn!(path = %cache_dir.display(), %err, "could not create thumbnail cache");
    } else if let Err(err) = thumb.save(&cached) {
        tracing::warn!(path = %cached.display(), %err, "could not cache thumbnail");
    }
    Ok(thumb.to_rgba8())
}

/// Opens a photo for the popup, downscaled to [`PREVIEW_MAX`].
pub fn load_preview(path: &Path) -> anyhow::Result<RgbaImage> {
    let img = open_image(path)?;
    let img = if img.width() > PREVIEW_MAX || img.height() > PREVIEW_MAX {
        img.thumbnail(PREVIEW_MAX, PREVIEW_MAX)
    } else {
        img
    };
    Ok(img.to_rgba8())
}

pub enum ThumbState {
    Loading,
    Ready(egui::TextureHandle),
    Failed,
}

struct ThumbResult {
    index: usize,
    rgba: Option<RgbaImage>,
}

/// Decodes album thumbnails on the rayon pool and uploads them as textures.
pub struct ThumbnailLoader {
    thumbs: Vec<ThumbState>,
    tx: mpsc::Sender<ThumbResult>,
    rx: mpsc::Receiver<ThumbResult>,
}

impl ThumbnailLoader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            thumbs: Vec::new(),
            tx,
            rx,
        }
    }

    /// Queues every photo of the album. Each result triggers a repaint.
    pub fn start(&mut self, sources: Vec<PathBuf>, cache_dir: PathBuf, ctx: &egui::Context) {
        self.thumbs = sources.iter().map(|_| ThumbState::Loading).collect();
        for (index, path) in sources.into_iter().enumerate() {
            let tx = self.tx.clone();
            let ctx2 = ctx.clone();
            let cache_dir = cache_dir.clone();
            rayon::spawn(move || {
                let rgba = match load_thumbnail(&path, &cache_dir) {
                    Ok(img) => Some(img),
                    Err(err) => {
                        tracing::warn!(path = %path.display(), "thumbnail failed: {:#}", err);
                        None
                    }
                };
                let _ = tx.send(ThumbResult { index, rgba });
                ctx2.request_repaint();
            });
        }
    }

    pub fn drain(&mut self, ctx: &egui::Context) {
        while let Ok(ThumbResult { index, rgba }) = self.rx.try_recv() {
            let Some(slot) = self.thumbs.get_mut(index) else {
                continue;
            };
            *slot = match rgba {
                Some(img) => {
                    let size = [img.width() as usize, img.height() as usize];
                    let color = egui::ColorImage::from_rgba_unmultiplied(size, img.as_raw());
                    ThumbState::Ready(ctx.load_texture(
                        format!("thumb_{}", index),
                        color,
                        egui::TextureOptions::LINEAR,
                    ))
                }
                None => ThumbState::Failed,
            };
        }
    }

    pub fn get(&self, index: usize) -> Option<&ThumbState> {
        self.thumbs.get(index)
    }

    /// Number of thumbnails that are no longer loading.
    pub fn settled(&self) -> usize {
        self.thumbs
            .iter()
            .filter(|t| !matches!(t, ThumbState::Loading))
            .count()
    }

    pub fn len(&self) -> usize {
        self.thumbs.len()
    }

    /// Every photo has either a texture or a failed decode.
    pub fn all_settled(&self) -> bool {
        self.settled() == self.thumbs.len()
    }
}

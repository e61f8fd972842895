mod album;
mod app;
mod collage;
mod config;
mod gallery;
mod history;
mod lightbox;
mod resize;
mod route;
mod sync;
mod thumbnail;

use std::path::PathBuf;

use album::Album;
use app::CollageApp;
use config::AppConfig;

const ALBUM_DIR_ENV: &str = "COLLAGE_ALBUM_DIR";
const START_PATH_ENV: &str = "COLLAGE_START_PATH";

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn resolve_album_dir(env: Option<String>, config: &AppConfig) -> PathBuf {
    if let Some(raw) = non_empty(env) {
        return PathBuf::from(raw);
    }
    if let Some(dir) = config.album_dir.clone() {
        return dir;
    }
    dirs::picture_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn resolve_start_path(env: Option<String>, config: &AppConfig) -> String {
    non_empty(env)
        .or_else(|| non_empty(config.start_path.clone()))
        .unwrap_or_else(|| config.base_path().to_string())
}

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = AppConfig::load();
    let album_dir = resolve_album_dir(std::env::var(ALBUM_DIR_ENV).ok(), &config);
    let start_path = resolve_start_path(std::env::var(START_PATH_ENV).ok(), &config);

    let album = match Album::scan(&album_dir) {
        Ok(album) => album,
        Err(err) => {
            eprintln!("collage: {:#}", err);
            std::process::exit(2);
        }
    };
    tracing::info!(album = %album.title, start_path = %start_path, "starting");

    let width = config.window_width.unwrap_or(1200.0);
    let height = config.window_height.unwrap_or(800.0);
    let initial_width = width.round().max(0.0) as u32;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(&album.title)
            .with_app_id("collage")
            .with_inner_size([width, height]),
        ..Default::default()
    };

    eframe::run_native(
        "collage",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(CollageApp::new(
                cc,
                config,
                album,
                start_path,
                initial_width,
            )))
        }),
    )
}

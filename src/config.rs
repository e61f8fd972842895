use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::resize::LayoutParams;

pub const DEFAULT_BASE_PATH: &str = "/gallery/";
pub const DEFAULT_COUNTER_TEMPLATE: &str = "%curr% of %total%";

#[derive(Debug, Default, Serialize, Deserialize)]
/// Persisted settings for the collage viewer.
pub struct AppConfig {
    pub window_width: Option<f32>,
    pub window_height: Option<f32>,
    pub album_dir: Option<PathBuf>,
    /// Gallery page path, photos live under `<base_path>photo/<n>`.
    pub base_path: Option<String>,
    /// Address-bar path opened at startup; may be a photo deep link.
    pub start_path: Option<String>,
    pub target_row_height: Option<f32>,
    pub allow_partial_last_row: Option<bool>,
    pub fade_speed_ms: Option<u64>,
    pub resize_debounce_ms: Option<u64>,
    /// Lightbox counter, `%curr%` and `%total%` are substituted.
    pub counter_template: Option<String>,
}

impl AppConfig {
    /// Returns the user config file path, if a config directory is available.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("collage").join("config.toml"))
    }

    /// Loads config from disk, falling back to defaults on any error.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "ignoring malformed config");
                Self::default()
            }
        }
    }

    /// Writes config to disk, ignoring filesystem/serialization errors.
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(s) = toml::to_string_pretty(self) {
            let _ = std::fs::write(&path, s);
        }
    }

    pub fn layout_params(&self) -> LayoutParams {
        let defaults = LayoutParams::default();
        LayoutParams {
            target_row_height: self
                .target_row_height
                .filter(|h| *h > 0.0)
                .unwrap_or(defaults.target_row_height),
            allow_partial_last_row: self
                .allow_partial_last_row
                .unwrap_or(defaults.allow_partial_last_row),
            fade_speed_ms: self.fade_speed_ms.unwrap_or(defaults.fade_speed_ms),
        }
    }

    pub fn resize_debounce(&self) -> Duration {
        self.resize_debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(crate::resize::RESIZE_DEBOUNCE)
    }

    pub fn base_path(&self) -> &str {
        self.base_path.as_deref().unwrap_or(DEFAULT_BASE_PATH)
    }

    pub fn counter_template(&self) -> &str {
        self.counter_template
            .as_deref()
            .unwrap_or(DEFAULT_COUNTER_TEMPLATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_reference_layout() {
        let config: AppConfig = toml::from_str("").expect("empty toml parses");
        assert_eq!(config.layout_params(), LayoutParams::default());
        assert_eq!(config.resize_debounce(), Duration::from_millis(200));
        assert_eq!(config.base_path(), "/gallery/");
        assert_eq!(config.counter_template(), "%curr% of %total%");
    }

    #[test]
    fn layout_fields_override_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            target_row_height = 180.0
            allow_partial_last_row = false
            fade_speed_ms = 0
            resize_debounce_ms = 50
            counter_template = "%curr% sur %total%"
            "#,
        )
        .expect("config parses");
        let params = config.layout_params();
        assert_eq!(params.target_row_height, 180.0);
        assert!(!params.allow_partial_last_row);
        assert_eq!(params.fade_speed_ms, 0);
        assert_eq!(config.resize_debounce(), Duration::from_millis(50));
        assert_eq!(config.counter_template(), "%curr% sur %total%");
    }

    #[test]
    fn non_positive_row_height_is_ignored() {
        let config = AppConfig {
            target_row_height: Some(0.0),
            ..Default::default()
        };
        assert_eq!(config.layout_params().target_row_height, 290.0);
    }
}

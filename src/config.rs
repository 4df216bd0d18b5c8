use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Shortest accepted image timeout
const MIN_IMAGE_TIMEOUT_SECS: u64 = 1;

/// Overrides `catalog_url` when set
pub const CATALOG_URL_ENV: &str = "ALBUM_VIEWER_CATALOG_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),
}

/// User settings, stored as JSON next to the other per-user config files
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Endpoint serving the photo catalog
    pub catalog_url: String,
    /// Per-image download timeout in seconds
    pub image_timeout_secs: u64,
    /// Distance between two entries, also the camera step
    pub spacing_unit: f32,
    pub camera_pan_speed: f32,
    /// Entries drawn on each side of the camera
    pub visible_radius: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_url: "https://jsonplaceholder.typicode.com/photos".to_string(),
            image_timeout_secs: 30,
            spacing_unit: 2.0,
            camera_pan_speed: 10.0,
            visible_radius: 2,
        }
    }
}

impl Config {
    /// Load the config from the user config directory.
    ///
    /// Never fails: a missing or broken file yields the defaults.
    pub fn load() -> Self {
        let path = Self::get_config_path();
        let mut config = match Self::load_from(&path) {
            Ok(Some(config)) => {
                log::info!("📁 Config loaded from {}", path.display());
                config
            }
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("⚠️  Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        };

        if let Ok(url) = std::env::var(CATALOG_URL_ENV) {
            config.catalog_url = url;
        }
        config.validated()
    }

    /// Replace values that would make the app unusable
    fn validated(mut self) -> Self {
        if self.image_timeout_secs < MIN_IMAGE_TIMEOUT_SECS {
            let fallback = Self::default().image_timeout_secs;
            log::warn!(
                "⚠️  image_timeout_secs = {} would fail every download, using {}",
                self.image_timeout_secs,
                fallback
            );
            self.image_timeout_secs = fallback;
        }
        self
    }

    /// Read a config file, `None` when it does not exist
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Get the path where the config file is expected
    /// - Linux: ~/.config/album-viewer/config.json
    /// - macOS: ~/Library/Application Support/album-viewer/config.json
    /// - Windows: %APPDATA%\album-viewer\config.json
    fn get_config_path() -> PathBuf {
        let mut path = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_default();

        path.push("album-viewer");
        path.push("config.json");
        path
    }

    /// Per-image download timeout, never shorter than one second
    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs.max(MIN_IMAGE_TIMEOUT_SECS))
    }
}

//! Settings persistence
//!
//! Settings live in the platform config directory as TOML, managed by confy.
//! A missing or unreadable file falls back to defaults rather than stopping
//! the app.

use std::path::PathBuf;

use pricelens_types::AppConfig;
use tracing::{info, warn};

pub const APP_NAME: &str = "pricelens";

pub fn load() -> AppConfig {
    match confy::load::<AppConfig>(APP_NAME, None) {
        Ok(config) => {
            let path = config_path().map(|p| p.display().to_string());
            info!(league = %config.league, path = ?path, "Settings loaded");
            config
        }
        Err(e) => {
            warn!(error = %e, "Failed to load settings, using defaults");
            AppConfig::default()
        }
    }
}

pub fn save(config: &AppConfig) -> Result<(), confy::ConfyError> {
    confy::store(APP_NAME, None, config)
}

pub fn config_path() -> Option<PathBuf> {
    confy::get_configuration_file_path(APP_NAME, None).ok()
}

/// Directory for downloaded price data
pub fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

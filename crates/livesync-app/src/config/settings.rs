//! Settings parser for .livesync/config.toml

use super::types::Settings;
use livesync_core::prelude::*;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.toml";
const LIVESYNC_DIR: &str = ".livesync";

/// Load settings from `<project>/.livesync/config.toml`.
///
/// A missing or unreadable file yields the defaults.
pub fn load_settings(project_path: &Path) -> Settings {
    let config_path = project_path.join(LIVESYNC_DIR).join(CONFIG_FILENAME);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Write the current settings back to `<project>/.livesync/config.toml`
pub fn save_settings(project_path: &Path, settings: &Settings) -> Result<()> {
    let livesync_dir = project_path.join(LIVESYNC_DIR);
    std::fs::create_dir_all(&livesync_dir)
        .map_err(|e| Error::config(format!("Failed to create .livesync dir: {}", e)))?;

    let content = toml::to_string_pretty(settings)
        .map_err(|e| Error::config(format!("Failed to serialize settings: {}", e)))?;
    std::fs::write(livesync_dir.join(CONFIG_FILENAME), content)?;
    Ok(())
}

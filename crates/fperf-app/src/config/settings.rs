//! Settings parser for .fperf/config.toml

use super::types::Settings;
use fperf_core::prelude::*;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.toml";
const FPERF_DIR: &str = ".fperf";

const DEFAULT_CONFIG: &str = r#"# Flutter Perf Configuration

[stats]
capacity = 16          # Ticks of windowed history kept per widget location
recent_window = 10     # Ticks covered by the recent-frames metric

[report]
kind = "rebuild"       # "rebuild" or "repaint"
metric = "total"       # "last-frame", "recent-frames", "current-screen", "total"
top = 10               # Number of widget locations listed
"#;

/// Path of the settings file for a project directory
pub fn config_path(project_path: &Path) -> PathBuf {
    project_path.join(FPERF_DIR).join(CONFIG_FILENAME)
}

/// Load settings from `.fperf/config.toml`
///
/// A missing or unreadable file falls back to defaults. The result is not
/// validated; call [`Settings::validate`] before building counters from it.
pub fn load_settings(project_path: &Path) -> Settings {
    let config_path = config_path(project_path);

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

/// Create `.fperf/config.toml` with commented defaults
///
/// An existing config file is left untouched. Returns the config file path.
pub fn init_config_dir(project_path: &Path) -> Result<PathBuf> {
    let fperf_dir = project_path.join(FPERF_DIR);

    if !fperf_dir.exists() {
        std::fs::create_dir_all(&fperf_dir)
            .map_err(|e| Error::config(format!("Failed to create .fperf dir: {}", e)))?;
    }

    let config_path = fperf_dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        std::fs::write(&config_path, DEFAULT_CONFIG)
            .map_err(|e| Error::config(format!("Failed to write config.toml: {}", e)))?;
        info!("Created {:?}", config_path);
    }

    Ok(config_path)
}

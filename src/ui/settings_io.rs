use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::model::settings::Settings;

fn settings_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("village_ai");
    path.push("settings.json");
    path
}

/// Loads settings from the user config dir, writing defaults on first run.
/// Never fails; problems are logged and defaults used.
pub fn load_settings() -> Settings {
    let path = settings_path();

    let settings = if path.exists() {
        load_from(&path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "ignoring unreadable settings");
            Settings::default()
        })
    } else {
        let defaults = Settings::default();
        if let Err(err) = save_to(&path, &defaults) {
            debug!(error = %err, "could not write default settings");
        }
        defaults
    };

    settings.with_env_overrides()
}

pub fn load_from(path: &Path) -> Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let settings = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(settings)
}

pub fn save_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

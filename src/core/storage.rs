use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::settings::Settings;

const SETTINGS_FILE: &str = "settings.json";

/// Resolves a leading `~/` against the home directory; other paths pass through.
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"));
    match (path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")), home) {
        (Some(rest), Some(home)) => Path::new(&home).join(rest),
        _ => PathBuf::from(path),
    }
}

pub fn data_dir(settings: &Settings) -> PathBuf {
    expand_tilde(&settings.storage.data_dir)
}

pub fn settings_path(settings: &Settings) -> PathBuf {
    data_dir(settings).join(SETTINGS_FILE)
}

fn create_parent(path: &Path) -> Result<(), String> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .map_err(|err| format!("cannot create {}: {err}", parent.display())),
        _ => Ok(()),
    }
}

fn parse_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let bytes = fs::read(path).map_err(|err| err.to_string())?;
    serde_json::from_slice(&bytes).map_err(|err| err.to_string())
}

/// Loads settings from the default data dir. On first run the defaults are
/// written there so they can be edited.
pub fn load_settings() -> Settings {
    let defaults = Settings::default();
    let path = settings_path(&defaults);
    if !path.exists() {
        if let Err(err) = save_settings(&defaults) {
            log::warn!("could not write default settings to {}: {err}", path.display());
        }
        return defaults;
    }
    load_settings_from(&path)
}

pub fn load_settings_from(path: &Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }
    match parse_json_file::<Settings>(path) {
        Ok(settings) => settings,
        Err(err) => {
            log::warn!("ignoring unreadable settings file {}: {err}", path.display());
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<(), String> {
    let path = settings_path(settings);
    create_parent(&path)?;
    let contents = serde_json::to_string_pretty(settings).map_err(|err| err.to_string())?;
    fs::write(&path, contents).map_err(|err| err.to_string())
}

pub fn export_script(path: &Path, text: &str) -> Result<PathBuf, String> {
    let trimmed = text.trim_end();
    if trimmed.is_empty() {
        return Err("Script text is empty".to_string());
    }
    let path = expand_tilde(&path.to_string_lossy());
    create_parent(&path)?;
    fs::write(&path, trimmed).map_err(|err| err.to_string())?;
    Ok(path)
}

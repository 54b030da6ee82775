use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const API_URL_ENV: &str = "SAMANVAYA_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub search: SearchSettings,
    pub clipboard: ClipboardSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Scheme, host and port of the script service, without a trailing path.
    pub origin: String,
    pub base_path: String,
    /// Script generation can take a while; the other calls share this limit.
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub video_language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardSettings {
    /// How long the "Copied!" / "Failed!" indicator stays visible.
    /// Values of 0 fall back to the default.
    pub status_clear_ms: u64,
    // Wayland sessions go through wl-copy when it is installed, arboard otherwise.
    pub prefer_wl_copy: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub data_dir: String,
}

impl ApiSettings {
    pub fn base_url(&self) -> String {
        let origin = self.origin.trim().trim_end_matches('/');
        let path = self.base_path.trim().trim_matches('/');
        if path.is_empty() {
            origin.to_string()
        } else {
            format!("{origin}/{path}")
        }
    }
}

impl Settings {
    /// Applies `SAMANVAYA_API_URL` when it is set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(origin) = std::env::var(API_URL_ENV) {
            if !origin.trim().is_empty() {
                self.api.origin = origin.trim().to_string();
            }
        }
        self
    }
}

const APP_DIR: &str = "samanvaya";

fn default_data_dir_path() -> PathBuf {
    let var = |name: &str| std::env::var_os(name).map(PathBuf::from);
    let base = if cfg!(target_os = "windows") {
        var("LOCALAPPDATA").or_else(|| var("APPDATA"))
    } else if cfg!(target_os = "macos") {
        var("HOME").map(|home| home.join("Library/Application Support"))
    } else {
        var("XDG_DATA_HOME").or_else(|| var("HOME").map(|home| home.join(".local/share")))
    };
    base.unwrap_or_else(std::env::temp_dir).join(APP_DIR)
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            origin: "http://127.0.0.1:8000".to_string(),
            base_path: "/api/v1".to_string(),
            timeout_secs: 300,
            user_agent: "samanvaya".to_string(),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            video_language: "en".to_string(),
        }
    }
}

impl Default for ClipboardSettings {
    fn default() -> Self {
        Self {
            status_clear_ms: 2000,
            prefer_wl_copy: true,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir_path().to_string_lossy().to_string(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            search: SearchSettings::default(),
            clipboard: ClipboardSettings::default(),
            storage: StorageSettings::default(),
        }
    }
}

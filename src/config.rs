//! Application configuration.
//!
//! The configuration is read from `<config dir>/winsnap/config.json`.  Every
//! section is optional; a missing file means compiled-in defaults.
//!
//! # Example
//!
//! ```json
//! {
//!   "store": { "path": "D:/layouts/profiles.json" },
//!   "windows": { "excluded_titles": ["Program Manager", "Taskbar"] },
//!   "snap": { "refresh_before_snap": true }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
///
/// A minimal `{}` file is valid and all sections fall back to their
/// defaults.  Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Where saved profiles live.
    #[serde(default)]
    pub store: StoreConfig,

    /// Which windows the backend reports.
    #[serde(default)]
    pub windows: WindowsConfig,

    /// Snap behaviour.
    #[serde(default)]
    pub snap: SnapConfig,
}

/// Location of the saved-profiles document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Override for the document path.  `None` means
    /// `<config dir>/winsnap/profiles.json`.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowsConfig {
    /// Exact window titles that are never listed (shell windows).
    pub excluded_titles: Vec<String>,
}

impl Default for WindowsConfig {
    fn default() -> Self {
        Self {
            excluded_titles: vec!["Program Manager".into(), "Taskbar".into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Re-enumerate live windows before every snap so handles of reopened
    /// windows are current.
    pub refresh_before_snap: bool,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            refresh_before_snap: true,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// The profiles document path: the configured override, or
    /// `profiles.json` inside `config_dir`.
    pub fn store_path(&self, config_dir: &Path) -> PathBuf {
        self.store
            .path
            .clone()
            .unwrap_or_else(|| config_dir.join("profiles.json"))
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

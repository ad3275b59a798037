//! Persistent settings

use std::path::PathBuf;

use anyhow::{Context, Result};
use ft857_sim::VirtualRadioConfig;
use ft857_transport::{LinkConfig, SUPPORTED_BAUD_RATES};
use serde::{Deserialize, Serialize};

/// Settings stored in the config directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Serial port used when `--port` is not given
    pub port: Option<String>,
    /// Baud rate and timeouts
    pub link: LinkConfig,
    /// Baud rates tried by `probe`
    pub probe_baud_rates: Vec<u32>,
    /// Virtual radio used with `--sim`
    pub virtual_radio: VirtualRadioConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: None,
            link: LinkConfig::default(),
            probe_baud_rates: SUPPORTED_BAUD_RATES.to_vec(),
            virtual_radio: VirtualRadioConfig::default(),
        }
    }
}

impl Settings {
    /// Get the XDG config directory for ft857ctl
    /// Uses $XDG_CONFIG_HOME/ft857ctl, falls back to ~/.config/ft857ctl
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("ft857ctl"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("ft857ctl"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from disk
    ///
    /// A missing or unreadable file yields the defaults.
    pub fn load() -> Self {
        Self::settings_path()
            .and_then(|path| std::fs::read_to_string(path).ok())
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::settings_path().context("could not determine settings path")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        std::fs::write(&path, self.to_json()?)
            .with_context(|| format!("failed to write {}", path.display()))?;

        Ok(path)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize settings")
    }
}

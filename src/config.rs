//! Aegis configuration.
//!
//! Loaded from `~/.aegis/config.toml`. Defaults apply when the file is
//! missing; an unreadable or invalid file is an error.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

/// Aegis configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Directory the gallery picker draws from.
    /// Falls back to the platform pictures directory when unset.
    pub media_dir: Option<PathBuf>,

    /// Open the composer directly, without the confirmation step.
    pub skip_confirmation: bool,
}

impl Config {
    /// Load config from `~/.aegis/config.toml`.
    pub fn load() -> Result<Self, String> {
        let path = Self::path().ok_or("could not determine home directory")?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.aegis/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".aegis").join("config.toml"))
    }

    /// The gallery directory: configured, or the platform pictures folder.
    pub fn gallery_dir(&self) -> Option<PathBuf> {
        self.media_dir.clone().or_else(dirs::picture_dir)
    }
}

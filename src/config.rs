//! Session configuration
//!
//! Defaults for a [`crate::Screen`] can be kept in `~/.ncwin/config.toml`:
//!
//! ```toml
//! # Input mode: line, cbreak, raw
//! input_mode = "cbreak"
//!
//! # Decode arrow and function keys
//! keypad = true
//!
//! # Echo typed characters
//! echo = false
//!
//! # Color pairs, registered in order as pairs 1, 2, ...
//! [[colors]]
//! fg = "red"
//! bg = "black"
//!
//! [[colors]]
//! fg = "blue"
//! bg = "black"
//! ```
//!
//! Available colors: black, red, green, yellow, blue, magenta, cyan, white.
//! At most eight pairs may be listed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attr::{Color, Colors};
use crate::error::Result;
use crate::screen::InputMode;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Screen session settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub input_mode: InputMode,
    pub keypad: bool,
    pub echo: bool,
    pub colors: Vec<PairConfig>,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            input_mode: InputMode::Cbreak,
            keypad: true,
            echo: false,
            colors: Vec::new(),
        }
    }
}

/// One color pair entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairConfig {
    pub fg: Color,
    pub bg: Color,
}

impl ScreenConfig {
    /// Load configuration from `~/.ncwin/config.toml`, or defaults.
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                match Self::from_path(&path) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("ignoring {}: {}", path.display(), e),
                }
            }
        }
        Self::default()
    }

    pub fn from_path(path: &Path) -> std::result::Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> std::result::Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Save configuration to `path`
    pub fn save(&self, path: &Path) -> std::result::Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Default config file location
    pub fn config_path() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".ncwin").join("config.toml"))
    }

    /// Build the color table, failing if more than eight pairs are listed.
    pub fn palette(&self) -> Result<Colors> {
        let mut colors = Colors::new();
        for pair in &self.colors {
            colors.add_pair(pair.fg, pair.bg)?;
        }
        Ok(colors)
    }
}

/// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

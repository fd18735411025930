//! Configuration for paperswipe
//!
//! Loaded from `<config dir>/paperswipe/config.toml`; every section and field
//! is optional and falls back to its default.
//!
//! ```toml
//! [palette]
//! colors = ["#FFE0E0", "#E0FFE0", "#E0E0FF"]
//!
//! [store]
//! database_path = "/var/lib/paperswipe/paperswipe.db"
//! timeout_ms = 2000
//!
//! [server]
//! addr = "127.0.0.1:8080"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::palette::{Palette, PaletteError, DEFAULT_PALETTE};

/// Application directory name under the platform config/data dirs.
pub const APP_DIR: &str = "paperswipe";

/// Configuration file name.
pub const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwipeConfig {
    pub palette: PaletteConfig,
    pub store: StoreConfig,
    pub server: ServerConfig,
}

/// Allocation palette
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// `#RRGGBB` colors in allocation order; the first is the default.
    pub colors: Vec<String>,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Shared store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file. Defaults to the platform data dir.
    pub database_path: Option<PathBuf>,
    /// Per-call store timeout in milliseconds; 0 disables it.
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            timeout_ms: 2000,
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    /// Configured database path, or `<data dir>/paperswipe/paperswipe.db`.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.database_path {
            return path.clone();
        }
        dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_default()
            .join("paperswipe.db")
    }
}

/// Local HTTP backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Errors from loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("TOML parse error: {0}")]
    Parse(String),

    #[error("Invalid palette: {0}")]
    Palette(#[from] PaletteError),
}

impl SwipeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard config file location, if the platform has a config dir.
    pub fn standard_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from the standard location, or defaults if no file exists.
    pub fn load_standard() -> Result<Self, ConfigError> {
        match Self::standard_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml(&content)?;
        config.validate()?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// The configured palette.
    pub fn palette(&self) -> Result<Palette, ConfigError> {
        Ok(Palette::parse(&self.palette.colors)?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.palette()?;
        Ok(())
    }
}

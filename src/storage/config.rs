//! Configuration handling for shelf
//!
//! Configuration is stored in `.shelf/config.toml` (library) and
//! `~/.config/shelf/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Field;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Library-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Fields with a secondary index (title and author by default)
    pub indexed_fields: Vec<Field>,

    /// Status given to books added without `--status`
    pub default_status: String,

    /// Sort key used by `shelf list` when none is given
    pub default_sort: Option<Field>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            indexed_fields: vec![Field::Title, Field::Author],
            default_status: "available".to_string(),
            default_sort: None,
        }
    }
}

impl LibraryConfig {
    /// Rejects settings the inventory cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.indexed_fields.contains(&Field::Id) {
            return Err(ConfigError::Invalid(
                "'id' cannot be a secondary index; it is always the primary key".to_string(),
            ));
        }
        Ok(())
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + library)
#[derive(Debug, Clone)]
pub struct Config {
    pub library: LibraryConfig,
    pub global: GlobalConfig,
}

impl Config {
    /// Loads configuration for a specific library
    pub fn for_library(library_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let library = Self::load_library_config(library_root)?;

        Ok(Self { library, global })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "shelf", "shelf").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    pub fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads library configuration from a specific root
    fn load_library_config(library_root: &Path) -> Result<LibraryConfig> {
        let config_path = library_root.join(".shelf").join("config.toml");

        if !config_path.exists() {
            return Ok(LibraryConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read library config: {}", config_path.display()))?;

        let config: LibraryConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse library config")?;

        config.validate()?;
        Ok(config)
    }

    /// Finds the library root by looking for a `.shelf/` directory
    pub fn find_library_root() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            if current.join(".shelf").is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }
}

//! Configuration management for the droprate CLI

use anyhow::{Context, Result};
use droprate::{LoadOptions, TextDecoder, DEFAULT_EXTENSION};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Drop files directory used when neither `--dir` nor `data_dir` is set
pub const DEFAULT_DATA_DIR: &str = "data/MonItems";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default directory of monster drop files
    pub data_dir: Option<PathBuf>,
    /// Candidate encodings, tried in order
    pub encodings: Vec<String>,
    /// Drop file extension
    pub extension: String,
    /// Show "1/N" odds next to percentages
    pub show_fraction: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            encodings: vec!["utf-8".into(), "gbk".into(), "big5".into()],
            extension: DEFAULT_EXTENSION.to_string(),
            show_fraction: true,
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("droprate");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from file, or the defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        Ok(())
    }

    /// Directory to load: command line first, then config, then the default
    pub fn resolve_data_dir(&self, cli_dir: Option<&Path>) -> PathBuf {
        cli_dir
            .map(Path::to_path_buf)
            .or_else(|| self.data_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    /// Parser options built from the configured encodings and extension
    pub fn load_options(&self) -> Result<LoadOptions> {
        let decoder = if self.encodings.is_empty() {
            TextDecoder::default()
        } else {
            TextDecoder::from_labels(&self.encodings).context("Invalid encoding in config")?
        };

        Ok(LoadOptions {
            extension: self.extension.clone(),
            decoder,
        })
    }
}

//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting droprate CLI defaults.

use crate::config::Config;
use anyhow::{Context, Result};
use droprate::TextDecoder;
use std::path::PathBuf;

/// Settings given on the command line; `None` or empty leaves a value as is
#[derive(Debug, Default)]
pub struct Settings {
    pub data_dir: Option<PathBuf>,
    pub encodings: Vec<String>,
    pub extension: Option<String>,
    pub show_fraction: Option<bool>,
}

/// Handle the configure command
///
/// # Arguments
/// * `settings` - Values to store
/// * `show` - If true, show current configuration
pub fn handle(settings: Settings, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if !apply(&mut config, settings)? {
        show_usage();
        return Ok(());
    }

    config.save()?;
    println!("Configuration updated");
    show_config(&config);

    Ok(())
}

/// Apply the given settings. Returns false if nothing was given.
fn apply(config: &mut Config, settings: Settings) -> Result<bool> {
    let mut changed = false;

    if let Some(dir) = settings.data_dir {
        if !dir.is_dir() {
            tracing::warn!("{} is not a directory (yet)", dir.display());
        }
        config.data_dir = Some(dir);
        changed = true;
    }

    if !settings.encodings.is_empty() {
        TextDecoder::from_labels(&settings.encodings).context("Unsupported encoding")?;
        config.encodings = settings.encodings;
        changed = true;
    }

    if let Some(ext) = settings.extension {
        let ext = ext.trim_start_matches('.').to_string();
        if ext.is_empty() {
            anyhow::bail!("Extension must not be empty");
        }
        config.extension = ext;
        changed = true;
    }

    if let Some(show_fraction) = settings.show_fraction {
        config.show_fraction = show_fraction;
        changed = true;
    }

    Ok(changed)
}

/// Display current configuration
fn show_config(config: &Config) {
    match &config.data_dir {
        Some(dir) => println!("Data directory: {}", dir.display()),
        None => println!("No data directory configured"),
    }
    println!("Encodings:      {}", config.encodings.join(", "));
    println!("Extension:      .{}", config.extension);
    println!("Show fraction:  {}", config.show_fraction);

    if let Ok(path) = Config::config_path() {
        println!("Config file:    {}", path.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: droprate configure --data-dir PATH");
    println!("   or: droprate configure --encoding gbk --encoding utf-8");
    println!("   or: droprate configure --show-fraction false");
    println!("   or: droprate configure --show");
}

//! Command handlers for droprate CLI
//!
//! Each subcommand has its own module with handler functions.

pub mod calc;
pub mod configure;
pub mod export;
pub mod lookup;

use anyhow::{Context, Result};
use droprate::{DropCatalog, DropIndex};
use std::path::Path;
use std::sync::Arc;

use crate::config::Config;

/// An index snapshot plus the display preferences it is shown with
pub struct Loaded {
    pub index: Arc<DropIndex>,
    pub show_fraction: bool,
}

/// Load the drop files directory selected by `--dir` or the config
pub fn load_index(dir: Option<&Path>) -> Result<Loaded> {
    let config = Config::load()?;
    let data_dir = config.resolve_data_dir(dir);

    let mut catalog = DropCatalog::new(config.load_options()?);
    let stats = catalog
        .load(&data_dir)
        .with_context(|| format!("Failed to load drop files from {}", data_dir.display()))?;

    tracing::info!(
        "Loaded {} monsters, {} drops, {} unique items from {}",
        stats.total_monsters,
        stats.total_drop_entries,
        stats.unique_item_count,
        data_dir.display()
    );
    if stats.files_failed > 0 {
        tracing::warn!(
            "{} file(s) could not be read (run with --verbose for details)",
            stats.files_failed
        );
    }

    Ok(Loaded {
        index: catalog.snapshot(),
        show_fraction: config.show_fraction,
    })
}

//! Command dispatch
//!
//! Commands that query drop data load the index first; the calculator and
//! configuration commands never touch the data directory.

use std::path::Path;

use anyhow::Result;

use crate::cli::Commands;
use crate::commands;

pub fn dispatch(command: Commands, dir: Option<&Path>) -> Result<()> {
    match command {
        Commands::Configure {
            data_dir,
            encodings,
            extension,
            show_fraction,
            show,
        } => commands::configure::handle(
            commands::configure::Settings {
                data_dir,
                encodings,
                extension,
                show_fraction,
            },
            show,
        ),

        Commands::Calc { command } => commands::calc::handle(command),

        Commands::Stats { top } => {
            let loaded = commands::load_index(dir)?;
            commands::lookup::stats(&loaded.index, top);
            Ok(())
        }

        Commands::Items { keyword } => {
            let loaded = commands::load_index(dir)?;
            commands::lookup::items(&loaded.index, &keyword.join(" "));
            Ok(())
        }

        Commands::Monsters { keyword } => {
            let loaded = commands::load_index(dir)?;
            commands::lookup::monsters(&loaded.index, &keyword.join(" "));
            Ok(())
        }

        Commands::Item {
            name,
            dedup,
            monster,
        } => {
            let loaded = commands::load_index(dir)?;
            commands::lookup::item(&loaded, &name.join(" "), dedup, monster.as_deref());
            Ok(())
        }

        Commands::Monster { name, filter } => {
            let loaded = commands::load_index(dir)?;
            commands::lookup::monster(&loaded, &name.join(" "), filter.as_deref());
            Ok(())
        }

        Commands::Detail {
            item,
            monster,
            limit,
        } => {
            let loaded = commands::load_index(dir)?;
            commands::lookup::detail(&loaded.index, &item, &monster, limit);
            Ok(())
        }

        Commands::Export { output, format } => {
            let loaded = commands::load_index(dir)?;
            commands::export::handle(&loaded.index, &output, format)
        }
    }
}

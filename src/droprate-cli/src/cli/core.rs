//! Core CLI definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::calc::CalcCommand;

#[derive(Parser)]
#[command(name = "droprate")]
#[command(about = "Monster drop-rate lookup", long_about = None)]
pub struct Cli {
    /// Directory of monster drop files (overrides the configured data_dir)
    #[arg(short, long, global = true, env = "DROPRATE_DIR")]
    pub dir: Option<PathBuf>,

    /// Show parser warnings and debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// File format for the export command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summary of the loaded data and the monsters with the most drops
    Stats {
        /// How many monsters to list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Search item names (case-insensitive, partial match)
    #[command(visible_alias = "i")]
    Items {
        /// Keyword to search for; lists every item when omitted
        keyword: Vec<String>,
    },

    /// Search monster names (case-insensitive, partial match)
    #[command(visible_alias = "m")]
    Monsters {
        /// Keyword to search for; lists every monster when omitted
        keyword: Vec<String>,
    },

    /// Show which monsters drop an item (sorted by drop rate, highest first)
    Item {
        /// Exact item name
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,

        /// Show each monster once, with its highest rate
        #[arg(long)]
        dedup: bool,

        /// Only show monsters whose name contains this text
        #[arg(short, long)]
        monster: Option<String>,
    },

    /// Show everything a monster drops, in file order
    Monster {
        /// Exact monster name (the file name without extension)
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,

        /// Only show items whose name contains this text
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Detailed odds for one item from one monster, plus its other drops
    Detail {
        /// Exact item name
        item: String,

        /// Exact monster name
        monster: String,

        /// How many other drops to list
        #[arg(long, default_value_t = droprate::query::DEFAULT_OTHER_DROPS_LIMIT)]
        limit: usize,
    },

    /// Export every monster/item/rate row to a file
    #[command(visible_alias = "e")]
    Export {
        /// Output file
        output: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: ExportFormat,
    },

    /// Drop-chance calculator
    #[command(visible_alias = "c")]
    Calc {
        #[command(subcommand)]
        command: CalcCommand,
    },

    /// Configure default settings
    Configure {
        /// Set the default drop files directory
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Candidate text encodings, tried in order (e.g. --encoding utf-8 --encoding gbk)
        #[arg(long = "encoding")]
        encodings: Vec<String>,

        /// Drop file extension
        #[arg(long)]
        extension: Option<String>,

        /// Show "1/N" odds next to percentages (true or false)
        #[arg(long)]
        show_fraction: Option<bool>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

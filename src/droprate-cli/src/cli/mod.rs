//! CLI argument definitions for droprate
//!
//! This module contains all clap-derived structs and enums for CLI parsing.

mod calc;
mod core;

pub use calc::CalcCommand;
pub use core::{Cli, Commands, ExportFormat};

//! CLI definitions for the drop-chance calculator

use clap::Subcommand;

#[derive(Subcommand)]
pub enum CalcCommand {
    /// Chance of at least one drop after a number of kills
    Chance {
        /// Drop rate (e.g. "1/1000", "0.5")
        rate: String,

        /// Number of kills
        kills: u64,
    },

    /// Kills needed to reach a confidence of at least one drop
    Kills {
        /// Drop rate (e.g. "1/1000", "0.5")
        rate: String,

        /// Target confidence between 0 and 1
        #[arg(short, long, default_value_t = 0.95)]
        confidence: f64,
    },

    /// Chance that at least one of several independent drops happens
    Combine {
        /// Drop rates (e.g. "1/100 1/50 0.2")
        #[arg(required = true, num_args = 1..)]
        rates: Vec<String>,
    },

    /// Show a rate as percent, fraction and expected kills
    Show {
        /// Drop rate (e.g. "1/1000", "0.5")
        rate: String,
    },
}

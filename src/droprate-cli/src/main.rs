mod cli;
mod commands;
mod config;
mod dispatch;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    dispatch::dispatch(cli.command, cli.dir.as_deref())
}

/// Log to stderr so table and export output on stdout stays clean
fn init_tracing(verbose: bool) {
    // The binary shares the `droprate` target prefix with the library
    let default_filter = if verbose {
        "droprate=debug"
    } else {
        "error,droprate::commands=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

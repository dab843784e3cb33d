mod cli;
mod config;
mod discover;
mod model;
mod pipeline;
mod storage;
mod table;

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = cli::Cli::parse();

    if let Err(e) = init_tracing(cli.verbose, cli.quiet) {
        eprintln!("Error: {e}");
        process::exit(1);
    }

    if let Err(e) = cli::run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Diagnostics go to stderr. `COURSEBOOK_LOG` overrides the flag-derived level.
fn init_tracing(verbose: u8, quiet: bool) -> Result<(), String> {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };

    let filter = EnvFilter::try_from_env("COURSEBOOK_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| format!("failed to initialize logging: {e}"))
}

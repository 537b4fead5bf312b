//! oblevelctl - CLI for the oblevel leveling tracker
//!
//! Records skill training per character and level, and shows when a
//! level-up is worth taking.

mod cli;
mod commands;

use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = cli::Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = commands::run(cli) {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

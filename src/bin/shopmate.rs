//! Shopmate CLI binary.

use std::process;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use shopmate::cli::args::*;
use shopmate::cli::commands::*;

fn main() {
    let args = ShopmateArgs::parse();

    // RUST_LOG wins over the verbosity flags.
    let level = match args.verbosity() {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(args: ShopmateArgs) -> anyhow::Result<()> {
    let config = load_config(&args).context("failed to load configuration")?;
    execute_command(&args, &config)?;
    Ok(())
}

mod cli;
mod config;
mod report;

use std::process;
use std::sync::Arc;

use clap::Parser;
use ocdflash_lib::{FlashRunner, Runfiles, RunfilesLocation, SystemRunner};

use crate::cli::Cli;
use crate::config::OcdFlashConfig;
use crate::report::ConsoleReporter;

fn run(args: &Cli) -> ocdflash_lib::Result<()> {
    let config =
        OcdFlashConfig::load().map_err(|e| ocdflash_lib::Error::unexpected(format!("{:#}", e)))?;

    let location = config.runfiles_location(RunfilesLocation::from_env());
    let runfiles = Runfiles::discover(&location)?;

    FlashRunner::new(runfiles, SystemRunner)
        .with_reporter(Arc::new(ConsoleReporter))
        .run(&args.to_request())?;
    Ok(())
}

fn main() {
    // Log level can be controlled by setting the RUST_LOG environment variable, e.g.:
    // RUST_LOG=debug, RUST_LOG=ocdflash_lib=trace
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

//! Binary crate for the `wxreport` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and LAT/LON/CITY/REGION overrides
//! - Interactive configuration
//! - Human-friendly, colorized output

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod render;

#[tokio::main]
async fn main() -> ExitCode {
    // Diagnostics go to stderr so they never interleave with the report.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    match cmd.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            render::fatal(&e);
            ExitCode::FAILURE
        }
    }
}

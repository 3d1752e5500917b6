//! reliefctl (rctl) - operator CLI for the relief coordination engine.
//!
//! Lists camps and their urgency, registers and matches volunteers, drives
//! tasks and sends or watches alerts.

use anyhow::Result;
use clap::Parser;

mod client;
mod commands;
mod config;
mod error;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = cli.run().await {
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}

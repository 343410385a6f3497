//! resolvekit CLI: structure complaint-procedure documents from the shell.
//!
//! Normalizes pasted or exported markup, classifies it into complaint
//! methods, escalation levels, required documents and timelines, and stores
//! or pushes the result.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}

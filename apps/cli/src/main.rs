//! linkdex CLI — bookmark export ingestion into a searchable index.
//!
//! Flattens a bookmark export, fetches every URL in parallel, strips pages
//! to plain text, and loads them into the index sink, skipping URLs already
//! ingested in prior runs.

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

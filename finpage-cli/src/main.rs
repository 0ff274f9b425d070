//! finpage CLI: generate SEO financial webpages from keywords.

mod commands;

use anyhow::Result;
use clap::Parser;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    commands::init_tracing(&cli)?;
    commands::run(cli).await
}

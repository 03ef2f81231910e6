//! WikiResearch CLI: answer questions from Wikipedia with cited sources.
//!
//! Searches Wikipedia for the most relevant articles, fetches their text,
//! and asks a language model for an answer grounded in that text.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}

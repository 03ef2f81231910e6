//! WikiResearch TUI: interactive terminal front end for Wikipedia research.
//!
//! Provides screens for asking questions, revisiting past answers, and
//! tuning retrieval settings, built with `ratatui` + `crossterm`.

mod app;
mod screens;
mod session;
mod widgets;

use color_eyre::eyre::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use wikiresearch_shared::{config_dir, load_config};

fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let _guard = init_tracing()?;

    let mut config = load_config()?;
    config.apply_env_overrides()?;
    config.research.validate()?;

    app::run(config)
}

/// Log to `<config_dir>/wikiresearch-tui.log`; the terminal belongs to the UI.
fn init_tracing() -> Result<WorkerGuard> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir)?;

    let appender = tracing_appender::rolling::never(&dir, "wikiresearch-tui.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wikiresearch=info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .init();

    Ok(guard)
}

//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use wikiresearch_core::report::{self, format_sources, history_label};
use wikiresearch_core::{ProgressReporter, ResearchHistory, ResearchPipeline};
use wikiresearch_shared::{AppConfig, ResearchState, init_config, load_config, validate_api_key};

/// Entries listed by `:history` in the REPL.
const REPL_HISTORY_SHOWN: usize = 5;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// WikiResearch: answer questions from Wikipedia with cited sources.
#[derive(Parser)]
#[command(
    name = "wikiresearch",
    version,
    about = "Answer research questions from Wikipedia articles, with cited sources.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Flags that override `[research]` settings for one invocation.
#[derive(clap::Args, Debug, Clone, Default)]
pub(crate) struct ResearchOverrides {
    /// Maximum number of articles to retrieve (1-5).
    #[arg(long)]
    pub max_results: Option<usize>,

    /// Maximum characters kept per article (1000-5000).
    #[arg(long)]
    pub max_content_length: Option<usize>,

    /// Wikipedia language edition (e.g. en, de, fr).
    #[arg(long)]
    pub language: Option<String>,
}

impl ResearchOverrides {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(n) = self.max_results {
            config.research.max_search_results = n;
        }
        if let Some(n) = self.max_content_length {
            config.research.max_content_length = n;
        }
        if let Some(lang) = &self.language {
            config.research.language = lang.trim().to_string();
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Research a single question and print the answer.
    Ask {
        /// The research question.
        query: String,

        #[command(flatten)]
        overrides: ResearchOverrides,

        /// Print the full research state as JSON.
        #[arg(long)]
        json: bool,

        /// Also write a Markdown report to this file.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Interactive session: one question per line.
    Repl {
        #[command(flatten)]
        overrides: ResearchOverrides,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "wikiresearch=info",
        1 => "wikiresearch=debug",
        _ => "wikiresearch=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Ask {
            query,
            overrides,
            json,
            out,
        } => cmd_ask(&query, &overrides, json, out).await,
        Command::Repl { overrides } => cmd_repl(&overrides).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

/// File config, then environment, then flags.
fn resolve_config(overrides: &ResearchOverrides) -> Result<AppConfig> {
    let mut config = load_config()?;
    config.apply_env_overrides()?;
    overrides.apply(&mut config);
    config.research.validate()?;
    Ok(config)
}

fn build_pipeline(overrides: &ResearchOverrides) -> Result<ResearchPipeline> {
    let config = resolve_config(overrides)?;
    validate_api_key(&config)?;
    Ok(ResearchPipeline::from_config(&config)?)
}

async fn cmd_ask(
    query: &str,
    overrides: &ResearchOverrides,
    json: bool,
    out: Option<PathBuf>,
) -> Result<()> {
    if query.trim().is_empty() {
        return Err(eyre!("Please enter a research question."));
    }

    let pipeline = build_pipeline(overrides)?;
    info!(query, "researching");

    let reporter = CliProgress::new();
    let state = pipeline.research_with_progress(query, &reporter).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        print_result(&state);
    }

    if let Some(path) = out {
        std::fs::write(&path, report::render_markdown(&state))
            .map_err(|e| eyre!("failed to write report to '{}': {e}", path.display()))?;
        eprintln!("Report saved to {}", path.display());
    }

    Ok(())
}

fn print_result(state: &ResearchState) {
    println!();
    println!("{}", state.answer.trim());
    println!();
    println!("Sources:");
    println!("{}", format_sources(&state.sources));
    if let Some(error) = &state.error {
        println!();
        println!("Note: {error}");
    }
    println!();
}

// ---------------------------------------------------------------------------
// REPL
// ---------------------------------------------------------------------------

/// One parsed line of REPL input.
#[derive(Debug, PartialEq, Eq)]
enum ReplInput {
    Empty,
    Quit,
    History,
    /// 1-based position in the last `:history` listing.
    Rerun(usize),
    Query(String),
    Invalid(String),
}

fn parse_repl_line(line: &str) -> ReplInput {
    let line = line.trim();
    if line.is_empty() {
        return ReplInput::Empty;
    }
    let Some(command) = line.strip_prefix(':') else {
        return ReplInput::Query(line.to_string());
    };

    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("quit" | "q" | "exit"), None) => ReplInput::Quit,
        (Some("history" | "h"), None) => ReplInput::History,
        (Some("rerun" | "r"), Some(n)) => match n.parse::<usize>() {
            Ok(n) if n >= 1 => ReplInput::Rerun(n),
            _ => ReplInput::Invalid(format!("not a history number: {n}")),
        },
        _ => ReplInput::Invalid(format!("unknown command: {line}")),
    }
}

async fn cmd_repl(overrides: &ResearchOverrides) -> Result<()> {
    let pipeline = build_pipeline(overrides)?;
    let mut history = ResearchHistory::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("WikiResearch interactive session.");
    println!("Type a question, :history, :rerun <n>, or :quit.");

    loop {
        eprint!("> ");
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let query = match parse_repl_line(&line) {
            ReplInput::Empty => continue,
            ReplInput::Quit => break,
            ReplInput::History => {
                print_history(&history);
                continue;
            }
            ReplInput::Rerun(n) => match history.recent(REPL_HISTORY_SHOWN).get(n - 1) {
                Some(entry) => entry.query.clone(),
                None => {
                    println!("No history entry {n}.");
                    continue;
                }
            },
            ReplInput::Query(q) => q,
            ReplInput::Invalid(msg) => {
                println!("{msg}");
                continue;
            }
        };

        let reporter = CliProgress::new();
        let state = pipeline.research_with_progress(&query, &reporter).await;
        print_result(&state);
        history.push(query, state);
    }

    Ok(())
}

fn print_history(history: &ResearchHistory) {
    if history.is_empty() {
        println!("No research yet.");
        return;
    }
    for (i, entry) in history.recent(REPL_HISTORY_SHOWN).iter().enumerate() {
        println!(
            "{}. {}  ({})",
            i + 1,
            history_label(&entry.query),
            entry.timestamp.format("%H:%M:%S")
        );
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner on stderr.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, label: &str) {
        self.spinner.set_message(label.to_string());
    }

    fn done(&self, _state: &ResearchState) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config = resolve_config(&ResearchOverrides::default())?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

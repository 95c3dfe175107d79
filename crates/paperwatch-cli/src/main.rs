//! paperwatch - surface arXiv papers you have not seen yet
//!
//! Searches arXiv newest-first, skips papers already reported in earlier
//! runs, and reuses cached summaries. Summarizing and mailing are left to
//! downstream tools that consume `discover --json`.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "paperwatch")]
#[command(about = "Surface arXiv papers you have not seen yet")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./paperwatch.toml or ~/.config/paperwatch/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Maximum retry attempts for transient failures
    #[arg(long, global = true)]
    max_retries: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Find papers not reported before
    Discover(cmd::discover::DiscoverArgs),
    /// Look up one paper by arXiv ID
    Get(cmd::get::GetArgs),
    /// Print the PDF link for an arXiv ID
    PdfUrl(cmd::get::PdfUrlArgs),
    /// Inspect or fill the summary cache
    Cache(cmd::cache::CacheArgs),
    /// Inspect the seen-paper ledger
    Ledger(cmd::ledger::LedgerArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(paperwatch_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug; the spinner shows activity
    //   non-TTY: info unless --debug
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = is_tty && !cli.debug;
    paperwatch_core::init_logging(quiet, cli.debug, multi);

    if let Err(e) = paperwatch_core::install_signal_handlers() {
        log::warn!("Failed to install signal handlers: {e}");
    }

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    if let Some(n) = cli.max_retries {
        config.http.max_retries = n;
    }
    paperwatch_core::set_http_config(config.http.to_http_config());

    match cli.command {
        Command::Discover(args) => cmd::discover::run(args, &config, &progress),
        Command::Get(args) => cmd::get::run(args, &config),
        Command::PdfUrl(args) => cmd::get::run_pdf_url(args, &config),
        Command::Cache(args) => cmd::cache::run(args, &config),
        Command::Ledger(args) => cmd::ledger::run(args, &config),
        Command::Config => {
            show_config(&config);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn show_config(config: &Config) {
    let mut table = cmd::table(&["Setting", "Value"]);
    let search = &config.search;
    table.add_row(vec!["Search terms".to_string(), search.terms.join(" | ")]);
    table.add_row(vec!["Categories".to_string(), search.categories.join(", ")]);
    table.add_row(vec!["Max results".to_string(), search.max_results.to_string()]);
    table.add_row(vec!["Page size".to_string(), search.page_size.to_string()]);
    table.add_row(vec!["Delay".to_string(), format!("{}ms", search.delay_ms)]);
    table.add_row(vec![
        "Ledger".to_string(),
        config.storage.ledger_path.display().to_string(),
    ]);
    table.add_row(vec![
        "Cache dir".to_string(),
        config.storage.cache_dir.display().to_string(),
    ]);
    table.add_row(vec!["API URL".to_string(), config.http.base_url.clone()]);
    table.add_row(vec![
        "Timeouts".to_string(),
        format!(
            "{}s request, {}s connect",
            config.http.timeout_secs, config.http.connect_timeout_secs
        ),
    ]);
    table.add_row(vec!["Max retries".to_string(), config.http.max_retries.to_string()]);
    table.add_row(vec![
        "User agent".to_string(),
        config.http.to_http_config().user_agent,
    ]);

    eprintln!("\n{table}");
}

//! `paperwatch discover` - find papers not surfaced before

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color};
use paperwatch_core::SharedProgress;

use super::{date_part, open_engine, table, truncate};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// Search term, phrases allowed (repeatable; default from config)
    #[arg(short, long = "term")]
    pub terms: Vec<String>,

    /// arXiv category such as cs.AI (repeatable; default from config)
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Maximum number of new records to return
    #[arg(short = 'n', long)]
    pub max_results: Option<usize>,

    /// Results requested per page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Pause between page requests in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Print records as a JSON array on stdout
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: DiscoverArgs, config: &Config, progress: &SharedProgress) -> Result<ExitCode> {
    let mut request = config.search.to_request();
    if !args.terms.is_empty() {
        request.search_terms = Some(args.terms);
    }
    if !args.categories.is_empty() {
        request.categories = Some(args.categories);
    }
    if let Some(n) = args.max_results {
        request.max_results = n;
    }
    if let Some(n) = args.page_size {
        request.page_size = n;
    }
    if let Some(ms) = args.delay_ms {
        request.delay = Duration::from_millis(ms);
    }

    let mut engine = open_engine(config)?.with_progress(progress.search_line("arXiv"));
    let found = engine.discover(&request);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&found.records)?);
    } else if found.records.is_empty() {
        eprintln!("No new papers.");
    } else {
        let mut table = table(&["ID", "Published", "Title", "Source"]);
        for record in &found.records {
            let source = if record.is_enriched() {
                Cell::new("cache").fg(Color::Green)
            } else {
                Cell::new("arxiv")
            };
            table.add_row(vec![
                Cell::new(&record.id),
                Cell::new(record.published.as_deref().map_or("-", date_part)),
                Cell::new(truncate(&record.title, 70)),
                source,
            ]);
        }
        eprintln!("\n{table}");
    }

    eprintln!(
        "{} new papers ({} cached), {} pages, stopped: {}",
        found.records.len(),
        found.reused,
        found.pages_fetched,
        found.stop
    );
    if !found.ledger_persisted {
        eprintln!(
            "warning: could not update {}; these papers may be reported again",
            engine.ledger().path().display()
        );
    }
    Ok(ExitCode::SUCCESS)
}

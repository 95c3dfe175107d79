//! `paperwatch get` / `paperwatch pdf-url` - single-paper lookup

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use paperwatch_store::Record;

use super::{open_engine, table};
use crate::config::Config;

/// Exit code when the paper does not exist
pub const NOT_FOUND: u8 = 2;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// arXiv ID, e.g. 2401.12345v1
    pub id: String,

    /// Print the record as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct PdfUrlArgs {
    /// arXiv ID, e.g. 2401.12345v1
    pub id: String,
}

pub fn run(args: GetArgs, config: &Config) -> Result<ExitCode> {
    let mut engine = open_engine(config)?;
    let Some(record) = engine
        .get_by_id(&args.id)
        .with_context(|| format!("Failed to look up {}", args.id))?
    else {
        eprintln!("No paper found for {}", args.id);
        return Ok(ExitCode::from(NOT_FOUND));
    };
    if !engine.ledger_persisted() {
        eprintln!(
            "warning: could not update {}; {} may be reported again",
            engine.ledger().path().display(),
            record.id
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record);
    }
    Ok(ExitCode::SUCCESS)
}

pub fn run_pdf_url(args: PdfUrlArgs, config: &Config) -> Result<ExitCode> {
    let engine = open_engine(config)?;
    match engine
        .pdf_url(&args.id)
        .with_context(|| format!("Failed to look up {}", args.id))?
    {
        Some(url) => {
            println!("{url}");
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("No PDF URL for {}", args.id);
            Ok(ExitCode::from(NOT_FOUND))
        }
    }
}

/// Field/value table of one record on stderr.
pub fn print_record(record: &Record) {
    let list = |v: &Option<Vec<String>>| v.as_ref().map(|v| v.join(", ")).unwrap_or_default();
    let text = |v: &Option<String>| v.clone().unwrap_or_default();

    let mut table = table(&["Field", "Value"]);
    table.add_row(vec!["ID".to_string(), record.id.clone()]);
    table.add_row(vec!["Title".to_string(), record.title.clone()]);
    table.add_row(vec!["Authors".to_string(), list(&record.authors)]);
    table.add_row(vec!["Published".to_string(), text(&record.published)]);
    table.add_row(vec!["Categories".to_string(), list(&record.categories)]);
    table.add_row(vec!["URL".to_string(), record.url.clone()]);
    table.add_row(vec!["PDF".to_string(), text(&record.pdf_url)]);
    if record.doi.is_some() {
        table.add_row(vec!["DOI".to_string(), text(&record.doi)]);
    }
    if record.comment.is_some() {
        table.add_row(vec!["Comment".to_string(), text(&record.comment)]);
    }
    if record.is_enriched() {
        table.add_row(vec!["Summary".to_string(), text(&record.summary)]);
    }
    eprintln!("\n{table}");
}

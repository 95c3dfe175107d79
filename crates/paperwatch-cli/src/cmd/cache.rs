//! `paperwatch cache` - inspect and fill the content cache

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use comfy_table::Cell;
use paperwatch_store::{ContentCache, Record};

use super::get::{NOT_FOUND, print_record};
use super::{date_part, table, truncate};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List cached (summarized) papers
    List,
    /// Show one cached paper
    Show {
        /// arXiv ID
        id: String,

        /// Print as JSON on stdout
        #[arg(long)]
        json: bool,
    },
    /// Store summarized records (a JSON object or array)
    Import {
        /// JSON file written by the summarizer
        file: PathBuf,
    },
}

pub fn run(args: CacheArgs, config: &Config) -> Result<ExitCode> {
    let cache = ContentCache::open(&config.storage.cache_dir)?;
    match args.action {
        CacheAction::List => list(&cache),
        CacheAction::Show { id, json } => show(&cache, &id, json),
        CacheAction::Import { file } => import(&cache, &file),
    }
}

fn list(cache: &ContentCache) -> Result<ExitCode> {
    let ids = cache.ids()?;
    if ids.is_empty() {
        eprintln!("No cached papers in {}.", cache.dir().display());
        return Ok(ExitCode::SUCCESS);
    }

    let mut table = table(&["ID", "Published", "Title"]);
    for id in &ids {
        // Unreadable entries were already logged by the cache
        let Some(record) = cache.get(id) else {
            continue;
        };
        table.add_row(vec![
            Cell::new(&record.id),
            Cell::new(record.published.as_deref().map_or("-", date_part)),
            Cell::new(truncate(&record.title, 70)),
        ]);
    }
    eprintln!("\n{table}");
    eprintln!("{} entries total", ids.len());
    Ok(ExitCode::SUCCESS)
}

fn show(cache: &ContentCache, id: &str, json: bool) -> Result<ExitCode> {
    let Some(record) = cache.get(id) else {
        eprintln!("{id} is not cached");
        return Ok(ExitCode::from(NOT_FOUND));
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record);
    }
    Ok(ExitCode::SUCCESS)
}

/// Parse a single record or an array of records.
fn read_records(path: &Path) -> Result<Vec<Record>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let records = if value.is_array() {
        serde_json::from_value(value)
    } else {
        serde_json::from_value(value).map(|r: Record| vec![r])
    };
    records.with_context(|| format!("{} does not contain records", path.display()))
}

fn import(cache: &ContentCache, file: &Path) -> Result<ExitCode> {
    let records = read_records(file)?;
    let mut stored = 0usize;
    for record in &records {
        if cache.put(record)? {
            stored += 1;
        } else {
            log::warn!("{} has no summary, skipped", record.id);
        }
    }
    eprintln!(
        "Stored {stored} of {} records in {}",
        records.len(),
        cache.dir().display()
    );
    Ok(ExitCode::SUCCESS)
}

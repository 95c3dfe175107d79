//! Subcommands

pub mod cache;
pub mod discover;
pub mod get;
pub mod ledger;

use anyhow::Result;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use paperwatch_arxiv::{ArxivClient, DiscoveryEngine};
use paperwatch_store::{ContentCache, Ledger};

use crate::config::Config;

/// Engine wired to the live API and the configured stores.
pub fn open_engine(config: &Config) -> Result<DiscoveryEngine<ArxivClient>> {
    let ledger = Ledger::load(&config.storage.ledger_path);
    let cache = ContentCache::open(&config.storage.cache_dir)?;
    let client = ArxivClient::new(config.http.base_url.as_str());
    Ok(DiscoveryEngine::new(client, ledger, cache))
}

/// Table with the shared look and cyan headers.
pub fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    table
}

/// Shorten `s` to `max` chars for table cells.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}

/// Date part of an ISO-8601 timestamp.
pub fn date_part(ts: &str) -> &str {
    ts.split_once('T').map_or(ts, |(date, _)| date)
}

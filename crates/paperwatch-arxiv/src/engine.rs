//! Discovery: page through search results until enough unseen records
//! are found, then commit them to the ledger.
//!
//! ```text
//! build_query → fetch_page(offset) → skip seen → cache lookup → accept
//!        ↑                                                       │
//!        └──────── offset += page_size, delay ◄──────────────────┘
//! ```
//!
//! The loop stops on the first of: quota met, empty page, fetch failure,
//! [`MAX_STALLED_PAGES`] consecutive pages with nothing new, or shutdown.
//! Accepted IDs are written to the ledger once, after the loop.

use std::fmt;
use std::time::Duration;

use indicatif::ProgressBar;
use paperwatch_core::{is_shutdown_requested, search_status, sleep_unless_shutdown};
use paperwatch_store::ledger::now_timestamp;
use paperwatch_store::{ContentCache, Ledger, Record};
use rustc_hash::FxHashSet;

use crate::query::build_query;
use crate::source::{FetchError, PageSource};

/// Consecutive pages without a new record before giving up
pub const MAX_STALLED_PAGES: u32 = 3;

/// Parameters for one discovery run.
#[derive(Debug, Clone)]
pub struct DiscoverRequest {
    pub search_terms: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub max_results: usize,
    pub page_size: usize,
    /// Pause between page requests
    pub delay: Duration,
}

impl Default for DiscoverRequest {
    fn default() -> Self {
        Self {
            search_terms: None,
            categories: None,
            max_results: 10,
            page_size: 20,
            delay: Duration::from_secs(1),
        }
    }
}

/// Why a discovery run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// No terms and no categories; nothing was fetched
    EmptyQuery,
    QuotaMet,
    /// The service returned an empty page
    Exhausted,
    /// Too many consecutive pages of already-seen records
    Stalled,
    /// A page request failed; earlier results are kept
    FetchFailed(String),
    Shutdown,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::EmptyQuery => write!(f, "empty query"),
            StopReason::QuotaMet => write!(f, "quota met"),
            StopReason::Exhausted => write!(f, "no more results"),
            StopReason::Stalled => {
                write!(f, "{MAX_STALLED_PAGES} consecutive pages without new records")
            }
            StopReason::FetchFailed(msg) => write!(f, "fetch failed: {msg}"),
            StopReason::Shutdown => write!(f, "interrupted"),
        }
    }
}

/// Outcome of [`DiscoveryEngine::discover`].
#[derive(Debug)]
pub struct Discovery {
    pub query: String,
    /// Newly surfaced records, newest first
    pub records: Vec<Record>,
    pub pages_fetched: usize,
    /// How many of `records` came from the content cache
    pub reused: usize,
    pub stop: StopReason,
    /// False if the ledger write failed; records are still returned
    pub ledger_persisted: bool,
}

/// Merges search results with the ledger and content cache.
pub struct DiscoveryEngine<S> {
    source: S,
    ledger: Ledger,
    cache: ContentCache,
    progress: ProgressBar,
    ledger_persisted: bool,
}

impl<S: PageSource> DiscoveryEngine<S> {
    pub fn new(source: S, ledger: Ledger, cache: ContentCache) -> Self {
        Self {
            source,
            ledger,
            cache,
            progress: ProgressBar::hidden(),
            ledger_persisted: true,
        }
    }

    /// Report paging progress on `pb`, usually a
    /// [`ProgressContext::search_line`](paperwatch_core::ProgressContext::search_line).
    pub fn with_progress(mut self, pb: ProgressBar) -> Self {
        self.progress = pb;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// False if the most recent ledger write failed.
    pub fn ledger_persisted(&self) -> bool {
        self.ledger_persisted
    }

    /// Find up to `max_results` records never returned before.
    ///
    /// Never fails: a fetch error ends paging and whatever was accepted
    /// so far is returned (and committed to the ledger).
    pub fn discover(&mut self, request: &DiscoverRequest) -> Discovery {
        let query = build_query(
            request.search_terms.as_deref(),
            request.categories.as_deref(),
        );
        if query.is_empty() {
            log::warn!("No search terms or categories given, nothing to search");
            return Discovery {
                query,
                records: Vec::new(),
                pages_fetched: 0,
                reused: 0,
                stop: StopReason::EmptyQuery,
                ledger_persisted: true,
            };
        }

        log::info!("Searching arXiv: {query}");
        let page_size = request.page_size.max(1);
        let max_results = request.max_results;

        let mut records: Vec<Record> = Vec::new();
        let mut accepted_ids: FxHashSet<String> = FxHashSet::default();
        let mut offset = 0usize;
        let mut pages_fetched = 0usize;
        let mut reused = 0usize;
        let mut stalled = 0u32;

        let stop = loop {
            if records.len() >= max_results {
                break StopReason::QuotaMet;
            }
            if stalled >= MAX_STALLED_PAGES {
                log::info!("{MAX_STALLED_PAGES} pages in a row without new records, stopping");
                break StopReason::Stalled;
            }
            if is_shutdown_requested() {
                log::warn!("Shutdown requested, stopping search");
                break StopReason::Shutdown;
            }

            log::debug!(
                "Requesting results {offset}..{}",
                offset.saturating_add(page_size)
            );

            let page = match self.source.fetch_page(&query, offset, page_size) {
                Ok(page) => page,
                Err(e) => {
                    log::warn!("Fetch failed at offset {offset}: {e}");
                    break StopReason::FetchFailed(e.to_string());
                }
            };
            pages_fetched += 1;
            self.progress.inc(1);

            if page.is_empty() {
                log::info!("No more results after {offset}");
                break StopReason::Exhausted;
            }

            let mut new_on_page = 0usize;
            for entry in page {
                let id = entry.record_id().to_string();
                if self.ledger.contains(&id) || accepted_ids.contains(&id) {
                    log::debug!("Seen {id}, skipping");
                    continue;
                }
                let record = match self.cache.get_enriched(&id) {
                    Some(cached) => {
                        log::debug!("Reusing cached summary for {id}");
                        reused += 1;
                        cached
                    }
                    None => entry.into_record(),
                };
                log::info!("New: {id} {}", record.title);
                accepted_ids.insert(id);
                records.push(record);
                new_on_page += 1;
                if records.len() >= max_results {
                    break;
                }
            }

            if new_on_page == 0 {
                stalled += 1;
                log::debug!("Page @{offset} had nothing new ({stalled}/{MAX_STALLED_PAGES})");
            } else {
                stalled = 0;
            }
            offset = offset.saturating_add(page_size);
            self.progress
                .set_message(search_status(records.len(), max_results, offset));

            let more_to_do = records.len() < max_results && stalled < MAX_STALLED_PAGES;
            if more_to_do && !request.delay.is_zero() && !sleep_unless_shutdown(request.delay) {
                log::warn!("Shutdown requested, stopping search");
                break StopReason::Shutdown;
            }
        };

        let ledger_persisted = self.commit(&records);
        self.ledger_persisted = ledger_persisted;
        self.progress.finish_and_clear();
        log::info!(
            "Found {} new records ({reused} cached) in {pages_fetched} pages: {stop}",
            records.len()
        );

        Discovery {
            query,
            records,
            pages_fetched,
            reused,
            stop,
            ledger_persisted,
        }
    }

    /// Mark `records` as seen with one shared timestamp and flush once.
    fn commit(&mut self, records: &[Record]) -> bool {
        if records.is_empty() {
            return true;
        }
        let timestamp = now_timestamp();
        for record in records {
            self.ledger.mark(&record.id, &timestamp);
        }
        self.flush_ledger()
    }

    fn flush_ledger(&self) -> bool {
        match self.ledger.flush() {
            Ok(()) => true,
            Err(e) => {
                log::warn!(
                    "Failed to write ledger {}: {e:#}; these records may be returned again",
                    self.ledger.path().display()
                );
                false
            }
        }
    }

    /// Fetch one record by ID, preferring an enriched cache entry.
    ///
    /// The record's canonical ID is added to the ledger if absent. A failed
    /// ledger write is logged and reported by [`Self::ledger_persisted`].
    pub fn get_by_id(&mut self, id: &str) -> Result<Option<Record>, FetchError> {
        let id = id.trim();
        let record = match self.cache.get_enriched(id) {
            Some(cached) => {
                log::info!("Loaded {id} from cache");
                cached
            }
            None => {
                log::info!("Fetching {id} from arXiv");
                match self.source.fetch_by_id(id)? {
                    Some(entry) => entry.into_record(),
                    None => {
                        log::info!("{id} not found");
                        return Ok(None);
                    }
                }
            }
        };

        self.ledger_persisted = if self.ledger.insert_if_absent(&record.id, &now_timestamp()) {
            self.flush_ledger()
        } else {
            true
        };
        Ok(Some(record))
    }

    /// PDF link for `id`, without touching the ledger.
    pub fn pdf_url(&self, id: &str) -> Result<Option<String>, FetchError> {
        let id = id.trim();
        if let Some(url) = self.cache.get(id).and_then(|r| r.pdf_url) {
            return Ok(Some(url));
        }
        Ok(self.source.fetch_by_id(id)?.map(|entry| entry.pdf_link()))
    }
}

//! Paperwatch arXiv - discovery of new arXiv papers
//!
//! Builds arXiv search queries, pages through results newest-first, and
//! merges them against the seen ledger and content cache so only records
//! never surfaced before come back.
//!
//! # Example
//!
//! ```ignore
//! use paperwatch_arxiv::{ArxivClient, DiscoverRequest, DiscoveryEngine};
//! use paperwatch_store::{ContentCache, Ledger};
//!
//! let ledger = Ledger::load("seen_papers.json".as_ref());
//! let cache = ContentCache::open("paper_summaries".as_ref())?;
//! let mut engine = DiscoveryEngine::new(ArxivClient::default(), ledger, cache);
//!
//! let found = engine.discover(&DiscoverRequest {
//!     search_terms: Some(vec!["mechanistic interpretability".into()]),
//!     categories: Some(vec!["cs.AI".into(), "cs.LG".into()]),
//!     ..Default::default()
//! });
//! println!("{} new papers ({})", found.records.len(), found.stop);
//! ```

pub mod client;
pub mod engine;
pub mod entry;
pub mod feed;
pub mod query;
pub mod source;

// Re-exports
pub use client::{ARXIV_API_URL, ArxivClient};
pub use engine::{DiscoverRequest, Discovery, DiscoveryEngine, MAX_STALLED_PAGES, StopReason};
pub use entry::RawEntry;
pub use query::build_query;
pub use source::{FetchError, PageSource};

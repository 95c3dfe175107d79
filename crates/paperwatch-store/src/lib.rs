//! paperwatch-store: durable state for paper discovery
//!
//! Two file-backed stores: the [`Ledger`] of record IDs already surfaced
//! (one JSON object, rewritten in full on flush) and the [`ContentCache`]
//! of enriched records (one JSON file per record).

pub mod cache;
pub mod ledger;
pub mod persist;
pub mod record;

pub use cache::ContentCache;
pub use ledger::Ledger;
pub use record::Record;

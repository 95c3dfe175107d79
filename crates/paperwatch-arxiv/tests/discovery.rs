//! Discovery scenarios against an in-memory page source

use std::cell::{Cell, RefCell};
use std::path::Path;
use std::time::Duration;

use paperwatch_arxiv::{
    DiscoverRequest, DiscoveryEngine, FetchError, PageSource, RawEntry, StopReason,
};
use paperwatch_core::StreamError;
use paperwatch_store::{ContentCache, Ledger, Record};
use tempfile::TempDir;

/// Newest-first corpus served in pages, like the real API.
struct FakeArxiv {
    corpus: Vec<RawEntry>,
    /// Fail every page request at or after this offset
    fail_from: Option<usize>,
    page_calls: Cell<usize>,
    id_calls: Cell<usize>,
    queries: RefCell<Vec<String>>,
}

impl FakeArxiv {
    fn new(ids: &[&str]) -> Self {
        Self {
            corpus: ids.iter().map(|id| entry(id)).collect(),
            fail_from: None,
            page_calls: Cell::new(0),
            id_calls: Cell::new(0),
            queries: RefCell::new(Vec::new()),
        }
    }

    /// Every page returns the same `ids`.
    fn repeating(ids: &[&str]) -> RepeatingArxiv {
        RepeatingArxiv {
            page: ids.iter().map(|id| entry(id)).collect(),
            calls: Cell::new(0),
        }
    }
}

impl PageSource for FakeArxiv {
    fn fetch_page(
        &self,
        query: &str,
        offset: usize,
        page_size: usize,
    ) -> Result<Vec<RawEntry>, FetchError> {
        self.page_calls.set(self.page_calls.get() + 1);
        self.queries.borrow_mut().push(query.to_string());
        if self.fail_from.is_some_and(|from| offset >= from) {
            return Err(FetchError::Stream(StreamError::Http {
                status: Some(503),
                message: "Service Unavailable".into(),
            }));
        }
        Ok(self
            .corpus
            .iter()
            .skip(offset)
            .take(page_size)
            .cloned()
            .collect())
    }

    fn fetch_by_id(&self, id: &str) -> Result<Option<RawEntry>, FetchError> {
        self.id_calls.set(self.id_calls.get() + 1);
        Ok(self.corpus.iter().find(|e| e.record_id() == id).cloned())
    }
}

struct RepeatingArxiv {
    page: Vec<RawEntry>,
    calls: Cell<usize>,
}

impl PageSource for RepeatingArxiv {
    fn fetch_page(&self, _: &str, _: usize, _: usize) -> Result<Vec<RawEntry>, FetchError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.page.clone())
    }

    fn fetch_by_id(&self, _: &str) -> Result<Option<RawEntry>, FetchError> {
        Ok(None)
    }
}

fn entry(id: &str) -> RawEntry {
    RawEntry {
        entry_id: format!("http://arxiv.org/abs/{id}"),
        title: format!("Test Paper {id}"),
        authors: vec!["A. Author".into()],
        abstract_text: format!("Abstract of {id}."),
        categories: vec!["cs.AI".into()],
        published: Some("2024-01-02T00:00:00Z".into()),
        pdf_url: Some(format!("http://arxiv.org/pdf/{id}")),
        ..Default::default()
    }
}

fn ledger_path(dir: &Path) -> std::path::PathBuf {
    dir.join("seen_papers.json")
}

fn open<S: PageSource>(source: S, dir: &Path) -> DiscoveryEngine<S> {
    let ledger = Ledger::load(&ledger_path(dir));
    let cache = ContentCache::open(&dir.join("paper_summaries")).unwrap();
    DiscoveryEngine::new(source, ledger, cache)
}

fn request(max_results: usize, page_size: usize) -> DiscoverRequest {
    DiscoverRequest {
        search_terms: Some(vec!["mechanistic interpretability".into()]),
        categories: Some(vec!["cs.AI".into(), "cs.LG".into()]),
        max_results,
        page_size,
        delay: Duration::ZERO,
    }
}

fn ids(records: &[Record]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

fn ledger_on_disk(dir: &Path) -> serde_json::Map<String, serde_json::Value> {
    let text = std::fs::read_to_string(ledger_path(dir)).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn quota_takes_newest_and_marks_exactly_those() {
    let dir = TempDir::new().unwrap();
    let corpus = ["p7", "p6", "p5", "p4", "p3", "p2", "p1"];
    let mut engine = open(FakeArxiv::new(&corpus), dir.path());

    let found = engine.discover(&request(5, 20));

    assert_eq!(ids(&found.records), vec!["p7", "p6", "p5", "p4", "p3"]);
    assert_eq!(found.stop, StopReason::QuotaMet);
    assert!(found.ledger_persisted);
    let ledger = ledger_on_disk(dir.path());
    assert_eq!(ledger.len(), 5);
    assert!(!ledger.contains_key("p2"));
    assert!(!ledger.contains_key("p1"));
}

#[test]
fn query_sent_to_source() {
    let dir = TempDir::new().unwrap();
    let mut engine = open(FakeArxiv::new(&["p1"]), dir.path());
    engine.discover(&request(1, 5));
    assert_eq!(
        engine.source().queries.borrow()[0],
        "(cat:cs.AI OR cat:cs.LG) AND \"mechanistic interpretability\""
    );
}

#[test]
fn second_run_returns_only_unseen() {
    let dir = TempDir::new().unwrap();
    let corpus = ["p7", "p6", "p5", "p4", "p3", "p2", "p1"];

    let first = open(FakeArxiv::new(&corpus), dir.path()).discover(&request(5, 20));
    assert_eq!(first.records.len(), 5);

    // Fresh engine reloads the ledger from disk
    let second = open(FakeArxiv::new(&corpus), dir.path()).discover(&request(5, 20));
    assert_eq!(ids(&second.records), vec!["p2", "p1"]);
    assert_eq!(second.stop, StopReason::Exhausted);

    let third = open(FakeArxiv::new(&corpus), dir.path()).discover(&request(5, 20));
    assert!(third.records.is_empty());
    assert_eq!(ledger_on_disk(dir.path()).len(), 7);
}

#[test]
fn duplicates_across_pages_returned_once() {
    let dir = TempDir::new().unwrap();
    let corpus = ["p3", "p2", "p2", "p1", "p3"];
    let mut engine = open(FakeArxiv::new(&corpus), dir.path());

    let found = engine.discover(&request(10, 2));
    assert_eq!(ids(&found.records), vec!["p3", "p2", "p1"]);
}

#[test]
fn previously_seen_ids_skipped() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        ledger_path(dir.path()),
        r#"{"p2": "2024-01-01T00:00:00Z"}"#,
    )
    .unwrap();
    let mut engine = open(FakeArxiv::new(&["p3", "p2", "p1"]), dir.path());

    let found = engine.discover(&request(10, 20));
    assert_eq!(ids(&found.records), vec!["p3", "p1"]);
    // Old timestamp untouched
    assert_eq!(
        ledger_on_disk(dir.path())["p2"],
        serde_json::json!("2024-01-01T00:00:00Z")
    );
}

#[test]
fn enriched_cache_entry_reused_verbatim() {
    let dir = TempDir::new().unwrap();
    let cached = Record {
        summary: Some("Already summarized.".into()),
        authors: Some(vec!["Cached Author".into()]),
        ..Record::new("p2", "Cached Title", "http://example.com/p2")
    };
    let mut engine = open(FakeArxiv::new(&["p3", "p2", "p1"]), dir.path());
    engine.cache().put(&cached).unwrap();

    let found = engine.discover(&request(10, 20));
    assert_eq!(found.records[1], cached);
    assert_eq!(found.reused, 1);
    // Others are freshly converted
    assert_eq!(found.records[0].title, "Test Paper p3");
    assert_eq!(found.records[0].summary, None);
    assert_eq!(
        found.records[0].pdf_url.as_deref(),
        Some("https://arxiv.org/pdf/p3")
    );
}

#[test]
fn unenriched_cache_entry_ignored() {
    let dir = TempDir::new().unwrap();
    let mut engine = open(FakeArxiv::new(&["p1"]), dir.path());
    let stale = Record {
        summary: Some("   ".into()),
        ..Record::new("p1", "Stale Title", "u")
    };
    std::fs::write(
        engine.cache().path_for("p1"),
        serde_json::to_string(&stale).unwrap(),
    )
    .unwrap();

    let found = engine.discover(&request(10, 20));
    assert_eq!(found.records[0].title, "Test Paper p1");
    assert_eq!(found.reused, 0);
}

#[test]
fn all_seen_stops_after_three_pages() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        ledger_path(dir.path()),
        r#"{"s1": "t", "s2": "t"}"#,
    )
    .unwrap();
    let mut engine = open(FakeArxiv::repeating(&["s1", "s2"]), dir.path());

    let found = engine.discover(&request(5, 2));
    assert!(found.records.is_empty());
    assert_eq!(found.stop, StopReason::Stalled);
    assert_eq!(engine.source().calls.get(), 3);
}

#[test]
fn empty_query_fetches_nothing() {
    let dir = TempDir::new().unwrap();
    let mut engine = open(FakeArxiv::new(&["p1"]), dir.path());
    let found = engine.discover(&DiscoverRequest {
        search_terms: None,
        categories: Some(vec![]),
        delay: Duration::ZERO,
        ..Default::default()
    });
    assert!(found.records.is_empty());
    assert_eq!(found.stop, StopReason::EmptyQuery);
    assert_eq!(engine.source().page_calls.get(), 0);
    assert!(!ledger_path(dir.path()).exists());
}

#[test]
fn fetch_failure_keeps_earlier_pages() {
    let dir = TempDir::new().unwrap();
    let mut source = FakeArxiv::new(&["p4", "p3", "p2", "p1"]);
    source.fail_from = Some(2);
    let mut engine = open(source, dir.path());

    let found = engine.discover(&request(10, 2));
    assert_eq!(ids(&found.records), vec!["p4", "p3"]);
    assert!(matches!(found.stop, StopReason::FetchFailed(ref m) if m.contains("503")));
    assert_eq!(ledger_on_disk(dir.path()).len(), 2);
}

#[test]
fn failure_on_first_page_returns_empty() {
    let dir = TempDir::new().unwrap();
    let mut source = FakeArxiv::new(&["p1"]);
    source.fail_from = Some(0);
    let mut engine = open(source, dir.path());

    let found = engine.discover(&request(10, 2));
    assert!(found.records.is_empty());
    assert!(!ledger_path(dir.path()).exists());
}

#[test]
fn ledger_write_failure_still_returns_records() {
    let dir = TempDir::new().unwrap();
    // A directory where the ledger file should be makes the rename fail
    std::fs::create_dir(ledger_path(dir.path())).unwrap();
    let mut engine = open(FakeArxiv::new(&["p2", "p1"]), dir.path());

    let found = engine.discover(&request(10, 20));
    assert_eq!(found.records.len(), 2);
    assert!(!found.ledger_persisted);
}

#[test]
fn get_by_id_reports_failed_ledger_write() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(ledger_path(dir.path())).unwrap();
    let mut engine = open(FakeArxiv::new(&["p1"]), dir.path());

    let got = engine.get_by_id("p1").unwrap();
    assert_eq!(got.map(|r| r.id), Some("p1".to_string()));
    assert!(!engine.ledger_persisted());
}

#[test]
fn get_by_id_ledger_write_succeeds() {
    let dir = TempDir::new().unwrap();
    let mut engine = open(FakeArxiv::new(&["p1"]), dir.path());

    engine.get_by_id("p1").unwrap();
    assert!(engine.ledger_persisted());
    assert!(ledger_on_disk(dir.path()).contains_key("p1"));
}

#[test]
fn old_style_ids_match_last_segment_ledger() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        ledger_path(dir.path()),
        r#"{"9901001v1": "2020-01-01T00:00:00+00:00"}"#,
    )
    .unwrap();
    let mut engine = open(
        FakeArxiv::new(&["hep-th/9901002v1", "hep-th/9901001v1"]),
        dir.path(),
    );

    let found = engine.discover(&request(10, 20));
    assert_eq!(ids(&found.records), vec!["9901002v1"]);
    let ledger = ledger_on_disk(dir.path());
    assert!(ledger.contains_key("9901001v1"));
    assert!(ledger.contains_key("9901002v1"));
    assert!(!ledger.contains_key("hep-th/9901001v1"));
}

#[test]
fn get_by_id_prefers_enriched_cache() {
    let dir = TempDir::new().unwrap();
    let mut engine = open(FakeArxiv::new(&["p1"]), dir.path());
    let cached = Record {
        summary: Some("From cache.".into()),
        ..Record::new("p1", "Cached", "u")
    };
    engine.cache().put(&cached).unwrap();

    let got = engine.get_by_id("p1").unwrap();
    assert_eq!(got, Some(cached));
    assert_eq!(engine.source().id_calls.get(), 0);
    assert!(ledger_on_disk(dir.path()).contains_key("p1"));
}

#[test]
fn get_by_id_fetches_and_marks() {
    let dir = TempDir::new().unwrap();
    let mut engine = open(FakeArxiv::new(&["p2", "p1"]), dir.path());

    let got = engine.get_by_id("p1").unwrap().unwrap();
    assert_eq!(got.id, "p1");
    assert_eq!(got.title, "Test Paper p1");
    assert_eq!(engine.source().id_calls.get(), 1);

    // Fetched-by-id records are then excluded from discovery
    let found = engine.discover(&request(10, 20));
    assert_eq!(ids(&found.records), vec!["p2"]);
}

#[test]
fn get_by_id_keeps_existing_timestamp() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        ledger_path(dir.path()),
        r#"{"p1": "2020-01-01T00:00:00Z"}"#,
    )
    .unwrap();
    let mut engine = open(FakeArxiv::new(&["p1"]), dir.path());
    engine.get_by_id("p1").unwrap();
    assert_eq!(engine.ledger().get("p1"), Some("2020-01-01T00:00:00Z"));
}

#[test]
fn get_by_id_not_found() {
    let dir = TempDir::new().unwrap();
    let mut engine = open(FakeArxiv::new(&["p1"]), dir.path());
    assert_eq!(engine.get_by_id("nope").unwrap(), None);
    assert!(!ledger_path(dir.path()).exists());
}

#[test]
fn pdf_url_from_cache_or_source() {
    let dir = TempDir::new().unwrap();
    let engine = open(FakeArxiv::new(&["p1", "p2"]), dir.path());
    let cached = Record {
        summary: Some("s".into()),
        pdf_url: Some("https://example.com/p1.pdf".into()),
        ..Record::new("p1", "T", "u")
    };
    engine.cache().put(&cached).unwrap();

    assert_eq!(
        engine.pdf_url("p1").unwrap().as_deref(),
        Some("https://example.com/p1.pdf")
    );
    assert_eq!(
        engine.pdf_url("p2").unwrap().as_deref(),
        Some("https://arxiv.org/pdf/p2")
    );
    assert_eq!(engine.pdf_url("p3").unwrap(), None);
    assert!(!ledger_path(dir.path()).exists());
}

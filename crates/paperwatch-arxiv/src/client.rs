//! HTTP client for the arXiv export API

use paperwatch_core::{get_text, http_config, retry_with_backoff};

use crate::entry::RawEntry;
use crate::feed::{Feed, parse_feed};
use crate::source::{FetchError, PageSource};

/// Default arXiv API endpoint
pub const ARXIV_API_URL: &str = "https://export.arxiv.org/api/query";

/// [`PageSource`] backed by the live arXiv API.
#[derive(Debug, Clone)]
pub struct ArxivClient {
    base_url: String,
    max_retries: u32,
}

impl Default for ArxivClient {
    fn default() -> Self {
        Self::new(ARXIV_API_URL)
    }
}

impl ArxivClient {
    /// Client for `base_url`, retrying per the global HTTP config.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            max_retries: http_config().max_retries,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn query(&self, label: &str, params: &[(&str, String)]) -> Result<Feed, FetchError> {
        log::debug!("GET {} {:?}", self.base_url, params);
        let body = retry_with_backoff(label, self.max_retries, || get_text(&self.base_url, params))?;
        read_feed(&body)
    }
}

/// Query parameters for one newest-first search page.
pub fn page_params(query: &str, offset: usize, page_size: usize) -> Vec<(&'static str, String)> {
    vec![
        ("search_query", query.to_string()),
        ("start", offset.to_string()),
        ("max_results", page_size.to_string()),
        ("sortBy", "submittedDate".to_string()),
        ("sortOrder", "descending".to_string()),
    ]
}

/// Query parameters for a single-ID lookup.
pub fn id_params(id: &str) -> Vec<(&'static str, String)> {
    vec![("id_list", id.to_string()), ("max_results", "1".to_string())]
}

/// Parse a response body, turning an API error entry into [`FetchError::Api`].
pub fn read_feed(body: &str) -> Result<Feed, FetchError> {
    let feed = parse_feed(body).map_err(|e| FetchError::Parse(format!("{e:#}")))?;
    if let Some(message) = feed.error {
        return Err(FetchError::Api(message));
    }
    Ok(feed)
}

impl PageSource for ArxivClient {
    fn fetch_page(
        &self,
        query: &str,
        offset: usize,
        page_size: usize,
    ) -> Result<Vec<RawEntry>, FetchError> {
        let params = page_params(query, offset, page_size);
        let feed = self.query(&format!("arXiv page @{offset}"), &params)?;

        if feed.entries.is_empty() && feed.total_results.is_some_and(|total| total > offset) {
            log::warn!(
                "arXiv returned an empty page at offset {offset} of {} results",
                feed.total_results.unwrap_or_default()
            );
        }
        Ok(feed.entries)
    }

    fn fetch_by_id(&self, id: &str) -> Result<Option<RawEntry>, FetchError> {
        let params = id_params(id);
        let feed = self.query(&format!("arXiv id {id}"), &params)?;
        Ok(feed.entries.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_export_api() {
        let client = ArxivClient::default();
        assert_eq!(client.base_url(), ARXIV_API_URL);
    }

    fn param<'a>(params: &'a [(&str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn page_params_request_newest_first_window() {
        let params = page_params("cat:cs.AI AND \"sparse autoencoders\"", 40, 20);
        assert_eq!(
            param(&params, "search_query"),
            Some("cat:cs.AI AND \"sparse autoencoders\"")
        );
        assert_eq!(param(&params, "start"), Some("40"));
        assert_eq!(param(&params, "max_results"), Some("20"));
        assert_eq!(param(&params, "sortBy"), Some("submittedDate"));
        assert_eq!(param(&params, "sortOrder"), Some("descending"));
        assert_eq!(param(&params, "id_list"), None);
    }

    #[test]
    fn id_params_look_up_one_entry() {
        let params = id_params("2401.12345v1");
        assert_eq!(param(&params, "id_list"), Some("2401.12345v1"));
        assert_eq!(param(&params, "max_results"), Some("1"));
        assert_eq!(param(&params, "search_query"), None);
    }

    #[test]
    fn read_feed_maps_error_entry_to_api_error() {
        let body = r#"<feed xmlns="http://www.w3.org/2005/Atom">
          <entry>
            <id>http://arxiv.org/api/errors#incorrect_id_format_for_bogus</id>
            <title>Error</title>
            <summary>incorrect id format for bogus</summary>
          </entry>
        </feed>"#;
        match read_feed(body) {
            Err(FetchError::Api(msg)) => assert_eq!(msg, "incorrect id format for bogus"),
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[test]
    fn read_feed_maps_bad_xml_to_parse_error() {
        let body = "<feed><entry><id>x</id></oops></feed>";
        assert!(matches!(read_feed(body), Err(FetchError::Parse(_))));
    }

    #[test]
    fn read_feed_returns_entries() {
        let body = r#"<feed xmlns="http://www.w3.org/2005/Atom">
          <entry><id>http://arxiv.org/abs/2401.00001v1</id><title>One</title></entry>
        </feed>"#;
        let feed = read_feed(body).unwrap();
        assert_eq!(feed.entries.len(), 1);
        assert_eq!(feed.entries[0].record_id(), "2401.00001v1");
    }

    #[test]
    fn unreachable_host_is_stream_error() {
        // Port 9 (discard) on localhost is closed in test sandboxes
        let client = ArxivClient::new("http://127.0.0.1:9/api/query").with_max_retries(0);
        match client.fetch_page("cat:cs.AI", 0, 1) {
            Err(FetchError::Stream(_)) => {}
            other => panic!("expected stream error, got {other:?}"),
        }
    }
}

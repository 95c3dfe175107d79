//! The seam between discovery and the remote search service

use std::fmt;

use paperwatch_core::StreamError;

use crate::entry::RawEntry;

/// Errors from a search backend.
#[derive(Debug)]
pub enum FetchError {
    /// Transport failure (connection, timeout, non-2xx)
    Stream(StreamError),
    /// The service answered with an error document
    Api(String),
    /// The response body could not be parsed
    Parse(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Stream(e) => write!(f, "{e}"),
            FetchError::Api(msg) => write!(f, "arXiv API error: {msg}"),
            FetchError::Parse(msg) => write!(f, "failed to parse feed: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Stream(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StreamError> for FetchError {
    fn from(e: StreamError) -> Self {
        FetchError::Stream(e)
    }
}

/// A paged, newest-first search backend.
pub trait PageSource {
    /// Fetch up to `page_size` entries starting at `offset`.
    ///
    /// An empty page means the result set is exhausted.
    fn fetch_page(
        &self,
        query: &str,
        offset: usize,
        page_size: usize,
    ) -> Result<Vec<RawEntry>, FetchError>;

    /// Look up a single entry by ID. `Ok(None)` when it does not exist.
    fn fetch_by_id(&self, id: &str) -> Result<Option<RawEntry>, FetchError>;
}

impl<T: PageSource + ?Sized> PageSource for &T {
    fn fetch_page(
        &self,
        query: &str,
        offset: usize,
        page_size: usize,
    ) -> Result<Vec<RawEntry>, FetchError> {
        (**self).fetch_page(query, offset, page_size)
    }

    fn fetch_by_id(&self, id: &str) -> Result<Option<RawEntry>, FetchError> {
        (**self).fetch_by_id(id)
    }
}

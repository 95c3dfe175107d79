//! Raw arXiv entries and their conversion to [`Record`]s

use chrono::DateTime;
use paperwatch_store::Record;

/// One result as delivered by the arXiv API, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    /// Atom `<id>`, e.g. `http://arxiv.org/abs/2401.12345v1`
    pub entry_id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub abstract_text: String,
    pub categories: Vec<String>,
    pub primary_category: Option<String>,
    pub published: Option<String>,
    pub pdf_url: Option<String>,
    pub doi: Option<String>,
    pub comment: Option<String>,
}

/// Short ID from an abstract-page URL: its last non-empty path segment.
///
/// Old-style IDs lose their archive prefix, so
/// `http://arxiv.org/abs/hep-th/9901001v1` maps to `9901001v1`.
pub fn short_id(entry_id: &str) -> &str {
    let trimmed = entry_id.trim().trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

fn secure_url(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => url.to_string(),
    }
}

/// Reformat an RFC 3339 timestamp, keeping unparseable input as-is.
fn iso_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|_| raw.trim().to_string())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl RawEntry {
    /// Canonical record ID for this entry.
    pub fn record_id(&self) -> &str {
        short_id(&self.entry_id)
    }

    /// PDF link, upgraded to https, or derived from the ID when the feed
    /// carried none.
    pub fn pdf_link(&self) -> String {
        match &self.pdf_url {
            Some(url) => secure_url(url),
            None => format!("https://arxiv.org/pdf/{}", self.record_id()),
        }
    }

    /// Normalize into a [`Record`] with no summary.
    pub fn into_record(self) -> Record {
        let id = self.record_id().to_string();
        let pdf_url = self.pdf_link();
        let categories = (!self.categories.is_empty()).then_some(self.categories);
        Record {
            pdf_url: Some(pdf_url),
            doi: self.doi.and_then(non_blank),
            comment: self.comment.and_then(non_blank),
            published: self.published.as_deref().map(iso_timestamp),
            authors: Some(self.authors),
            abstract_text: non_blank(self.abstract_text),
            keywords: categories.clone(),
            categories,
            summary: None,
            ..Record::new(id, collapse_whitespace(&self.title), self.entry_id)
        }
    }
}

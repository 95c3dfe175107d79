//! Paper record: the unit stored in the content cache and handed downstream

use serde::{Deserialize, Serialize};

/// One discovered paper.
///
/// Serialized as a flat object with every field present; absent optional
/// values are written as explicit `null`. Field order follows the on-disk
/// cache layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    /// ISO-8601 timestamp
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub authors: Option<Vec<String>>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    /// Filled in by the summarizer, never by discovery
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

impl Record {
    /// Minimal record with only the always-present fields.
    pub fn new(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            pdf_url: None,
            doi: None,
            comment: None,
            published: None,
            authors: None,
            abstract_text: None,
            keywords: None,
            summary: None,
            categories: None,
        }
    }

    /// Enriched = summary present and not blank.
    pub fn is_enriched(&self) -> bool {
        self.summary.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

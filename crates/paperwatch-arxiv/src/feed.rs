//! arXiv Atom feed parser using quick-xml
//!
//! Elements are matched on local name, so `arxiv:doi` and
//! `opensearch:totalResults` are recognized whatever prefix the feed binds.

use anyhow::{Result, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::entry::RawEntry;

/// One parsed response page.
#[derive(Debug, Default)]
pub struct Feed {
    /// `opensearch:totalResults`, if present
    pub total_results: Option<usize>,
    pub entries: Vec<RawEntry>,
    /// Message of an API error entry
    pub error: Option<String>,
}

/// arXiv reports request errors as an entry whose id points here.
fn is_error_id(entry_id: &str) -> bool {
    entry_id.contains("arxiv.org/api/errors")
}

/// Parse an arXiv Atom response.
pub fn parse_feed(xml: &str) -> Result<Feed> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut feed = Feed::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"entry" => {
                    let entry = parse_entry(&mut reader)?;
                    if is_error_id(&entry.entry_id) {
                        let message = if entry.abstract_text.is_empty() {
                            entry.title
                        } else {
                            entry.abstract_text
                        };
                        feed.error = Some(message);
                    } else if entry.entry_id.is_empty() || entry.title.is_empty() {
                        log::debug!("Skipping placeholder entry: {:?}", entry.entry_id);
                    } else {
                        feed.entries.push(entry);
                    }
                }
                b"totalResults" => {
                    let text = read_text(&mut reader)?;
                    feed.total_results = text.trim().parse().ok();
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(feed)
}

fn parse_entry(reader: &mut Reader<&[u8]>) -> Result<RawEntry> {
    let mut entry = RawEntry::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"id" => entry.entry_id = read_text(reader)?.trim().to_string(),
                b"title" => entry.title = read_text(reader)?,
                b"summary" => entry.abstract_text = read_text(reader)?,
                b"published" => entry.published = Some(read_text(reader)?),
                b"author" => {
                    if let Some(name) = parse_author(reader)? {
                        entry.authors.push(name);
                    }
                }
                b"doi" => entry.doi = Some(read_text(reader)?),
                b"comment" => entry.comment = Some(read_text(reader)?),
                b"link" => {
                    apply_link(&e, &mut entry);
                    read_text(reader)?;
                }
                b"category" => {
                    apply_category(&e, &mut entry);
                    read_text(reader)?;
                }
                b"primary_category" => {
                    entry.primary_category = attr(&e, b"term");
                    read_text(reader)?;
                }
                _ => {
                    read_text(reader)?;
                }
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"link" => apply_link(&e, &mut entry),
                b"category" => apply_category(&e, &mut entry),
                b"primary_category" => entry.primary_category = attr(&e, b"term"),
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"entry" => break,
            Event::Eof => bail!("feed ends inside <entry>"),
            _ => {}
        }
        buf.clear();
    }

    Ok(entry)
}

fn parse_author(reader: &mut Reader<&[u8]>) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let mut name = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                if e.local_name().as_ref() == b"name" {
                    name = Some(read_text(reader)?.trim().to_string());
                } else {
                    // affiliation and friends
                    read_text(reader)?;
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"author" => break,
            Event::Eof => bail!("feed ends inside <author>"),
            _ => {}
        }
        buf.clear();
    }

    Ok(name.filter(|n| !n.is_empty()))
}

fn attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

/// The PDF link is the one titled `pdf` (or typed `application/pdf`).
fn apply_link(e: &BytesStart, entry: &mut RawEntry) {
    let is_pdf = attr(e, b"title").as_deref() == Some("pdf")
        || attr(e, b"type").as_deref() == Some("application/pdf");
    if is_pdf && entry.pdf_url.is_none() {
        entry.pdf_url = attr(e, b"href");
    }
}

fn apply_category(e: &BytesStart, entry: &mut RawEntry) {
    if let Some(term) = attr(e, b"term").filter(|t| !t.is_empty()) {
        if !entry.categories.contains(&term) {
            entry.categories.push(term);
        }
    }
}

/// Read text content of the current element, flattening nested tags.
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut buf = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::Start(_) => text.push_str(&read_text(reader)?),
            Event::End(_) => break,
            Event::Eof => bail!("feed ends inside an element"),
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

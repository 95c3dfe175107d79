//! Seen-record ledger: record ID → last-seen timestamp
//!
//! On-disk form is a single JSON object `{ "<id>": "<iso8601>" }`, read in
//! full by [`Ledger::load`] and rewritten in full by [`Ledger::flush`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::persist::write_json_atomic;

/// Current time as an RFC 3339 UTC timestamp.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// Durable set of already-surfaced record IDs.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl Ledger {
    /// Load the ledger at `path`.
    ///
    /// Never fails: a missing file starts an empty ledger, an unreadable or
    /// malformed one is logged and also starts empty. The file is only
    /// replaced on the next [`flush`](Self::flush).
    pub fn load(path: &Path) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!("ledger {}: malformed JSON ({e}), starting fresh", path.display());
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("ledger {} not found, starting fresh", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                log::warn!("ledger {}: unreadable ({e}), starting fresh", path.display());
                BTreeMap::new()
            }
        };
        log::debug!("ledger: {} seen records", entries.len());
        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Timestamp at which `id` was last marked.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Insert or refresh `id` (in memory only).
    pub fn mark(&mut self, id: &str, timestamp: &str) {
        self.entries.insert(id.to_string(), timestamp.to_string());
    }

    /// Insert `id` only if it is not present yet. Returns whether it was added.
    pub fn insert_if_absent(&mut self, id: &str, timestamp: &str) -> bool {
        if self.entries.contains_key(id) {
            return false;
        }
        self.entries.insert(id.to_string(), timestamp.to_string());
        true
    }

    /// Rewrite the whole ledger file.
    pub fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        write_json_atomic(&self.path, &self.entries)?;
        log::debug!(
            "ledger: wrote {} entries to {}",
            self.entries.len(),
            self.path.display()
        );
        Ok(())
    }
}

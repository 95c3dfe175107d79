//! Per-record content cache
//!
//! Directory layout:
//! ```text
//! {dir}/
//! ├── 2401.12345v1.json   # one enriched Record per file
//! └── ...
//! ```
//!
//! Only enriched records (non-blank `summary`) are ever written. Read
//! failures are cache misses, never errors.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::persist::write_json_atomic;
use crate::record::Record;

/// File-per-record store of enriched [`Record`]s.
#[derive(Debug, Clone)]
pub struct ContentCache {
    dir: PathBuf,
}

/// Map a record ID to a file stem that cannot leave the cache dir.
fn file_stem(id: &str) -> String {
    id.replace(['/', '\\'], "_")
}

impl ContentCache {
    /// Open (and create if needed) the cache directory.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create cache dir: {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the entry for `id`.
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(id)))
    }

    /// Read the entry for `id`, enriched or not.
    pub fn get(&self, id: &str) -> Option<Record> {
        let path = self.path_for(id);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("cache {}: unreadable ({e}), treating as miss", path.display());
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("cache {}: malformed JSON ({e}), treating as miss", path.display());
                None
            }
        }
    }

    /// Read the entry for `id` only if it is enriched.
    pub fn get_enriched(&self, id: &str) -> Option<Record> {
        self.get(id).filter(Record::is_enriched)
    }

    /// Persist `record` if it is enriched.
    ///
    /// Returns `Ok(false)` without touching disk for unenriched records.
    pub fn put(&self, record: &Record) -> Result<bool> {
        if !record.is_enriched() {
            log::debug!("cache: {} has no summary, not stored", record.id);
            return Ok(false);
        }
        let path = self.path_for(&record.id);
        write_json_atomic(&path, record)?;
        log::info!("Saved summary for {} to {}", record.id, path.display());
        Ok(true)
    }

    /// File stems of all cached entries, sorted.
    pub fn ids(&self) -> Result<Vec<String>> {
        let pattern = self.dir.join("*.json");
        let pattern_str = pattern.to_string_lossy();
        let mut ids: Vec<String> = glob::glob(&pattern_str)
            .context("invalid glob pattern")?
            .filter_map(|e| e.ok())
            .filter(|p| p.is_file())
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        ids.sort();
        Ok(ids)
    }
}

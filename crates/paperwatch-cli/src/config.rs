//! Configuration loading from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use paperwatch_arxiv::{ARXIV_API_URL, DiscoverRequest};
use paperwatch_core::HttpConfig;
use serde::Deserialize;

/// Global configuration for paperwatch
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub storage: StorageConfig,
    pub http: HttpSection,
}

/// Default search preset
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub terms: Vec<String>,
    pub categories: Vec<String>,
    pub max_results: usize,
    pub page_size: usize,
    pub delay_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            terms: vec!["mechanistic interpretability".to_string()],
            categories: vec!["cs.AI".into(), "cs.LG".into(), "cs.CL".into()],
            max_results: 10,
            page_size: 20,
            delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub ledger_path: PathBuf,
    pub cache_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from("seen_papers.json"),
            cache_dir: PathBuf::from("paper_summaries"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub base_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_retries: u32,
    pub user_agent: Option<String>,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            base_url: ARXIV_API_URL.to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_retries: 0,
            user_agent: None,
        }
    }
}

impl HttpSection {
    pub fn to_http_config(&self) -> HttpConfig {
        let defaults = HttpConfig::default();
        HttpConfig {
            request_timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            max_retries: self.max_retries,
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }
}

impl SearchConfig {
    /// Request built from the configured preset.
    pub fn to_request(&self) -> DiscoverRequest {
        DiscoverRequest {
            search_terms: Some(self.terms.clone()),
            categories: Some(self.categories.clone()),
            max_results: self.max_results,
            page_size: self.page_size,
            delay: Duration::from_millis(self.delay_ms),
        }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./paperwatch.toml (current directory)
    /// 2. ~/.config/paperwatch/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("paperwatch.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "paperwatch") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

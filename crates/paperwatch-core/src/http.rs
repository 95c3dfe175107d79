//! Shared HTTP client with explicit timeouts.
//!
//! Uses async reqwest on a shared tokio runtime, but presents a blocking
//! interface so callers can stay strictly sequential.

use std::sync::{LazyLock, OnceLock};
use std::time::Duration;

/// Transport settings applied to the shared client.
///
/// Must be installed with [`set_http_config`] before the first request;
/// the client is built lazily from whatever is installed at that point.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Upper bound for a whole request (connect + send + body)
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Extra attempts for retryable failures (0 = fail fast)
    pub max_retries: u32,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_retries: 0,
            user_agent: concat!("paperwatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

static HTTP_CONFIG: OnceLock<HttpConfig> = OnceLock::new();

/// Install the process-wide HTTP configuration (first call wins).
pub fn set_http_config(config: HttpConfig) {
    if HTTP_CONFIG.set(config).is_err() {
        log::warn!("HTTP config already initialised, ignoring override");
    }
}

/// Current HTTP configuration (defaults if never set).
pub fn http_config() -> &'static HttpConfig {
    HTTP_CONFIG.get_or_init(HttpConfig::default)
}

/// Error types for remote calls
#[derive(Debug)]
pub enum StreamError {
    /// HTTP error with optional status code
    Http {
        status: Option<u16>,
        message: String,
    },
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
        }
    }
}

impl std::error::Error for StreamError {}

impl StreamError {
    /// Create HTTP error from reqwest error
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }

    /// Rate limiting, server errors and connection-level failures are worth
    /// another attempt; other client errors are not.
    pub fn is_retryable(&self) -> bool {
        let Self::Http { status, .. } = self;
        match status {
            None => true,
            Some(429) => true,
            Some(s) => (500..=599).contains(s),
        }
    }
}

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    let config = http_config();
    reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .user_agent(config.user_agent.clone())
        .pool_max_idle_per_host(2)
        .build()
        .expect("failed to build HTTP client")
});

/// Get shared HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    &SHARED_CLIENT
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Blocking GET returning the response body as text.
///
/// Non-2xx responses become [`StreamError::Http`] with the status code set.
pub fn get_text(url: &str, query: &[(&str, String)]) -> Result<String, StreamError> {
    SHARED_RUNTIME.handle().block_on(async {
        let response = http_client()
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| StreamError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::Http {
                status: Some(status.as_u16()),
                message: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| StreamError::from_reqwest(&e))
    })
}

//! Paperwatch Core - Common infrastructure for paper discovery
//!
//! This crate provides the shared HTTP client and runtime, logging,
//! progress reporting, and shutdown handling used by the source crates
//! and the CLI.

pub mod http;
pub mod logging;
pub mod progress;
pub mod retry;
pub mod shutdown;

// Re-exports for convenience
pub use http::{
    HttpConfig, SHARED_RUNTIME, StreamError, get_text, http_client, http_config, set_http_config,
};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress, search_status};
pub use retry::retry_with_backoff;
pub use shutdown::{
    install_signal_handlers, is_shutdown_requested, request_shutdown, shutdown_flag,
    sleep_unless_shutdown,
};

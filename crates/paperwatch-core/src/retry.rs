//! Bounded retry with exponential backoff for remote calls

use std::time::Duration;

use crate::http::StreamError;
use crate::shutdown::sleep_unless_shutdown;

/// Exponential backoff: 2^attempt seconds (2s, 4s, 8s, ...)
pub const fn backoff_duration(attempt: u32) -> Duration {
    Duration::from_secs(2u64.pow(attempt))
}

/// Retry a fallible remote call up to `max_retries` extra times.
///
/// Only retryable errors (see [`StreamError::is_retryable`]) are retried.
/// A shutdown request during the backoff sleep ends the loop with the
/// last error.
pub fn retry_with_backoff<T>(
    label: &str,
    max_retries: u32,
    mut attempt_fn: impl FnMut() -> Result<T, StreamError>,
) -> Result<T, StreamError> {
    let mut attempt = 0u32;
    loop {
        match attempt_fn() {
            Ok(v) => return Ok(v),
            Err(e) if attempt < max_retries && e.is_retryable() => {
                attempt += 1;
                let delay = backoff_duration(attempt);
                log::warn!("{label}: attempt {attempt}/{max_retries} failed: {e}, retrying in {delay:?}");
                if !sleep_unless_shutdown(delay) {
                    return Err(e);
                }
            }
            Err(e) => {
                log::debug!("{label}: giving up: {e}");
                return Err(e);
            }
        }
    }
}

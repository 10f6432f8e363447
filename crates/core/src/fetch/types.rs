//! Types for the page fetch capability.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::FetchConfig;

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// URL that was requested.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response body decoded as text.
    pub body: String,
}

/// Errors that can occur while fetching a page.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    #[error("Server error {status}: {url}")]
    ServerError { url: String, status: u16 },

    #[error("Client error {status}: {url}")]
    ClientError { url: String, status: u16 },

    #[error("Gave up on {url} after {attempts} attempts: {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FetchError {
    /// Connection failures, HTTP 429 and HTTP 5xx are worth retrying; any
    /// other 4xx is final.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::Connection(_) | FetchError::TooManyRequests(_) | FetchError::ServerError { .. }
        )
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(url: &str, status: u16) -> Option<Self> {
        match status {
            429 => Some(FetchError::TooManyRequests(url.to_string())),
            s if s >= 500 => Some(FetchError::ServerError {
                url: url.to_string(),
                status: s,
            }),
            s if s >= 400 => Some(FetchError::ClientError {
                url: url.to_string(),
                status: s,
            }),
            _ => None,
        }
    }
}

/// How retryable failures are retried.
///
/// The pause after the n-th failure is `delay + (n - 1) * jitter`, capped at
/// `max_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
    pub jitter: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl RetryPolicy {
    /// Pause before the next attempt, after `failures` failed attempts.
    pub fn delay_after(&self, failures: u32) -> Duration {
        let extra = self.jitter * failures.saturating_sub(1);
        (self.delay + extra).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&FetchConfig::default())
    }
}

impl From<&FetchConfig> for RetryPolicy {
    fn from(config: &FetchConfig) -> Self {
        Self {
            delay: Duration::from_secs(config.retry_delay_secs),
            jitter: Duration::from_secs(config.retry_jitter_secs),
            max_delay: Duration::from_secs(config.retry_max_delay_secs),
            max_attempts: config.max_attempts,
        }
    }
}

/// Capability to fetch a page by URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a URL, retrying transient failures.
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

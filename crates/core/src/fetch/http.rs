//! HTTP fetcher backed by reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{BackoffLimiter, FetchError, FetchResponse, Fetcher, RetryPolicy};
use crate::config::FetchConfig;
use crate::metrics;

/// Fetches pages over HTTP with a politeness delay and bounded retries.
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
    limiter: Mutex<BackoffLimiter>,
}

impl HttpFetcher {
    /// Create a fetcher from configuration.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_store(true)
            .build()
            .map_err(|e| FetchError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            policy: RetryPolicy::from(config),
            limiter: Mutex::new(BackoffLimiter::new()),
        })
    }

    /// Replace the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    async fn fetch_once(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let wait = self.limiter.lock().await.next_delay(url);
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Connection(e.to_string()))?;

        let status = response.status().as_u16();
        if let Some(err) = FetchError::from_status(url, status) {
            return Err(err);
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Connection(e.to_string()))?;

        Ok(FetchResponse {
            url: url.to_string(),
            status,
            body,
        })
    }
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("policy", &self.policy)
            .finish()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let mut failures = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(response) => {
                    debug!(url, status = response.status, "Fetched page");
                    return Ok(response);
                }
                Err(e) if e.is_retryable() => {
                    failures += 1;
                    if failures >= self.policy.max_attempts {
                        return Err(FetchError::RetriesExhausted {
                            url: url.to_string(),
                            attempts: failures,
                            last: e.to_string(),
                        });
                    }
                    let delay = self.policy.delay_after(failures);
                    metrics::FETCH_RETRIES
                        .with_label_values(&[retry_reason(&e)])
                        .inc();
                    warn!(
                        url,
                        attempt = failures,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn retry_reason(err: &FetchError) -> &'static str {
    match err {
        FetchError::TooManyRequests(_) => "too_many_requests",
        FetchError::ServerError { .. } => "server_error",
        _ => "connection",
    }
}

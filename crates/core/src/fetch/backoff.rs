//! Adaptive politeness delay between requests.
//!
//! Requesting the same URL twice in a row means the previous attempt failed,
//! so the pause before each request grows; moving on to a different URL lets
//! it slowly decay again. One limiter is owned by each fetcher for the length
//! of a run.

use std::time::Duration;

use tracing::info;

const STEP_UP_MS: u64 = 500;
const STEP_DOWN_MS: u64 = 5;

/// Pause-before-request state for one fetcher.
#[derive(Debug, Default)]
pub struct BackoffLimiter {
    sleep_ms: u64,
    last_url: Option<String>,
}

impl BackoffLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request for `url` and return how long to wait before it.
    pub fn next_delay(&mut self, url: &str) -> Duration {
        if self.last_url.as_deref() == Some(url) {
            self.sleep_ms += STEP_UP_MS;
            info!(sleep_ms = self.sleep_ms, "Increased sleep time");
        } else {
            self.sleep_ms = self.sleep_ms.saturating_sub(STEP_DOWN_MS);
        }
        self.last_url = Some(url.to_string());
        Duration::from_millis(self.sleep_ms)
    }

    /// Current pause.
    pub fn current(&self) -> Duration {
        Duration::from_millis(self.sleep_ms)
    }
}

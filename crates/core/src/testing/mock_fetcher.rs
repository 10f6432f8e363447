//! Mock fetcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::fetch::{FetchError, FetchResponse, Fetcher};

/// Mock implementation of the Fetcher trait.
///
/// Responses are configured per URL; unknown URLs answer with a 404 client
/// error. Every requested URL is recorded in order.
pub struct MockFetcher {
    /// Configured outcome per URL.
    responses: Arc<RwLock<HashMap<String, Result<String, FetchError>>>>,
    /// Requested URLs.
    requests: Arc<RwLock<Vec<String>>>,
}

impl std::fmt::Debug for MockFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockFetcher")
            .field("responses", &"<responses>")
            .field("requests", &"<requests>")
            .finish()
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(RwLock::new(HashMap::new())),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Answer `url` with a 200 and the given body.
    pub async fn respond(&self, url: &str, body: impl Into<String>) {
        self.responses
            .write()
            .await
            .insert(url.to_string(), Ok(body.into()));
    }

    /// Answer `url` with an error.
    pub async fn fail(&self, url: &str, error: FetchError) {
        self.responses
            .write()
            .await
            .insert(url.to_string(), Err(error));
    }

    /// URLs requested so far.
    pub async fn recorded_urls(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.requests.write().await.push(url.to_string());

        match self.responses.read().await.get(url) {
            Some(Ok(body)) => Ok(FetchResponse {
                url: url.to_string(),
                status: 200,
                body: body.clone(),
            }),
            Some(Err(e)) => Err(e.clone()),
            None => Err(FetchError::ClientError {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

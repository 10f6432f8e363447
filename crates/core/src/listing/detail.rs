//! Torrent detail pages.

use thiserror::Error;
use tracing::debug;

use scraper::Html;

use super::extractor::selector;
use crate::fetch::{FetchError, Fetcher};

/// Errors raised while resolving a detail page.
#[derive(Debug, Error)]
pub enum DetailError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("No magnet link on {0}")]
    MagnetLinkNotFound(String),
}

/// First `magnet:` link on a detail page, if any.
pub fn parse_magnet_link(content: &str) -> Option<String> {
    let document = Html::parse_document(content);
    let anchors = selector("a[href]");
    document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.starts_with("magnet:"))
        .map(str::to_string)
}

/// Fetch a detail page and return its magnet link.
pub async fn fetch_magnet_link(fetcher: &dyn Fetcher, url: &str) -> Result<String, DetailError> {
    let response = fetcher.fetch(url).await?;
    let magnet = parse_magnet_link(&response.body)
        .ok_or_else(|| DetailError::MagnetLinkNotFound(url.to_string()))?;
    debug!(url, "Resolved magnet link");
    Ok(magnet)
}

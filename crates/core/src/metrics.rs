//! Prometheus metrics for ingestion, grouping and fetching.
//!
//! Metrics live in a private registry; [`encode_metrics`] renders them in the
//! text exposition format (suitable for a node-exporter textfile).

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Registry holding every titler metric.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// Ingestion
// =============================================================================

/// Listing pages ingested.
pub static PAGES_INGESTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("titler_pages_ingested_total", "Listing pages ingested").unwrap()
});

/// Records upserted by outcome.
pub static RECORDS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("titler_records_total", "Records upserted"),
        &["outcome"], // "created", "refreshed"
    )
    .unwrap()
});

/// Rows skipped because their subcategory is ignored.
pub static ROWS_SKIPPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "titler_rows_skipped_total",
        "Listing rows skipped as irrelevant",
    )
    .unwrap()
});

// =============================================================================
// Grouping
// =============================================================================

/// Titles created by grouping path.
pub static TITLES_CREATED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("titler_titles_created_total", "Titles created by grouping"),
        &["path"], // "episode", "season", "formula1", "tv_fallback", "movie", "movie_fallback"
    )
    .unwrap()
});

// =============================================================================
// Fetching
// =============================================================================

/// Fetch retries by reason.
pub static FETCH_RETRIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("titler_fetch_retries_total", "Page fetch retries"),
        &["reason"], // "connection", "too_many_requests", "server_error"
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
    registry.register(Box::new(PAGES_INGESTED.clone())).unwrap();
    registry.register(Box::new(RECORDS.clone())).unwrap();
    registry.register(Box::new(ROWS_SKIPPED.clone())).unwrap();
    registry.register(Box::new(TITLES_CREATED.clone())).unwrap();
    registry.register(Box::new(FETCH_RETRIES.clone())).unwrap();
}

/// Encode all metrics in Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

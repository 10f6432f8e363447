//! Page fetching.
//!
//! Listing and detail pages are fetched through the [`Fetcher`] trait so
//! parsing code can be tested against [`crate::testing::MockFetcher`].

mod backoff;
mod http;
mod types;

pub use backoff::BackoffLimiter;
pub use http::HttpFetcher;
pub use types::*;

pub mod config;
pub mod fetch;
pub mod grouping;
pub mod ingest;
pub mod listing;
pub mod metrics;
pub mod store;
pub mod testing;
pub mod titles;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, FetchConfig,
    GroupingConfig, SiteConfig,
};
pub use fetch::{BackoffLimiter, FetchError, FetchResponse, Fetcher, HttpFetcher, RetryPolicy};
pub use grouping::{display_name, order_by_similarity, Grouped, GroupingPath, TitleGrouper};
pub use ingest::{IngestError, IngestReport, Ingestor};
pub use listing::{Category, ListingError, RawRecord, Site, Subcategory};
pub use store::{
    MediaInfo, Record, Repository, SqliteStore, StoreError, Title, TitleDefaults, TitleStatus,
};
pub use titles::{
    assign_title, mark_titles, recompute_stats, refresh_titles, RefreshReport, TitleError,
};

//! Types for listing ingestion.

use std::ops::AddAssign;

use serde::Serialize;
use thiserror::Error;

use crate::grouping::Grouped;
use crate::listing::ListingError;
use crate::store::{Record, StoreError};

/// Counters for one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Pages read.
    pub pages: usize,
    /// Records seen for the first time.
    pub created: usize,
    /// Known records whose counters were refreshed.
    pub refreshed: usize,
    /// Rows skipped because their subcategory is ignored.
    pub skipped_rows: usize,
    /// Titles created while grouping.
    pub titles_created: usize,
}

impl AddAssign for IngestReport {
    fn add_assign(&mut self, other: Self) {
        self.pages += other.pages;
        self.created += other.created;
        self.refreshed += other.refreshed;
        self.skipped_rows += other.skipped_rows;
        self.titles_created += other.titles_created;
    }
}

/// Result of upserting one listing row.
#[derive(Debug, Clone)]
pub struct Upserted {
    /// The record as persisted.
    pub record: Record,
    /// The record did not exist before.
    pub created: bool,
    /// Set when the record was grouped during this upsert.
    pub grouped: Option<Grouped>,
}

/// Errors that abort ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error(transparent)]
    Listing(#[from] ListingError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

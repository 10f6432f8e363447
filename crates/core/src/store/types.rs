//! Stored records and titles.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::listing::{Category, RawRecord, Site, Subcategory};

/// Optional release details parsed from a record name.
///
/// Only filled by the media enrichment pass; grouping never reads them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// One listed torrent, identified by its detail page URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Detail page URL (unique).
    pub url: String,
    /// Site the record was listed on.
    pub site: Site,
    pub category: Category,
    pub subcategory: Subcategory,
    /// Release name as listed.
    pub name: String,
    /// Last seen seeders.
    pub seeders: u32,
    /// Last seen leechers.
    pub leechers: u32,
    pub uploaded_at: DateTime<Utc>,
    /// Size in bytes.
    pub size_bytes: u64,
    pub uploader: String,
    /// Text of the title this record is grouped under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub media: MediaInfo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// Build a new, ungrouped record from a listing row.
    pub fn from_raw(raw: RawRecord, site: Site, now: DateTime<Utc>) -> Self {
        Self {
            url: raw.url,
            site,
            category: raw.category,
            subcategory: raw.subcategory,
            name: raw.name,
            seeders: raw.seeders,
            leechers: raw.leechers,
            uploaded_at: raw.uploaded_at,
            size_bytes: raw.size_bytes,
            uploader: raw.uploader,
            title: None,
            media: MediaInfo::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the grouping engine handles this record's category.
    pub fn is_groupable(&self) -> bool {
        matches!(self.category, Category::Movies | Category::TvShows)
    }
}

/// Review status of a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TitleStatus {
    New,
    Skipped,
    Finished,
}

impl TitleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TitleStatus::New => "NEW",
            TitleStatus::Skipped => "SKIPPED",
            TitleStatus::Finished => "FINISHED",
        }
    }
}

impl fmt::Display for TitleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TitleStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(TitleStatus::New),
            "SKIPPED" => Ok(TitleStatus::Skipped),
            "FINISHED" => Ok(TitleStatus::Finished),
            other => Err(StoreError::Internal(format!("Unknown title status: {}", other))),
        }
    }
}

/// A canonical work (one movie, one episode, one season) grouping records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    /// Canonical text (unique).
    pub text: String,
    pub status: TitleStatus,
    /// When `status` last changed.
    pub status_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    /// Oldest upload among linked records, set by stats recomputation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earliest_upload_at: Option<DateTime<Utc>>,
    /// Newest upload among linked records, set by stats recomputation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_upload_at: Option<DateTime<Utc>>,
    /// Days since earliest plus days since latest upload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Title {
    /// Change the status and stamp the transition time.
    pub fn set_status(&mut self, status: TitleStatus, now: DateTime<Utc>) {
        self.status = status;
        self.status_at = now;
        self.updated_at = now;
    }
}

/// Initial field values for a title created by get-or-create.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleDefaults {
    pub status: TitleStatus,
    /// Creation time; also the initial `status_at`.
    pub at: DateTime<Utc>,
    pub year: Option<i32>,
    pub series: Option<String>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

impl TitleDefaults {
    /// Defaults for a NEW title with no derived fields.
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            status: TitleStatus::New,
            at,
            year: None,
            series: None,
            season: None,
            episode: None,
        }
    }

    /// Materialize a title with these defaults.
    pub fn into_title(self, text: &str) -> Title {
        Title {
            text: text.to_string(),
            status: self.status,
            status_at: self.at,
            year: self.year,
            series: self.series,
            season: self.season,
            episode: self.episode,
            earliest_upload_at: None,
            latest_upload_at: None,
            priority: None,
            created_at: self.at,
            updated_at: self.at,
        }
    }
}

/// Errors from the record/title repository.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

//! Listing ingestion.
//!
//! Upserts extracted rows into the store (one record per detail URL, later
//! sightings only refresh seeders and leechers) and groups every TV or movie
//! record that has no title yet. Pages are processed sequentially in
//! document order; the first error aborts the run.

mod types;

pub use types::*;

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::{GroupingConfig, SiteConfig};
use crate::grouping::{parse_media, TitleGrouper};
use crate::listing::{extract_rows, RawRecord, Site};
use crate::metrics;
use crate::store::{Record, Repository};

/// Feeds listing rows into a repository.
pub struct Ingestor<'a> {
    store: &'a dyn Repository,
    grouper: TitleGrouper,
    enrich_media: bool,
}

impl<'a> Ingestor<'a> {
    pub fn new(store: &'a dyn Repository, config: &GroupingConfig) -> Self {
        Self {
            store,
            grouper: TitleGrouper::new(config),
            enrich_media: config.enrich_media,
        }
    }

    /// Insert or refresh the record for `raw.url`, then group it if needed.
    pub fn upsert(
        &self,
        raw: RawRecord,
        site: Site,
        now: DateTime<Utc>,
    ) -> Result<Upserted, IngestError> {
        let (mut record, created) = match self.store.find_record_by_url(&raw.url)? {
            Some(mut existing) => {
                existing.seeders = raw.seeders;
                existing.leechers = raw.leechers;
                existing.updated_at = now;
                (existing, false)
            }
            None => {
                let mut record = Record::from_raw(raw, site, now);
                if self.enrich_media {
                    record.media = parse_media(&record.name);
                }
                (record, true)
            }
        };
        self.store.save_record(&record)?;

        let outcome = if created { "created" } else { "refreshed" };
        metrics::RECORDS.with_label_values(&[outcome]).inc();

        let grouped = if record.is_groupable() && record.title.is_none() {
            self.grouper.group_record(self.store, &mut record, now)?
        } else {
            None
        };

        debug!(
            url = %record.url,
            name = %record.name,
            outcome,
            title = record.title.as_deref().unwrap_or(""),
            "Upserted record"
        );

        Ok(Upserted {
            record,
            created,
            grouped,
        })
    }

    /// Extract and upsert every row of one page.
    pub fn ingest_page(
        &self,
        content: &str,
        site: Site,
        page: &str,
        now: DateTime<Utc>,
    ) -> Result<IngestReport, IngestError> {
        let extraction = extract_rows(content, site, page, now)?;
        metrics::ROWS_SKIPPED.inc_by(extraction.skipped as u64);

        let mut report = IngestReport {
            pages: 1,
            skipped_rows: extraction.skipped,
            ..IngestReport::default()
        };

        for raw in extraction.records {
            let upserted = self.upsert(raw, site, now)?;
            if upserted.created {
                report.created += 1;
            } else {
                report.refreshed += 1;
            }
            if upserted.grouped.is_some_and(|g| g.created) {
                report.titles_created += 1;
            }
        }

        metrics::PAGES_INGESTED.inc();
        info!(
            page,
            site = %site,
            created = report.created,
            refreshed = report.refreshed,
            "Ingested page"
        );
        Ok(report)
    }

    /// Ingest every `*.html` page of a site's page directory, in file name
    /// order. Invalid UTF-8 in a page is replaced rather than rejected.
    pub fn ingest_site(
        &self,
        site: &SiteConfig,
        now: DateTime<Utc>,
    ) -> Result<IngestReport, IngestError> {
        info!(site = %site.site, dir = %site.pages_dir.display(), "Ingesting site");

        let mut report = IngestReport::default();
        for path in page_files(&site.pages_dir)? {
            let bytes = std::fs::read(&path).map_err(|e| io_error(&path, e))?;
            let content = String::from_utf8_lossy(&bytes);
            report += self.ingest_page(&content, site.site, &path.display().to_string(), now)?;
        }

        info!(
            site = %site.site,
            pages = report.pages,
            created = report.created,
            refreshed = report.refreshed,
            titles_created = report.titles_created,
            "Finished site"
        );
        Ok(report)
    }
}

fn page_files(dir: &Path) -> Result<Vec<std::path::PathBuf>, IngestError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_error(dir, e))?;

    let mut pages = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| io_error(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "html") {
            pages.push(path);
        }
    }
    pages.sort();
    Ok(pages)
}

fn io_error(path: &Path, e: std::io::Error) -> IngestError {
    IngestError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::ListingError;
    use crate::store::{SqliteStore, TitleStatus};
    use crate::testing::fixtures;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_upsert_creates_then_refreshes() {
        let store = SqliteStore::in_memory().unwrap();
        let ingestor = Ingestor::new(&store, &GroupingConfig::default());

        let raw = fixtures::movie("Some.Movie.Title.2021.1080p.BluRay");
        let first = ingestor.upsert(raw.clone(), Site::LeetX, now()).unwrap();
        assert!(first.created);
        assert!(first.grouped.as_ref().unwrap().created);

        let mut again = raw;
        again.seeders = 1;
        again.leechers = 2;
        again.name = "ignored on refresh".to_string();
        let later = now() + chrono::Duration::hours(6);
        let second = ingestor.upsert(again, Site::Rarbg, later).unwrap();
        assert!(!second.created);
        assert!(second.grouped.is_none());
        assert_eq!(second.record.seeders, 1);
        assert_eq!(second.record.leechers, 2);
        assert_eq!(second.record.name, "Some.Movie.Title.2021.1080p.BluRay");
        assert_eq!(second.record.site, Site::LeetX);
        assert_eq!(second.record.created_at, now());
        assert_eq!(second.record.updated_at, later);

        assert_eq!(store.list_records().unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_regroups_record_whose_title_was_deleted() {
        let store = SqliteStore::in_memory().unwrap();
        let ingestor = Ingestor::new(&store, &GroupingConfig::default());
        let raw = fixtures::episode("Show.Name.S01E01.720p");

        ingestor.upsert(raw.clone(), Site::LeetX, now()).unwrap();
        store.delete_title("Show Name S01E01").unwrap();

        let upserted = ingestor.upsert(raw, Site::LeetX, now()).unwrap();
        assert!(upserted.grouped.unwrap().created);
        assert_eq!(upserted.record.title.as_deref(), Some("Show Name S01E01"));
    }

    #[test]
    fn test_games_are_not_grouped() {
        let store = SqliteStore::in_memory().unwrap();
        let ingestor = Ingestor::new(&store, &GroupingConfig::default());
        let upserted = ingestor
            .upsert(fixtures::game("Some.Game-CODEX"), Site::Rarbg, now())
            .unwrap();
        assert!(upserted.grouped.is_none());
        assert!(store.list_titles().unwrap().is_empty());
    }

    #[test]
    fn test_media_enrichment_is_optional() {
        let store = SqliteStore::in_memory().unwrap();
        let raw = fixtures::movie("Some.Movie.2021.1080p.WEBRip.x265");

        let plain = Ingestor::new(&store, &GroupingConfig::default());
        let upserted = plain.upsert(raw.clone(), Site::LeetX, now()).unwrap();
        assert_eq!(upserted.record.media.resolution, None);

        let other = SqliteStore::in_memory().unwrap();
        let config = GroupingConfig {
            enrich_media: true,
            ..GroupingConfig::default()
        };
        let enriched = Ingestor::new(&other, &config);
        let upserted = enriched.upsert(raw, Site::LeetX, now()).unwrap();
        assert_eq!(upserted.record.media.resolution.as_deref(), Some("1080p"));
        assert_eq!(upserted.record.media.video_codec.as_deref(), Some("x265"));
        // enrichment never changes the title
        assert_eq!(upserted.record.title.as_deref(), Some("Some Movie 2021"));
    }

    #[test]
    fn test_ingest_page_counts() {
        let store = SqliteStore::in_memory().unwrap();
        let ingestor = Ingestor::new(&store, &GroupingConfig::default());
        let html = fixtures::leetx_page(&[
            fixtures::leetx_row(54, "Some.Movie.Title.2021.1080p.BluRay", 10, 1),
            fixtures::leetx_row(41, "Show.Name.S02E05.1080p", 10, 1),
            fixtures::leetx_row(41, "Show.Name.S02E05.720p", 10, 1),
            fixtures::leetx_row(36, "Some.Ebook", 10, 1),
            fixtures::leetx_row(42, "Bad.Movie.720p.HDTS.Hindi", 10, 1),
        ]);

        let report = ingestor.ingest_page(&html, Site::LeetX, "top.html", now()).unwrap();
        assert_eq!(
            report,
            IngestReport {
                pages: 1,
                created: 4,
                refreshed: 0,
                skipped_rows: 1,
                titles_created: 3,
            }
        );

        let skipped = store
            .find_title_by_text("Bad.Movie.720p.HDTS.Hindi")
            .unwrap()
            .unwrap();
        assert_eq!(skipped.status, TitleStatus::Skipped);
    }

    #[test]
    fn test_ingest_page_stops_at_unknown_marker() {
        let store = SqliteStore::in_memory().unwrap();
        let ingestor = Ingestor::new(&store, &GroupingConfig::default());
        let html = fixtures::leetx_page(&[
            fixtures::leetx_row(54, "Fine.Movie.2020", 10, 1),
            fixtures::leetx_row(99, "Mystery", 10, 1),
        ]);

        let err = ingestor
            .ingest_page(&html, Site::LeetX, "p.html", now())
            .unwrap_err();
        assert!(matches!(
            err,
            IngestError::Listing(ListingError::UnknownSubcategory { .. })
        ));
        // extraction fails before anything is written
        assert!(store.list_records().unwrap().is_empty());
    }

    #[test]
    fn test_ingest_site_reads_html_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("b.html"),
            fixtures::leetx_page(&[fixtures::leetx_row(54, "Movie.B.2020", 5, 1)]),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("a.html"),
            fixtures::leetx_page(&[fixtures::leetx_row(54, "Movie.A.2020", 5, 1)]),
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a page").unwrap();

        let store = SqliteStore::in_memory().unwrap();
        let ingestor = Ingestor::new(&store, &GroupingConfig::default());
        let site = SiteConfig {
            site: Site::LeetX,
            pages_dir: dir.path().to_path_buf(),
            enabled: true,
        };

        let report = ingestor.ingest_site(&site, now()).unwrap();
        assert_eq!(report.pages, 2);
        assert_eq!(report.created, 2);

        let records = store.list_records().unwrap();
        assert!(records.iter().all(|r| r.site == Site::LeetX));
    }

    #[test]
    fn test_ingest_site_tolerates_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = fixtures::leetx_page(&[fixtures::leetx_row(54, "Movie.2020", 5, 1)])
            .into_bytes();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        std::fs::write(dir.path().join("page.html"), bytes).unwrap();

        let store = SqliteStore::in_memory().unwrap();
        let ingestor = Ingestor::new(&store, &GroupingConfig::default());
        let site = SiteConfig {
            site: Site::LeetX,
            pages_dir: dir.path().to_path_buf(),
            enabled: true,
        };
        assert_eq!(ingestor.ingest_site(&site, now()).unwrap().created, 1);
    }

    #[test]
    fn test_ingest_site_missing_dir() {
        let store = SqliteStore::in_memory().unwrap();
        let ingestor = Ingestor::new(&store, &GroupingConfig::default());
        let site = SiteConfig {
            site: Site::LeetX,
            pages_dir: "/nonexistent/pages".into(),
            enabled: true,
        };
        assert!(matches!(
            ingestor.ingest_site(&site, now()),
            Err(IngestError::Io { .. })
        ));
    }
}

//! SQLite-backed record/title store.

use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{MediaInfo, Record, Repository, StoreError, Title, TitleDefaults};

const RECORD_COLUMNS: &str = "url, site, category, subcategory, name, seeders, leechers, \
     uploaded_at, size_bytes, uploader, title_text, video_codec, audio_codec, source, \
     resolution, year, subtitle, language, created_at, updated_at";

const TITLE_COLUMNS: &str = "text, status, status_at, year, series, season, episode, \
     earliest_upload_at, latest_upload_at, priority, created_at, updated_at";

/// SQLite-backed store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at `path`, creating tables if needed.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS titles (
                text TEXT PRIMARY KEY,
                status TEXT NOT NULL,
                status_at TEXT NOT NULL,
                year INTEGER,
                series TEXT,
                season INTEGER,
                episode INTEGER,
                earliest_upload_at TEXT,
                latest_upload_at TEXT,
                priority INTEGER,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_titles_status ON titles(status);

            CREATE TABLE IF NOT EXISTS records (
                url TEXT PRIMARY KEY,
                site TEXT NOT NULL,
                category TEXT NOT NULL,
                subcategory TEXT NOT NULL,
                name TEXT NOT NULL,
                seeders INTEGER NOT NULL,
                leechers INTEGER NOT NULL,
                uploaded_at TEXT NOT NULL,
                size_bytes INTEGER NOT NULL,
                uploader TEXT NOT NULL,
                title_text TEXT REFERENCES titles(text) ON DELETE SET NULL,
                video_codec TEXT,
                audio_codec TEXT,
                source TEXT,
                resolution TEXT,
                year INTEGER,
                subtitle TEXT,
                language TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_records_title ON records(title_text);
            "#,
        )?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Internal("store connection lock poisoned".to_string()))
    }

    fn row_to_record(row: &Row) -> rusqlite::Result<Record> {
        Ok(Record {
            url: row.get(0)?,
            site: parse_text(row, 1)?,
            category: parse_text(row, 2)?,
            subcategory: parse_text(row, 3)?,
            name: row.get(4)?,
            seeders: row.get(5)?,
            leechers: row.get(6)?,
            uploaded_at: parse_time(row, 7)?,
            size_bytes: row.get(8)?,
            uploader: row.get(9)?,
            title: row.get(10)?,
            media: MediaInfo {
                video_codec: row.get(11)?,
                audio_codec: row.get(12)?,
                source: row.get(13)?,
                resolution: row.get(14)?,
                year: row.get(15)?,
                subtitle: row.get(16)?,
                language: row.get(17)?,
            },
            created_at: parse_time(row, 18)?,
            updated_at: parse_time(row, 19)?,
        })
    }

    fn row_to_title(row: &Row) -> rusqlite::Result<Title> {
        Ok(Title {
            text: row.get(0)?,
            status: parse_text(row, 1)?,
            status_at: parse_time(row, 2)?,
            year: row.get(3)?,
            series: row.get(4)?,
            season: row.get(5)?,
            episode: row.get(6)?,
            earliest_upload_at: parse_optional_time(row, 7)?,
            latest_upload_at: parse_optional_time(row, 8)?,
            priority: row.get(9)?,
            created_at: parse_time(row, 10)?,
            updated_at: parse_time(row, 11)?,
        })
    }

    fn query_records(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Record>, StoreError> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, Self::row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

/// Timestamps are stored as fixed-width RFC 3339 text so they sort correctly.
fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn optional_timestamp(dt: &Option<DateTime<Utc>>) -> Option<String> {
    dt.as_ref().map(timestamp)
}

fn parse_time(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_optional_time(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|text| {
        DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn parse_text<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl Repository for SqliteStore {
    fn find_record_by_url(&self, url: &str) -> Result<Option<Record>, StoreError> {
        let conn = self.conn()?;
        let record = conn
            .query_row(
                &format!("SELECT {} FROM records WHERE url = ?1", RECORD_COLUMNS),
                params![url],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn save_record(&self, record: &Record) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO records ({}) VALUES
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
                 ON CONFLICT(url) DO UPDATE SET
                    site = excluded.site,
                    category = excluded.category,
                    subcategory = excluded.subcategory,
                    name = excluded.name,
                    seeders = excluded.seeders,
                    leechers = excluded.leechers,
                    uploaded_at = excluded.uploaded_at,
                    size_bytes = excluded.size_bytes,
                    uploader = excluded.uploader,
                    title_text = excluded.title_text,
                    video_codec = excluded.video_codec,
                    audio_codec = excluded.audio_codec,
                    source = excluded.source,
                    resolution = excluded.resolution,
                    year = excluded.year,
                    subtitle = excluded.subtitle,
                    language = excluded.language,
                    updated_at = excluded.updated_at",
                RECORD_COLUMNS
            ),
            params![
                record.url,
                record.site.as_str(),
                record.category.as_str(),
                record.subcategory.as_str(),
                record.name,
                record.seeders,
                record.leechers,
                timestamp(&record.uploaded_at),
                record.size_bytes,
                record.uploader,
                record.title,
                record.media.video_codec,
                record.media.audio_codec,
                record.media.source,
                record.media.resolution,
                record.media.year,
                record.media.subtitle,
                record.media.language,
                timestamp(&record.created_at),
                timestamp(&record.updated_at),
            ],
        )?;
        Ok(())
    }

    fn find_title_by_text(&self, text: &str) -> Result<Option<Title>, StoreError> {
        let conn = self.conn()?;
        let title = conn
            .query_row(
                &format!("SELECT {} FROM titles WHERE text = ?1", TITLE_COLUMNS),
                params![text],
                Self::row_to_title,
            )
            .optional()?;
        Ok(title)
    }

    fn get_or_create_title(
        &self,
        text: &str,
        defaults: &TitleDefaults,
    ) -> Result<(Title, bool), StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let at = timestamp(&defaults.at);
        let inserted = tx.execute(
            &format!(
                "INSERT INTO titles ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, NULL, NULL, ?3, ?3)
                 ON CONFLICT(text) DO NOTHING",
                TITLE_COLUMNS
            ),
            params![
                text,
                defaults.status.as_str(),
                at,
                defaults.year,
                defaults.series,
                defaults.season,
                defaults.episode,
            ],
        )?;

        let title = tx.query_row(
            &format!("SELECT {} FROM titles WHERE text = ?1", TITLE_COLUMNS),
            params![text],
            Self::row_to_title,
        )?;
        tx.commit()?;

        Ok((title, inserted == 1))
    }

    fn save_title(&self, title: &Title) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO titles ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                 ON CONFLICT(text) DO UPDATE SET
                    status = excluded.status,
                    status_at = excluded.status_at,
                    year = excluded.year,
                    series = excluded.series,
                    season = excluded.season,
                    episode = excluded.episode,
                    earliest_upload_at = excluded.earliest_upload_at,
                    latest_upload_at = excluded.latest_upload_at,
                    priority = excluded.priority,
                    updated_at = excluded.updated_at",
                TITLE_COLUMNS
            ),
            params![
                title.text,
                title.status.as_str(),
                timestamp(&title.status_at),
                title.year,
                title.series,
                title.season,
                title.episode,
                optional_timestamp(&title.earliest_upload_at),
                optional_timestamp(&title.latest_upload_at),
                title.priority,
                timestamp(&title.created_at),
                timestamp(&title.updated_at),
            ],
        )?;
        Ok(())
    }

    fn records_for_title(&self, text: &str) -> Result<Vec<Record>, StoreError> {
        let conn = self.conn()?;
        Self::query_records(
            &conn,
            &format!(
                "SELECT {} FROM records WHERE title_text = ?1 ORDER BY uploaded_at, url",
                RECORD_COLUMNS
            ),
            params![text],
        )
    }

    fn list_titles(&self) -> Result<Vec<Title>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM titles ORDER BY text",
            TITLE_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::row_to_title)?;

        let mut titles = Vec::new();
        for row in rows {
            titles.push(row?);
        }
        Ok(titles)
    }

    fn delete_title(&self, text: &str) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM titles WHERE text = ?1", params![text])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("title '{}'", text)));
        }
        Ok(())
    }

    fn list_records(&self) -> Result<Vec<Record>, StoreError> {
        let conn = self.conn()?;
        Self::query_records(
            &conn,
            &format!("SELECT {} FROM records ORDER BY url", RECORD_COLUMNS),
            [],
        )
    }
}

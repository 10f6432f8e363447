//! Title grouping.
//!
//! Every TV and movie record is linked to exactly one [`Title`], found or
//! created by a canonical text derived from the release name. TV names go
//! through [`tv::tv_key`], movie names through [`movie::movie_key`]; both
//! are total, so every record gets a title.

pub mod display;
pub mod media;
pub mod movie;
pub mod similarity;
pub mod tv;

pub use display::display_name;
pub use media::parse_media;
pub use movie::{has_skip_token, movie_key, normalize_movie_name, DEFAULT_SKIP_TOKENS};
pub use similarity::{order_by_similarity, similarity, SimilarityKey, SIMILARITY_CUTOFF};
pub use tv::tv_key;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::GroupingConfig;
use crate::listing::Category;
use crate::metrics;
use crate::store::{Record, Repository, StoreError, Title, TitleDefaults, TitleStatus};

/// Which rule produced a title key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupingPath {
    /// `<series>SxxEyy`
    Episode,
    /// `<series>Sxx`
    Season,
    /// Formula 1 round
    Formula1,
    /// TV name used verbatim
    TvFallback,
    /// Movie name up to its release year
    Movie,
    /// Movie name used verbatim
    MovieFallback,
}

impl GroupingPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupingPath::Episode => "episode",
            GroupingPath::Season => "season",
            GroupingPath::Formula1 => "formula1",
            GroupingPath::TvFallback => "tv_fallback",
            GroupingPath::Movie => "movie",
            GroupingPath::MovieFallback => "movie_fallback",
        }
    }
}

/// Canonical text of a title plus the fields it seeds on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleKey {
    pub text: String,
    pub path: GroupingPath,
    pub year: Option<i32>,
    pub series: Option<String>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

impl TitleKey {
    /// A key with only a text.
    pub fn plain(text: &str, path: GroupingPath) -> Self {
        Self {
            text: text.to_string(),
            path,
            year: None,
            series: None,
            season: None,
            episode: None,
        }
    }

    fn defaults(&self, status: TitleStatus, at: DateTime<Utc>) -> TitleDefaults {
        TitleDefaults {
            status,
            at,
            year: self.year,
            series: self.series.clone(),
            season: self.season,
            episode: self.episode,
        }
    }
}

/// Outcome of grouping one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouped {
    pub title: Title,
    /// The title did not exist before.
    pub created: bool,
    pub path: GroupingPath,
}

/// Links records to titles.
#[derive(Debug, Clone)]
pub struct TitleGrouper {
    skip_tokens: Vec<String>,
}

impl Default for TitleGrouper {
    fn default() -> Self {
        Self::new(&GroupingConfig::default())
    }
}

impl TitleGrouper {
    pub fn new(config: &GroupingConfig) -> Self {
        Self {
            skip_tokens: config
                .skip_tokens
                .iter()
                .map(|t| t.to_lowercase())
                .collect(),
        }
    }

    /// Title key for a record, or `None` for categories that are not grouped.
    pub fn title_key(&self, record: &Record) -> Option<TitleKey> {
        match record.category {
            Category::TvShows => Some(tv_key(&record.name)),
            Category::Movies => Some(movie_key(&record.name)),
            Category::Games => None,
        }
    }

    /// Review status a movie name earns on grouping.
    pub fn movie_status(&self, name: &str) -> TitleStatus {
        if has_skip_token(&normalize_movie_name(name), &self.skip_tokens) {
            TitleStatus::Skipped
        } else {
            TitleStatus::New
        }
    }

    /// Link an ungrouped TV or movie record to its title and persist both.
    ///
    /// Records that already have a title, and records of other categories,
    /// are left untouched and yield `None`.
    ///
    /// Movies also set the title's status from the release name: SKIPPED
    /// when a skip token is present, NEW otherwise. The status is written and
    /// `status_at` stamped on every movie grouping, whatever the title held
    /// before.
    pub fn group_record(
        &self,
        store: &dyn Repository,
        record: &mut Record,
        now: DateTime<Utc>,
    ) -> Result<Option<Grouped>, StoreError> {
        if record.title.is_some() {
            return Ok(None);
        }
        let Some(key) = self.title_key(record) else {
            return Ok(None);
        };

        let status = match record.category {
            Category::Movies => Some(self.movie_status(&record.name)),
            _ => None,
        };

        let defaults = key.defaults(status.unwrap_or(TitleStatus::New), now);
        let (mut title, created) = store.get_or_create_title(&key.text, &defaults)?;

        if created {
            metrics::TITLES_CREATED
                .with_label_values(&[key.path.as_str()])
                .inc();
            info!(title = %title.text, path = key.path.as_str(), "Created title");
        } else if let Some(status) = status {
            debug!(title = %title.text, from = %title.status, to = %status, "Setting title status");
            title.set_status(status, now);
            store.save_title(&title)?;
        }

        record.title = Some(title.text.clone());
        record.updated_at = now;
        store.save_record(record)?;

        Ok(Some(Grouped {
            title,
            created,
            path: key.path,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::Site;
    use crate::store::SqliteStore;
    use crate::testing::fixtures;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn saved(store: &SqliteStore, raw: crate::listing::RawRecord) -> Record {
        let record = Record::from_raw(raw, Site::LeetX, now());
        store.save_record(&record).unwrap();
        record
    }

    #[test]
    fn test_groups_episode() {
        let store = SqliteStore::in_memory().unwrap();
        let grouper = TitleGrouper::default();
        let mut record = saved(&store, fixtures::episode("Show.Name.S02E05.1080p"));

        let grouped = grouper.group_record(&store, &mut record, now()).unwrap().unwrap();
        assert!(grouped.created);
        assert_eq!(grouped.path, GroupingPath::Episode);
        assert_eq!(grouped.title.text, "Show Name S02E05");
        assert_eq!(grouped.title.series.as_deref(), Some("Show Name"));
        assert_eq!(grouped.title.season, Some(2));
        assert_eq!(grouped.title.episode, Some(5));
        assert_eq!(grouped.title.status, TitleStatus::New);

        let stored = store.find_record_by_url(&record.url).unwrap().unwrap();
        assert_eq!(stored.title.as_deref(), Some("Show Name S02E05"));
    }

    #[test]
    fn test_same_episode_shares_title() {
        let store = SqliteStore::in_memory().unwrap();
        let grouper = TitleGrouper::default();
        let mut first = saved(&store, fixtures::episode("Show.Name.S02E05.720p"));
        let mut second = saved(&store, fixtures::episode("Show Name S02E05 1080p WEB"));

        let a = grouper.group_record(&store, &mut first, now()).unwrap().unwrap();
        let b = grouper.group_record(&store, &mut second, now()).unwrap().unwrap();
        assert!(a.created);
        assert!(!b.created);
        assert_eq!(a.title.text, b.title.text);
        assert_eq!(store.records_for_title(&a.title.text).unwrap().len(), 2);
    }

    #[test]
    fn test_new_movie() {
        let store = SqliteStore::in_memory().unwrap();
        let grouper = TitleGrouper::default();
        let mut record = saved(&store, fixtures::movie("Some.Movie.Title.2021.1080p.BluRay"));

        let grouped = grouper.group_record(&store, &mut record, now()).unwrap().unwrap();
        assert_eq!(grouped.title.text, "Some Movie Title 2021");
        assert_eq!(grouped.title.year, Some(2021));
        assert_eq!(grouped.title.status, TitleStatus::New);
        assert_eq!(grouped.title.status_at, now());
    }

    #[test]
    fn test_skipped_movie() {
        let store = SqliteStore::in_memory().unwrap();
        let grouper = TitleGrouper::default();
        let mut record = saved(&store, fixtures::movie("Bad.Movie.720p.HDTS.Hindi"));

        let grouped = grouper.group_record(&store, &mut record, now()).unwrap().unwrap();
        assert_eq!(grouped.path, GroupingPath::MovieFallback);
        assert_eq!(grouped.title.text, "Bad.Movie.720p.HDTS.Hindi");
        assert_eq!(grouped.title.status, TitleStatus::Skipped);
    }

    #[test]
    fn test_better_release_revives_skipped_title() {
        let store = SqliteStore::in_memory().unwrap();
        let grouper = TitleGrouper::default();
        let mut cam = saved(&store, fixtures::movie("Some.Movie.2023.HDTS.x264"));
        let mut good = saved(&store, fixtures::movie("Some.Movie.2023.1080p.WEB"));

        grouper.group_record(&store, &mut cam, now()).unwrap();
        let later = now() + chrono::Duration::days(10);
        let grouped = grouper.group_record(&store, &mut good, later).unwrap().unwrap();

        assert!(!grouped.created);
        assert_eq!(grouped.title.status, TitleStatus::New);
        assert_eq!(grouped.title.status_at, later);
        let stored = store.find_title_by_text("Some Movie 2023").unwrap().unwrap();
        assert_eq!(stored.status, TitleStatus::New);
    }

    #[test]
    fn test_movie_grouping_overwrites_finished_status() {
        let store = SqliteStore::in_memory().unwrap();
        let grouper = TitleGrouper::default();
        let mut first = saved(&store, fixtures::movie("Some.Movie.2023.1080p"));
        let grouped = grouper.group_record(&store, &mut first, now()).unwrap().unwrap();

        let mut title = grouped.title;
        title.set_status(TitleStatus::Finished, now());
        store.save_title(&title).unwrap();

        let later = now() + chrono::Duration::days(5);
        let mut second = saved(&store, fixtures::movie("Some.Movie.2023.HDTS"));
        let grouped = grouper.group_record(&store, &mut second, later).unwrap().unwrap();
        assert_eq!(grouped.title.status, TitleStatus::Skipped);
        assert_eq!(grouped.title.status_at, later);

        let stored = store.find_title_by_text("Some Movie 2023").unwrap().unwrap();
        assert_eq!(stored.status, TitleStatus::Skipped);
        assert_eq!(stored.status_at, later);
    }

    #[test]
    fn test_unchanged_movie_status_is_restamped() {
        let store = SqliteStore::in_memory().unwrap();
        let grouper = TitleGrouper::default();
        let mut first = saved(&store, fixtures::movie("Other.Movie.2022.1080p"));
        grouper.group_record(&store, &mut first, now()).unwrap();

        let later = now() + chrono::Duration::days(5);
        let mut second = saved(&store, fixtures::movie("Other.Movie.2022.WEB"));
        let grouped = grouper.group_record(&store, &mut second, later).unwrap().unwrap();
        assert!(!grouped.created);
        assert_eq!(grouped.title.status, TitleStatus::New);
        assert_eq!(grouped.title.status_at, later);

        let stored = store.find_title_by_text("Other Movie 2022").unwrap().unwrap();
        assert_eq!(stored.status_at, later);
        assert_eq!(stored.created_at, now());
    }

    #[test]
    fn test_tv_grouping_leaves_status_alone() {
        let store = SqliteStore::in_memory().unwrap();
        let grouper = TitleGrouper::default();
        let mut first = saved(&store, fixtures::episode("Show.Name.S01E01.720p"));
        let grouped = grouper.group_record(&store, &mut first, now()).unwrap().unwrap();

        let mut title = grouped.title;
        title.set_status(TitleStatus::Finished, now());
        store.save_title(&title).unwrap();

        let later = now() + chrono::Duration::days(5);
        let mut second = saved(&store, fixtures::episode("Show.Name.S01E01.1080p"));
        let grouped = grouper.group_record(&store, &mut second, later).unwrap().unwrap();
        assert_eq!(grouped.title.status, TitleStatus::Finished);
        assert_eq!(grouped.title.status_at, now());
    }

    #[test]
    fn test_games_and_grouped_records_are_left_alone() {
        let store = SqliteStore::in_memory().unwrap();
        let grouper = TitleGrouper::default();

        let mut game = saved(&store, fixtures::game("Some.Game-CODEX"));
        assert!(grouper.group_record(&store, &mut game, now()).unwrap().is_none());
        assert_eq!(game.title, None);

        let mut movie = saved(&store, fixtures::movie("Some.Movie.2021.1080p"));
        grouper.group_record(&store, &mut movie, now()).unwrap();
        assert!(grouper.group_record(&store, &mut movie, now()).unwrap().is_none());
        assert_eq!(store.list_titles().unwrap().len(), 1);
    }

    #[test]
    fn test_custom_skip_tokens() {
        let grouper = TitleGrouper::new(&GroupingConfig {
            skip_tokens: vec!["REMUX".to_string()],
            enrich_media: false,
        });
        assert_eq!(grouper.movie_status("Movie.2020.2160p.Remux"), TitleStatus::Skipped);
        assert_eq!(grouper.movie_status("Movie.2020.HDTS"), TitleStatus::New);
    }
}

//! Record and title persistence.
//!
//! Records are keyed by their detail page URL and titles by their canonical
//! text. A record references at most one title; deleting the title clears
//! the reference.

mod sqlite;
mod types;

pub use sqlite::SqliteStore;
pub use types::*;

/// Trait for record/title storage.
pub trait Repository: Send + Sync {
    /// Look up a record by URL.
    fn find_record_by_url(&self, url: &str) -> Result<Option<Record>, StoreError>;

    /// Insert or update a record, keyed by URL.
    fn save_record(&self, record: &Record) -> Result<(), StoreError>;

    /// Look up a title by its canonical text.
    fn find_title_by_text(&self, text: &str) -> Result<Option<Title>, StoreError>;

    /// Fetch the title with this text, creating it from `defaults` if absent.
    ///
    /// Atomic: concurrent callers with the same text end up with the same
    /// title and exactly one of them sees `created == true`.
    fn get_or_create_title(
        &self,
        text: &str,
        defaults: &TitleDefaults,
    ) -> Result<(Title, bool), StoreError>;

    /// Insert or update a title, keyed by text.
    fn save_title(&self, title: &Title) -> Result<(), StoreError>;

    /// Records grouped under a title, oldest upload first.
    fn records_for_title(&self, text: &str) -> Result<Vec<Record>, StoreError>;

    /// All titles, ordered by text.
    fn list_titles(&self) -> Result<Vec<Title>, StoreError>;

    /// Delete a title. Records that referenced it become ungrouped.
    fn delete_title(&self, text: &str) -> Result<(), StoreError>;

    /// All records, ordered by URL.
    fn list_records(&self) -> Result<Vec<Record>, StoreError>;
}

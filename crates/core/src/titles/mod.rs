//! Title maintenance: upload statistics, cleanup, status changes and manual
//! record assignment.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::store::{Record, Repository, StoreError, Title, TitleStatus};

/// Errors from title maintenance.
#[derive(Debug, Error)]
pub enum TitleError {
    #[error("No records to aggregate for title '{0}'")]
    AggregationUnavailable(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Summary of a [`refresh_titles`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    /// Titles removed because no record references them.
    pub deleted: usize,
    /// Titles whose statistics were recomputed.
    pub updated: usize,
}

/// Days since the earliest upload plus days since the latest upload.
pub fn compute_priority(
    earliest: DateTime<Utc>,
    latest: DateTime<Utc>,
    now: DateTime<Utc>,
) -> i64 {
    (now - earliest).num_days() + (now - latest).num_days()
}

/// Recompute upload bounds and priority of a title from its records.
pub fn recompute_stats(
    store: &dyn Repository,
    text: &str,
    now: DateTime<Utc>,
) -> Result<Title, TitleError> {
    let mut title = find_title(store, text)?;
    let records = store.records_for_title(text)?;
    update_stats(&mut title, &records, now)?;
    store.save_title(&title)?;
    Ok(title)
}

fn update_stats(
    title: &mut Title,
    records: &[Record],
    now: DateTime<Utc>,
) -> Result<(), TitleError> {
    let earliest = records.iter().map(|r| r.uploaded_at).min();
    let latest = records.iter().map(|r| r.uploaded_at).max();
    let (Some(earliest), Some(latest)) = (earliest, latest) else {
        return Err(TitleError::AggregationUnavailable(title.text.clone()));
    };

    title.earliest_upload_at = Some(earliest);
    title.latest_upload_at = Some(latest);
    title.priority = Some(compute_priority(earliest, latest, now));
    title.updated_at = now;
    Ok(())
}

/// Delete titles without records and recompute statistics for the rest.
pub fn refresh_titles(
    store: &dyn Repository,
    now: DateTime<Utc>,
) -> Result<RefreshReport, TitleError> {
    let mut report = RefreshReport::default();

    for mut title in store.list_titles()? {
        let records = store.records_for_title(&title.text)?;
        if records.is_empty() {
            store.delete_title(&title.text)?;
            report.deleted += 1;
            continue;
        }
        update_stats(&mut title, &records, now)?;
        store.save_title(&title)?;
        report.updated += 1;
    }

    info!(
        deleted = report.deleted,
        updated = report.updated,
        "Refreshed titles"
    );
    Ok(report)
}

/// Set the status of several titles, stamping `status_at`.
///
/// Fails on the first unknown text; titles before it keep their new status.
pub fn mark_titles(
    store: &dyn Repository,
    texts: &[String],
    status: TitleStatus,
    now: DateTime<Utc>,
) -> Result<Vec<Title>, TitleError> {
    let mut marked = Vec::with_capacity(texts.len());
    for text in texts {
        let mut title = find_title(store, text)?;
        title.set_status(status, now);
        store.save_title(&title)?;
        info!(title = %title.text, status = %status, "Marked title");
        marked.push(title);
    }
    Ok(marked)
}

/// Link a record to an existing title by hand.
///
/// Assigning to a SKIPPED title brings it back to NEW.
pub fn assign_title(
    store: &dyn Repository,
    url: &str,
    text: &str,
    now: DateTime<Utc>,
) -> Result<Record, TitleError> {
    let mut record = store
        .find_record_by_url(url)?
        .ok_or_else(|| StoreError::NotFound(format!("record '{}'", url)))?;
    let mut title = find_title(store, text)?;

    if title.status == TitleStatus::Skipped {
        warn!(title = %title.text, "Assigned record to skipped title, marking as new");
        title.set_status(TitleStatus::New, now);
        store.save_title(&title)?;
    }

    record.title = Some(title.text);
    record.updated_at = now;
    store.save_record(&record)?;
    Ok(record)
}

fn find_title(store: &dyn Repository, text: &str) -> Result<Title, TitleError> {
    store
        .find_title_by_text(text)?
        .ok_or_else(|| StoreError::NotFound(format!("title '{}'", text)).into())
}

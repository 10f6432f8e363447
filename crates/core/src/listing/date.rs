//! Upload date text parsing.
//!
//! Listing pages render dates in several loose formats:
//! `Oct. 16th '23`, `3am Oct. 16th`, `10:32pm` (uploaded today) or
//! `2023-05-31 10:15:00`. Components missing from the text are taken from the
//! reference date, and a missing time of day means midnight. Naive values are
//! interpreted as UTC.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::ListingError;

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})[-/](\d{1,2})$").expect("valid regex"));
static TIME_OF_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})(?::(\d{2}))?(?::(\d{2}))?(am|pm)?$").expect("valid regex")
});
static DAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})(st|nd|rd|th)?$").expect("valid regex"));
static SHORT_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^'(\d{2})$").expect("valid regex"));
static LONG_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})$").expect("valid regex"));

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

#[derive(Debug, Default)]
struct Parts {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    time: Option<NaiveTime>,
}

/// Parse listing date text relative to `now`.
pub fn parse_upload_date(text: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ListingError> {
    let invalid = || ListingError::InvalidDate(text.to_string());

    let normalized = text.trim().to_lowercase().replace(',', " ");
    let mut parts = Parts::default();
    let mut seen_any = false;

    for token in normalized.split_whitespace() {
        let token = token.trim_end_matches('.');
        if token.is_empty() {
            continue;
        }
        seen_any = true;

        if let Some(caps) = ISO_DATE.captures(token) {
            parts.year = Some(caps[1].parse().map_err(|_| invalid())?);
            parts.month = Some(caps[2].parse().map_err(|_| invalid())?);
            parts.day = Some(caps[3].parse().map_err(|_| invalid())?);
        } else if let Some(month) = month_from_token(token) {
            parts.month = Some(month);
        } else if let Some(caps) = SHORT_YEAR.captures(token) {
            let short: i32 = caps[1].parse().map_err(|_| invalid())?;
            parts.year = Some(2000 + short);
        } else if LONG_YEAR.is_match(token) {
            parts.year = Some(token.parse().map_err(|_| invalid())?);
        } else if is_time_token(token) {
            parts.time = Some(parse_time(token).ok_or_else(invalid)?);
        } else if let Some(caps) = DAY.captures(token) {
            parts.day = Some(caps[1].parse().map_err(|_| invalid())?);
        } else {
            return Err(invalid());
        }
    }

    if !seen_any {
        return Err(invalid());
    }

    let today = now.date_naive();
    let date = NaiveDate::from_ymd_opt(
        parts.year.unwrap_or(today.year()),
        parts.month.unwrap_or(today.month()),
        parts.day.unwrap_or(today.day()),
    )
    .ok_or_else(invalid)?;
    let time = parts.time.unwrap_or(NaiveTime::MIN);

    Ok(Utc.from_utc_datetime(&NaiveDateTime::new(date, time)))
}

fn month_from_token(token: &str) -> Option<u32> {
    if token.len() < 3 || !token.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let prefix = &token[..3];
    let index = MONTHS.iter().position(|m| *m == prefix)?;
    // reject words that merely start like a month ("market", "decade")
    let full = [
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ][index];
    if full.starts_with(token) || token == "sept" {
        Some(index as u32 + 1)
    } else {
        None
    }
}

fn is_time_token(token: &str) -> bool {
    (token.contains(':') || token.ends_with("am") || token.ends_with("pm"))
        && TIME_OF_DAY.is_match(token)
}

fn parse_time(token: &str) -> Option<NaiveTime> {
    let caps = TIME_OF_DAY.captures(token)?;
    let mut hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
    let second: u32 = caps.get(3).map_or(Some(0), |m| m.as_str().parse().ok())?;

    match caps.get(4).map(|m| m.as_str()) {
        Some("am") => {
            if hour == 0 || hour > 12 {
                return None;
            }
            if hour == 12 {
                hour = 0;
            }
        }
        Some("pm") => {
            if hour == 0 || hour > 12 {
                return None;
            }
            if hour != 12 {
                hour += 12;
            }
        }
        _ => {}
    }

    NaiveTime::from_hms_opt(hour, minute, second)
}

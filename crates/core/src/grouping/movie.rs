//! Canonical titles for movie releases.

use super::{GroupingPath, TitleKey};

/// Lower-case fragments that mark a release as not worth watching.
///
/// Matched against the normalized name, where `-` has already become a
/// space, hence both `hd-cam` and `hd cam`.
pub const DEFAULT_SKIP_TOKENS: &[&str] = &[
    "hindi", "hdts", "hdtc", "720p", "2160p", "hd-cam", "hd cam", "ita eng", " ita ", "camrip",
];

const MIN_YEAR: i32 = 1990;
const MAX_YEAR: i32 = 2030;

/// Turn `.` and `-` into spaces and drop brackets.
pub fn normalize_movie_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '[' | ']' | '(' | ')'))
        .map(|c| if c == '.' || c == '-' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Derive the title key of a movie release name.
///
/// The key is the longest prefix of the normalized name that ends in a
/// whitespace-separated release year; names without one are used verbatim.
pub fn movie_key(name: &str) -> TitleKey {
    let normalized = normalize_movie_name(name);
    match last_year(&normalized) {
        Some((end, year)) => TitleKey {
            year: Some(year),
            ..TitleKey::plain(normalized[..end].trim(), GroupingPath::Movie)
        },
        None => TitleKey::plain(name, GroupingPath::MovieFallback),
    }
}

/// Whether the normalized name contains any skip token.
pub fn has_skip_token(normalized: &str, skip_tokens: &[String]) -> bool {
    let lowered = normalized.to_lowercase();
    skip_tokens.iter().any(|token| lowered.contains(token.as_str()))
}

/// Byte offset just past the last in-range year preceded by whitespace (with
/// at least one character before it) and not followed by another digit.
fn last_year(text: &str) -> Option<(usize, i32)> {
    let bytes = text.as_bytes();
    let mut found = None;

    for (i, c) in text.char_indices() {
        if i == 0 || !c.is_whitespace() {
            continue;
        }
        let start = i + c.len_utf8();
        let end = start + 4;
        if end > bytes.len() || !bytes[start..end].iter().all(u8::is_ascii_digit) {
            continue;
        }
        if bytes.get(end).is_some_and(u8::is_ascii_digit) {
            continue;
        }
        let Ok(year) = text[start..end].parse::<i32>() else {
            continue;
        };
        if (MIN_YEAR..=MAX_YEAR).contains(&year) {
            found = Some((end, year));
        }
    }

    found
}

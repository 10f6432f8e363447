//! Canonical titles for TV releases.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::{GroupingPath, TitleKey};

static EPISODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.*)S(\d\d)E(\d\d)").expect("valid episode regex"));
static SEASON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.*)S(\d\d)").expect("valid season regex"));
static FORMULA_1: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Formula.1.\d{4}.Round.\d\d.\w+").expect("valid formula 1 regex"));

/// Derive the title key of a TV release name.
///
/// Tried in order: `<series>SxxEyy`, `<series>Sxx`, a Formula 1 round, and
/// finally the name itself.
pub fn tv_key(name: &str) -> TitleKey {
    if let Some(caps) = EPISODE.captures(name) {
        let series = series_name(&caps[1]);
        let season: u32 = caps[2].parse().expect("regex guarantees two digits");
        let episode: u32 = caps[3].parse().expect("regex guarantees two digits");
        return TitleKey {
            text: format!("{} S{:02}E{:02}", series, season, episode),
            path: GroupingPath::Episode,
            year: None,
            series: Some(series),
            season: Some(season),
            episode: Some(episode),
        };
    }

    if let Some(caps) = SEASON.captures(name) {
        let series = series_name(&caps[1]);
        let season: u32 = caps[2].parse().expect("regex guarantees two digits");
        return TitleKey {
            text: format!("{} S{:02}", series, season),
            path: GroupingPath::Season,
            year: None,
            series: Some(series),
            season: Some(season),
            episode: None,
        };
    }

    if let Some(m) = FORMULA_1.find(name) {
        return TitleKey::plain(m.as_str().replace('.', " ").trim(), GroupingPath::Formula1);
    }

    TitleKey::plain(name, GroupingPath::TvFallback)
}

fn series_name(prefix: &str) -> String {
    prefix.replace('.', " ").trim().to_string()
}

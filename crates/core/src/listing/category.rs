//! Site subcategory markers to (category, subcategory) pairs.
//!
//! The marker tables are closed: a marker that is neither mapped nor
//! explicitly ignored is an error, so a new category appearing on a site
//! stops ingestion instead of being filed under the wrong category.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::{Category, ListingError, Site, Subcategory};

/// Result of classifying a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The row belongs to a tracked category.
    Mapped(Category, Subcategory),
    /// The row is known to be irrelevant and must be skipped.
    Ignore,
}

/// A mapped 1337x subcategory id.
struct MarkerMapping {
    id: u32,
    category: Category,
    subcategory: Subcategory,
}

impl MarkerMapping {
    const fn new(id: u32, category: Category, subcategory: Subcategory) -> Self {
        Self {
            id,
            category,
            subcategory,
        }
    }
}

const LEETX_MAPPED: &[MarkerMapping] = &[
    // movies
    MarkerMapping::new(54, Category::Movies, Subcategory::H264),
    MarkerMapping::new(70, Category::Movies, Subcategory::Hevc),
    MarkerMapping::new(73, Category::Movies, Subcategory::Bollywood),
    MarkerMapping::new(42, Category::Movies, Subcategory::HdMovies),
    MarkerMapping::new(4, Category::Movies, Subcategory::Dubs),
    MarkerMapping::new(1, Category::Movies, Subcategory::Dvd),
    MarkerMapping::new(5, Category::Movies, Subcategory::Dvd),
    MarkerMapping::new(76, Category::Movies, Subcategory::Uhd),
    MarkerMapping::new(2, Category::Movies, Subcategory::DivxMovies),
    MarkerMapping::new(55, Category::Movies, Subcategory::Mp4),
    // tv
    MarkerMapping::new(41, Category::TvShows, Subcategory::HdTv),
    MarkerMapping::new(75, Category::TvShows, Subcategory::SdTv),
    MarkerMapping::new(6, Category::TvShows, Subcategory::DivxTv),
    MarkerMapping::new(71, Category::TvShows, Subcategory::HevcTv),
    MarkerMapping::new(48, Category::TvShows, Subcategory::DivxTv),
    // games
    MarkerMapping::new(10, Category::Games, Subcategory::PcGames),
];

/// 1337x subcategory ids that are deliberately skipped.
const LEETX_IGNORED: &[(u32, &str)] = &[
    (74, "cartoon"),
    (11, "ps2"),
    (12, "psp"),
    (13, "xbox"),
    (14, "xbox 360"),
    (17, "other games"),
    (34, "tutorials"),
    (35, "sounds"),
    (36, "ebooks"),
    (43, "ps3"),
    (44, "wii"),
    (45, "ds"),
    (56, "android"),
    (67, "unknown platform"),
    (72, "3ds"),
    (77, "ps4"),
    (82, "switch"),
];

static LEETX_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/sub/(\d+)/0/?$").expect("valid marker regex"));

static LEETX_MARKER_IN_MARKUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/sub/\d+/0/?").expect("valid marker regex"));

/// First 1337x subcategory marker anywhere in a fragment of row markup.
pub fn find_leetx_marker(markup: &str) -> Option<&str> {
    LEETX_MARKER_IN_MARKUP.find(markup).map(|m| m.as_str())
}

/// Classify a site marker such as `/sub/54/0`.
pub fn classify_marker(site: Site, marker: &str) -> Result<Classification, ListingError> {
    match site {
        Site::LeetX => classify_leetx(marker),
        // RARBG listings are scraped from the PC games section and carry no
        // per-row marker.
        Site::Rarbg => Ok(Classification::Mapped(Category::Games, Subcategory::PcGames)),
    }
}

fn classify_leetx(marker: &str) -> Result<Classification, ListingError> {
    let unknown = || ListingError::UnknownSubcategory {
        marker: marker.to_string(),
    };

    let id: u32 = LEETX_MARKER
        .captures(marker.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(unknown)?;

    if let Some(mapping) = LEETX_MAPPED.iter().find(|m| m.id == id) {
        return Ok(Classification::Mapped(mapping.category, mapping.subcategory));
    }
    if LEETX_IGNORED.iter().any(|(ignored, _)| *ignored == id) {
        return Ok(Classification::Ignore);
    }
    Err(unknown())
}

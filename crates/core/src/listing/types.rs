//! Types shared by the listing page parsers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Torrent index sites with a supported listing layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Site {
    /// 1337x, "table-list" layout.
    #[serde(rename = "1337x")]
    LeetX,
    /// RARBG, "lista2t" layout.
    #[serde(rename = "rarbg")]
    Rarbg,
}

impl Site {
    pub fn as_str(&self) -> &'static str {
        match self {
            Site::LeetX => "1337x",
            Site::Rarbg => "rarbg",
        }
    }

    /// Origin prepended to the relative hrefs found in listing rows.
    pub fn base_url(&self) -> &'static str {
        match self {
            Site::LeetX => "https://1337x.to",
            Site::Rarbg => "https://rarbgtor.org",
        }
    }

    /// CSS class of the listing table for this site.
    pub fn table_class(&self) -> &'static str {
        match self {
            Site::LeetX => "table-list",
            Site::Rarbg => "lista2t",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Site {
    type Err = ListingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1337x" => Ok(Site::LeetX),
            "rarbg" => Ok(Site::Rarbg),
            other => Err(ListingError::InvalidField {
                field: "site".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Top-level content category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Movies,
    TvShows,
    Games,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Movies => "movies",
            Category::TvShows => "tv_shows",
            Category::Games => "games",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ListingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movies" => Ok(Category::Movies),
            "tv_shows" => Ok(Category::TvShows),
            "games" => Ok(Category::Games),
            other => Err(ListingError::InvalidField {
                field: "category".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Site-independent subcategory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subcategory {
    // movies
    H264,
    Hevc,
    Bollywood,
    HdMovies,
    Dubs,
    Dvd,
    Uhd,
    DivxMovies,
    Mp4,
    // tv
    HdTv,
    SdTv,
    DivxTv,
    HevcTv,
    // games
    PcGames,
}

impl Subcategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subcategory::H264 => "h264",
            Subcategory::Hevc => "hevc",
            Subcategory::Bollywood => "bollywood",
            Subcategory::HdMovies => "hd_movies",
            Subcategory::Dubs => "dubs",
            Subcategory::Dvd => "dvd",
            Subcategory::Uhd => "uhd",
            Subcategory::DivxMovies => "divx_movies",
            Subcategory::Mp4 => "mp4",
            Subcategory::HdTv => "hd_tv",
            Subcategory::SdTv => "sd_tv",
            Subcategory::DivxTv => "divx_tv",
            Subcategory::HevcTv => "hevc_tv",
            Subcategory::PcGames => "pc_games",
        }
    }

    const ALL: [Subcategory; 14] = [
        Subcategory::H264,
        Subcategory::Hevc,
        Subcategory::Bollywood,
        Subcategory::HdMovies,
        Subcategory::Dubs,
        Subcategory::Dvd,
        Subcategory::Uhd,
        Subcategory::DivxMovies,
        Subcategory::Mp4,
        Subcategory::HdTv,
        Subcategory::SdTv,
        Subcategory::DivxTv,
        Subcategory::HevcTv,
        Subcategory::PcGames,
    ];
}

impl fmt::Display for Subcategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subcategory {
    type Err = ListingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Subcategory::ALL
            .into_iter()
            .find(|sub| sub.as_str() == s)
            .ok_or_else(|| ListingError::InvalidField {
                field: "subcategory".to_string(),
                value: s.to_string(),
            })
    }
}

/// One listing row, as extracted from a page and before it is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub category: Category,
    pub subcategory: Subcategory,
    /// Release name as shown in the listing.
    pub name: String,
    /// Absolute detail page URL, unique per release.
    pub url: String,
    pub seeders: u32,
    pub leechers: u32,
    pub uploaded_at: DateTime<Utc>,
    /// Size in bytes.
    pub size_bytes: u64,
    pub uploader: String,
}

/// Errors raised while parsing listing pages.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Unknown subcategory: {marker}")]
    UnknownSubcategory { marker: String },

    #[error("Malformed page {page}: {reason}")]
    MalformedPage { page: String, reason: String },

    #[error("Unsupported size unit: {0}")]
    UnsupportedUnit(String),

    #[error("Invalid size text: {0}")]
    InvalidSize(String),

    #[error("Invalid {field}: {value}")]
    InvalidField { field: String, value: String },

    #[error("Unrecognized date text: {0}")]
    InvalidDate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_serialization() {
        assert_eq!(serde_json::to_string(&Site::LeetX).unwrap(), "\"1337x\"");
        assert_eq!(serde_json::to_string(&Site::Rarbg).unwrap(), "\"rarbg\"");
        let site: Site = serde_json::from_str("\"1337x\"").unwrap();
        assert_eq!(site, Site::LeetX);
    }

    #[test]
    fn test_site_from_str_matches_as_str() {
        for site in [Site::LeetX, Site::Rarbg] {
            assert_eq!(site.as_str().parse::<Site>().unwrap(), site);
        }
        assert!("piratebay".parse::<Site>().is_err());
    }

    #[test]
    fn test_category_round_trip_through_text() {
        for category in [Category::Movies, Category::TvShows, Category::Games] {
            assert_eq!(category.to_string().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_every_subcategory_parses_back() {
        for sub in Subcategory::ALL {
            assert_eq!(sub.as_str().parse::<Subcategory>().unwrap(), sub);
        }
        assert!(matches!(
            "anime".parse::<Subcategory>(),
            Err(ListingError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_unknown_subcategory_message_carries_marker() {
        let err = ListingError::UnknownSubcategory {
            marker: "/sub/99/0".to_string(),
        };
        assert!(err.to_string().contains("/sub/99/0"));
    }
}

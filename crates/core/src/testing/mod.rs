//! Testing utilities: a mock fetcher and page/record fixtures.
//!
//! # Example
//!
//! ```rust,ignore
//! use titler_core::testing::{fixtures, MockFetcher};
//!
//! let fetcher = MockFetcher::new();
//! fetcher.respond("https://1337x.to/torrent/1/x/", fixtures::detail_page(&["magnet:?xt=urn:btih:abc"])).await;
//! ```

mod mock_fetcher;

pub use mock_fetcher::MockFetcher;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};

    use crate::listing::{Category, RawRecord, Subcategory};

    /// One 1337x listing row with the category icon link, name link and a
    /// size cell carrying the hidden seeders span the site renders.
    pub fn leetx_row(sub: u32, name: &str, seeders: u32, leechers: u32) -> String {
        format!(
            concat!(
                "<tr>",
                "<td class=\"coll-1 name\"><a href=\"/sub/{sub}/0/\" class=\"icon\"><i class=\"flaticon-hd\"></i></a>",
                "<a href=\"/torrent/{sub}/{name}/\">{name}</a></td>",
                "<td class=\"coll-2 seeds\">{seeders}</td>",
                "<td class=\"coll-3 leeches\">{leechers}</td>",
                "<td class=\"coll-date\">Oct. 5th '21</td>",
                "<td class=\"coll-4 size\">1.2 GB<span class=\"seeds\">{seeders}</span></td>",
                "<td class=\"coll-5 uploader\"><a href=\"/user/uploader/\">uploader</a></td>",
                "</tr>"
            ),
            sub = sub,
            name = name,
            seeders = seeders,
            leechers = leechers,
        )
    }

    /// A 1337x listing page around the given rows.
    pub fn leetx_page(rows: &[String]) -> String {
        format!(
            concat!(
                "<!DOCTYPE html><html><head><title>1337x</title></head><body>",
                "<table class=\"table-list table table-responsive table-striped\">",
                "<thead><tr><th>name</th><th>se</th><th>le</th><th>time</th><th>size</th><th>uploader</th></tr></thead>",
                "<tbody>{}</tbody></table></body></html>"
            ),
            rows.concat()
        )
    }

    /// One RARBG listing row.
    pub fn rarbg_row(name: &str, href: &str, seeders: u32, leechers: u32) -> String {
        format!(
            concat!(
                "<tr class=\"lista2\">",
                "<td class=\"lista\"><a href=\"/torrents.php?category=27\"><img src=\"cat_new27.gif\"></a></td>",
                "<td class=\"lista\"><a href=\"{href}\" title=\"{name}\">{name}</a></td>",
                "<td class=\"lista\">2023-05-31 10:15:00</td>",
                "<td class=\"lista\">4.5 GB</td>",
                "<td class=\"lista\">{seeders}</td>",
                "<td class=\"lista\">{leechers}</td>",
                "<td class=\"lista\">--</td>",
                "<td class=\"lista\">rarbg</td>",
                "</tr>"
            ),
            href = href,
            name = name,
            seeders = seeders,
            leechers = leechers,
        )
    }

    /// A RARBG listing page around the given rows.
    pub fn rarbg_page(rows: &[String]) -> String {
        format!(
            concat!(
                "<html><body><table class=\"lista2t\">",
                "<tr><td class=\"header6\">Cat.</td><td class=\"header6\">File</td>",
                "<td class=\"header6\">Added</td><td class=\"header6\">Size</td>",
                "<td class=\"header6\">S.</td><td class=\"header6\">L.</td>",
                "<td class=\"header6\">C.</td><td class=\"header6\">Uploader</td></tr>",
                "{}</table></body></html>"
            ),
            rows.concat()
        )
    }

    /// A detail page containing the given hrefs as links, after an
    /// unrelated link.
    pub fn detail_page(hrefs: &[&str]) -> String {
        let links: String = hrefs
            .iter()
            .map(|href| format!("<li><a href=\"{}\">Download</a></li>", href))
            .collect();
        format!(
            "<html><body><a href=\"/home\">home</a><ul>{}</ul></body></html>",
            links
        )
    }

    /// Fixed reference upload time.
    pub fn uploaded_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    /// A raw record with reasonable defaults.
    pub fn raw_record(category: Category, subcategory: Subcategory, name: &str) -> RawRecord {
        RawRecord {
            category,
            subcategory,
            name: name.to_string(),
            url: format!("https://1337x.to/torrent/{}/", name.replace(' ', "-")),
            seeders: 100,
            leechers: 10,
            uploaded_at: uploaded_at(),
            size_bytes: 1_500_000_000,
            uploader: "uploader".to_string(),
        }
    }

    /// A raw movie record.
    pub fn movie(name: &str) -> RawRecord {
        raw_record(Category::Movies, Subcategory::HdMovies, name)
    }

    /// A raw TV record.
    pub fn episode(name: &str) -> RawRecord {
        raw_record(Category::TvShows, Subcategory::HdTv, name)
    }

    /// A raw PC game record.
    pub fn game(name: &str) -> RawRecord {
        raw_record(Category::Games, Subcategory::PcGames, name)
    }
}

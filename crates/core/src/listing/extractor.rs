//! Listing table extraction.
//!
//! Two fixed layouts are supported:
//!
//! | site  | table class  | columns                                                     |
//! |-------|--------------|-------------------------------------------------------------|
//! | 1337x | `table-list` | name+marker, seeders, leechers, date, size, uploader        |
//! | rarbg | `lista2t`    | -, name, date, size, seeders, leechers, -, uploader          |
//!
//! The first row of the table is the header and is always skipped.

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use super::category::{classify_marker, find_leetx_marker, Classification};
use super::date::parse_upload_date;
use super::size::normalize_size;
use super::{ListingError, RawRecord, Site};

const LEETX_COLUMNS: usize = 6;
const RARBG_COLUMNS: usize = 8;

/// Rows extracted from one listing page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Relevant rows in document order.
    pub records: Vec<RawRecord>,
    /// Rows skipped because their subcategory is ignored.
    pub skipped: usize,
}

/// Extract every relevant row of a listing page.
///
/// `page` names the page in errors and logs (usually its file path). `now`
/// anchors relative dates such as "10:32pm".
///
/// Rows whose subcategory is on the ignore list are skipped; any other
/// failure aborts the page.
pub fn extract_page(
    content: &str,
    site: Site,
    page: &str,
    now: DateTime<Utc>,
) -> Result<Vec<RawRecord>, ListingError> {
    extract_rows(content, site, page, now).map(|extraction| extraction.records)
}

/// Like [`extract_page`], also counting the skipped rows.
pub fn extract_rows(
    content: &str,
    site: Site,
    page: &str,
    now: DateTime<Utc>,
) -> Result<Extraction, ListingError> {
    let document = Html::parse_document(content);
    let malformed = |reason: String| ListingError::MalformedPage {
        page: page.to_string(),
        reason,
    };

    let table_selector = selector(&format!("table.{}", site.table_class()));
    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| malformed(format!("no table with class '{}'", site.table_class())))?;

    let row_selector = selector("tr");
    let cell_selector = selector("td");

    let mut extraction = Extraction::default();
    for (index, row) in table.select(&row_selector).enumerate().skip(1) {
        let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
        let parsed = match site {
            Site::LeetX => parse_leetx_row(&cells, now),
            Site::Rarbg => parse_rarbg_row(&cells, now),
        };
        match parsed {
            Ok(Some(record)) => extraction.records.push(record),
            Ok(None) => {
                extraction.skipped += 1;
                debug!(page = page, row = index, "Skipping ignored subcategory");
            }
            Err(RowError::Structure(reason)) => {
                return Err(malformed(format!("row {}: {}", index, reason)))
            }
            Err(RowError::Listing(e)) => return Err(e),
        }
    }

    info!(
        page = page,
        site = %site,
        records = extraction.records.len(),
        skipped = extraction.skipped,
        "Finished scraping page"
    );
    Ok(extraction)
}

enum RowError {
    Structure(String),
    Listing(ListingError),
}

impl From<ListingError> for RowError {
    fn from(e: ListingError) -> Self {
        RowError::Listing(e)
    }
}

fn parse_leetx_row(
    cells: &[ElementRef],
    now: DateTime<Utc>,
) -> Result<Option<RawRecord>, RowError> {
    check_columns(cells, LEETX_COLUMNS)?;
    let name_cell = cells[0];
    let anchors: Vec<ElementRef> = name_cell.select(&selector("a")).collect();

    // The marker may sit anywhere in the cell markup; without one the raw
    // cell goes into the error so it shows what the site sent.
    let markup = name_cell.html();
    let marker = find_leetx_marker(&markup)
        .map(str::to_string)
        .unwrap_or_else(|| markup.clone());

    let (category, subcategory) = match classify_marker(Site::LeetX, &marker)? {
        Classification::Mapped(category, subcategory) => (category, subcategory),
        Classification::Ignore => return Ok(None),
    };

    // The first anchor is the category icon when there are two.
    let link = anchors
        .get(1)
        .or_else(|| anchors.first())
        .ok_or_else(|| RowError::Structure("name cell has no link".to_string()))?;

    Ok(Some(RawRecord {
        category,
        subcategory,
        name: cell_text(link),
        url: absolute_url(Site::LeetX, link)?,
        seeders: parse_count("seeders", &cells[1])?,
        leechers: parse_count("leechers", &cells[2])?,
        uploaded_at: parse_upload_date(&cell_text(&cells[3]), now)?,
        // the size cell also holds a hidden seeders span; only the first
        // text node is the size
        size_bytes: normalize_size(cells[4].text().next().unwrap_or_default())?,
        uploader: cell_text(&cells[5]),
    }))
}

fn parse_rarbg_row(
    cells: &[ElementRef],
    now: DateTime<Utc>,
) -> Result<Option<RawRecord>, RowError> {
    check_columns(cells, RARBG_COLUMNS)?;

    let (category, subcategory) = match classify_marker(Site::Rarbg, "")? {
        Classification::Mapped(category, subcategory) => (category, subcategory),
        Classification::Ignore => return Ok(None),
    };

    let link = cells[1]
        .select(&selector("a"))
        .next()
        .ok_or_else(|| RowError::Structure("name cell has no link".to_string()))?;

    Ok(Some(RawRecord {
        category,
        subcategory,
        name: cell_text(&cells[1]),
        url: absolute_url(Site::Rarbg, &link)?,
        uploaded_at: parse_upload_date(&cell_text(&cells[2]), now)?,
        size_bytes: normalize_size(&cell_text(&cells[3]))?,
        seeders: parse_count("seeders", &cells[4])?,
        leechers: parse_count("leechers", &cells[5])?,
        uploader: cell_text(&cells[7]),
    }))
}

fn check_columns(cells: &[ElementRef], expected: usize) -> Result<(), RowError> {
    if cells.len() < expected {
        return Err(RowError::Structure(format!(
            "expected {} columns, found {}",
            expected,
            cells.len()
        )));
    }
    Ok(())
}

fn cell_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn parse_count(field: &str, cell: &ElementRef) -> Result<u32, RowError> {
    let text = cell_text(cell);
    text.parse().map_err(|_| {
        RowError::Listing(ListingError::InvalidField {
            field: field.to_string(),
            value: text,
        })
    })
}

fn absolute_url(site: Site, link: &ElementRef) -> Result<String, RowError> {
    let href = link
        .value()
        .attr("href")
        .ok_or_else(|| RowError::Structure("link has no href".to_string()))?;
    if href.starts_with("http://") || href.starts_with("https://") {
        Ok(href.to_string())
    } else {
        Ok(format!("{}{}", site.base_url(), href))
    }
}

/// Parse a selector that is known to be valid.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static CSS selector")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{Category, Subcategory};
    use crate::testing::fixtures;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_leetx_page() {
        let html = fixtures::leetx_page(&[
            fixtures::leetx_row(54, "Some.Movie.Title.2021.1080p.BluRay", 1234, 56),
            fixtures::leetx_row(41, "Show.Name.S02E05.1080p", 80, 7),
        ]);

        let records = extract_page(&html, Site::LeetX, "top.html", now()).unwrap();
        assert_eq!(records.len(), 2);

        let movie = &records[0];
        assert_eq!(movie.category, Category::Movies);
        assert_eq!(movie.subcategory, Subcategory::H264);
        assert_eq!(movie.name, "Some.Movie.Title.2021.1080p.BluRay");
        assert_eq!(
            movie.url,
            "https://1337x.to/torrent/54/Some.Movie.Title.2021.1080p.BluRay/"
        );
        assert_eq!(movie.seeders, 1234);
        assert_eq!(movie.leechers, 56);
        assert_eq!(
            movie.uploaded_at,
            Utc.with_ymd_and_hms(2021, 10, 5, 0, 0, 0).unwrap()
        );
        assert_eq!(movie.size_bytes, 1_200_000_000);
        assert_eq!(movie.uploader, "uploader");

        assert_eq!(records[1].category, Category::TvShows);
        assert_eq!(records[1].subcategory, Subcategory::HdTv);
    }

    #[test]
    fn test_leetx_ignored_rows_are_skipped() {
        let html = fixtures::leetx_page(&[
            fixtures::leetx_row(82, "Some.Switch.Game", 10, 1),
            fixtures::leetx_row(10, "Some.PC.Game-GROUP", 10, 1),
        ]);

        let extraction = extract_rows(&html, Site::LeetX, "games.html", now()).unwrap();
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.skipped, 1);
        assert_eq!(extraction.records[0].name, "Some.PC.Game-GROUP");
    }

    #[test]
    fn test_leetx_unknown_marker_aborts_page() {
        let html = fixtures::leetx_page(&[
            fixtures::leetx_row(54, "Fine.Movie.2020", 10, 1),
            fixtures::leetx_row(99, "Mystery", 10, 1),
            fixtures::leetx_row(54, "Never.Reached.2020", 10, 1),
        ]);

        let err = extract_page(&html, Site::LeetX, "p.html", now()).unwrap_err();
        match err {
            ListingError::UnknownSubcategory { marker } => assert_eq!(marker, "/sub/99/0/"),
            other => panic!("Expected UnknownSubcategory, got {:?}", other),
        }
    }

    #[test]
    fn test_leetx_single_anchor_is_name_link() {
        let row = r#"<tr>
            <td class="coll-1 name"><i class="icon" data-cat="/sub/42/0/"></i><a href="/torrent/9/Lonely.Link.2019/">Lonely.Link.2019</a></td>
            <td>1</td><td>2</td><td>Oct. 5th '21</td><td>1 GB</td><td>someone</td>
        </tr>"#;
        let html = fixtures::leetx_page(&[row.to_string()]);

        let records = extract_page(&html, Site::LeetX, "p.html", now()).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.category, Category::Movies);
        assert_eq!(record.subcategory, Subcategory::HdMovies);
        assert_eq!(record.name, "Lonely.Link.2019");
        assert_eq!(record.url, "https://1337x.to/torrent/9/Lonely.Link.2019/");
        assert_eq!(record.uploader, "someone");
    }

    #[test]
    fn test_leetx_row_without_marker_is_unknown() {
        let row = r#"<tr>
            <td class="coll-1 name"><a href="/torrent/9/Lonely/">Lonely.Link.2019</a></td>
            <td>1</td><td>2</td><td>Oct. 5th '21</td><td>1 GB</td><td>someone</td>
        </tr>"#;
        let html = fixtures::leetx_page(&[row.to_string()]);

        // without the icon link there is no marker, so classification fails
        // with the raw cell as diagnostic
        let err = extract_page(&html, Site::LeetX, "p.html", now()).unwrap_err();
        match err {
            ListingError::UnknownSubcategory { marker } => assert!(marker.contains("Lonely")),
            other => panic!("Expected UnknownSubcategory, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_table_is_malformed() {
        let html = "<html><body><table class=\"other\"><tr><td>x</td></tr></table></body></html>";
        let err = extract_page(html, Site::LeetX, "broken.html", now()).unwrap_err();
        match err {
            ListingError::MalformedPage { page, reason } => {
                assert_eq!(page, "broken.html");
                assert!(reason.contains("table-list"));
            }
            other => panic!("Expected MalformedPage, got {:?}", other),
        }
    }

    #[test]
    fn test_layout_mismatch_is_malformed() {
        // a rarbg-style short row inside a table-list table
        let html = fixtures::leetx_page(&["<tr><td>a</td><td>b</td></tr>".to_string()]);
        let err = extract_page(&html, Site::LeetX, "short.html", now()).unwrap_err();
        assert!(matches!(err, ListingError::MalformedPage { .. }));
    }

    #[test]
    fn test_non_numeric_seeders() {
        let row = fixtures::leetx_row(54, "Movie.2020", 1, 1).replace(">1<", ">n/a<");
        let html = fixtures::leetx_page(&[row]);
        let err = extract_page(&html, Site::LeetX, "p.html", now()).unwrap_err();
        assert!(matches!(err, ListingError::InvalidField { ref field, .. } if field == "seeders"));
    }

    #[test]
    fn test_unsupported_size_unit_propagates() {
        let row = fixtures::leetx_row(54, "Big.Movie.2020", 5, 5).replace("1.2 GB", "1.2 TB");
        let html = fixtures::leetx_page(&[row]);
        let err = extract_page(&html, Site::LeetX, "p.html", now()).unwrap_err();
        assert!(matches!(err, ListingError::UnsupportedUnit(_)));
    }

    #[test]
    fn test_empty_table_yields_no_records() {
        let html = fixtures::leetx_page(&[]);
        let records = extract_page(&html, Site::LeetX, "empty.html", now()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_rarbg_page() {
        let html = fixtures::rarbg_page(&[fixtures::rarbg_row(
            "Some.Game-CODEX",
            "/torrent/abc123",
            42,
            3,
        )]);

        let records = extract_page(&html, Site::Rarbg, "rarbg.html", now()).unwrap();
        assert_eq!(records.len(), 1);
        let game = &records[0];
        assert_eq!(game.category, Category::Games);
        assert_eq!(game.subcategory, Subcategory::PcGames);
        assert_eq!(game.name, "Some.Game-CODEX");
        assert_eq!(game.url, "https://rarbgtor.org/torrent/abc123");
        assert_eq!(
            game.uploaded_at,
            Utc.with_ymd_and_hms(2023, 5, 31, 10, 15, 0).unwrap()
        );
        assert_eq!(game.size_bytes, 4_500_000_000);
        assert_eq!(game.seeders, 42);
        assert_eq!(game.leechers, 3);
        assert_eq!(game.uploader, "rarbg");
    }

    #[test]
    fn test_rarbg_requires_its_own_table_class() {
        let html = fixtures::leetx_page(&[]);
        let err = extract_page(&html, Site::Rarbg, "wrong.html", now()).unwrap_err();
        assert!(matches!(err, ListingError::MalformedPage { .. }));
    }
}

//! Listing page parsing.
//!
//! Turns saved listing pages of the supported sites into [`RawRecord`]s:
//! subcategory classification, size and date normalization, and table
//! extraction. Detail pages are parsed for their magnet link.

pub mod category;
pub mod date;
pub mod detail;
pub mod extractor;
pub mod size;
mod types;

pub use category::{classify_marker, find_leetx_marker, Classification};
pub use date::parse_upload_date;
pub use detail::{fetch_magnet_link, parse_magnet_link, DetailError};
pub use extractor::{extract_page, extract_rows, Extraction};
pub use size::normalize_size;
pub use types::*;

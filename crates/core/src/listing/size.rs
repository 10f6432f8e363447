//! Human readable size text ("1.2 GB") to byte counts.

use super::ListingError;

/// Convert a listing size string to bytes.
///
/// Accepts `"<number> <unit>"` where the number may carry `,` thousands
/// separators and the unit is one of `KB`, `MB`, `GB` (case-sensitive,
/// decimal multiples).
pub fn normalize_size(text: &str) -> Result<u64, ListingError> {
    let mut parts = text.split_whitespace();
    let (value, unit) = match (parts.next(), parts.next(), parts.next()) {
        (Some(value), Some(unit), None) => (value, unit),
        _ => return Err(ListingError::InvalidSize(text.to_string())),
    };

    let multiplier = match unit {
        "KB" => 1_000.0,
        "MB" => 1_000_000.0,
        "GB" => 1_000_000_000.0,
        other => return Err(ListingError::UnsupportedUnit(other.to_string())),
    };

    let value: f64 = value
        .replace(',', "")
        .parse()
        .map_err(|_| ListingError::InvalidSize(text.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(ListingError::InvalidSize(text.to_string()));
    }

    Ok((value * multiplier).round() as u64)
}

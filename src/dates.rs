// 📅 Date Normalizer
//
// PARLINFO writes dates as "1952.05.12", "1952-05-12" or occasionally in words.
// Everything is normalised to chrono::NaiveDate and stored as ISO 8601.

use chrono::NaiveDate;

use crate::error::ScrapeError;

/// Full-date layouts, tried in order after separators are rewritten to '-'
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];

/// Collapse runs of whitespace (including &nbsp;) into single spaces and trim
pub fn tidy(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rewrite '.' and '/' separators to '-'
pub fn normalize_separators(text: &str) -> String {
    text.chars()
        .map(|c| if c == '.' || c == '/' { '-' } else { c })
        .collect()
}

/// Parse loosely formatted date text.
///
/// Empty and malformed input both map to `None`; historical records are
/// tolerated rather than rejected.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = normalize_separators(&tidy(raw));
    if text.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&text, format) {
            return Some(date);
        }
    }

    // Partial dates: "1952-05" and "1952"
    if text.len() == 7 {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", text), "%Y-%m-%d") {
            return Some(date);
        }
    }
    if text.len() == 4 && text.chars().all(|c| c.is_ascii_digit()) {
        let year: i32 = text.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }

    None
}

/// Like [`parse_date`], but malformed non-empty text is an error.
pub fn parse_date_strict(raw: &str) -> Result<Option<NaiveDate>, ScrapeError> {
    if tidy(raw).is_empty() {
        return Ok(None);
    }
    parse_date(raw)
        .map(Some)
        .ok_or_else(|| ScrapeError::MalformedDate(raw.to_string()))
}

/// ISO 8601 calendar date
pub fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// ISO date, or empty string for an open end
pub fn iso_opt(date: Option<NaiveDate>) -> String {
    date.map(iso).unwrap_or_default()
}

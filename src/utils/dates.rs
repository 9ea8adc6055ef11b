//! Date detection and parsing for exchange exports
//!
//! Exchange exports disagree on date layout. Two shapes are recognised
//! anywhere inside a field: ISO `YYYY-MM-DD` and US `MM/DD/YYYY`. Full
//! RFC 3339 timestamps are converted to their UTC calendar date first.

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").expect("valid ISO date regex"));

static US_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{2})/(\d{2})/(\d{4})").expect("valid US date regex"));

/// Whether the field contains something shaped like a date.
///
/// Shape only: `2024-13-45` looks like a date here and fails later in
/// [`parse_date`].
pub fn looks_like_date(field: &str) -> bool {
    ISO_DATE.is_match(field) || US_DATE.is_match(field)
}

/// Parse a date from a field, returning `None` when no valid calendar date
/// can be extracted.
pub fn parse_date(field: &str) -> Option<NaiveDate> {
    let field = field.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(field) {
        return Some(ts.with_timezone(&Utc).date_naive());
    }

    if let Some(caps) = ISO_DATE.captures(field) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = US_DATE.captures(field) {
        let month = caps[1].parse().ok()?;
        let day = caps[2].parse().ok()?;
        let year = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

/// Format a date as `YYYY-MM-DD`
pub fn format_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

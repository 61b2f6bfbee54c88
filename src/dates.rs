//! Parsing of the platform's textual upload dates.
//!
//! Comment timestamps arrive as human strings, usually a relative form like
//! "3 weeks ago" and occasionally an absolute date. Relative forms are
//! anchored to the current time, so the resolved instant is approximate.

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static RELATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\s+(second|minute|hour|day|week|month|year)s?\s+ago$")
        .expect("Invalid relative date pattern")
});

/// Absolute date formats seen in comment timestamps.
const ABSOLUTE_FORMATS: &[&str] = &["%b %d, %Y", "%d %b %Y", "%Y-%m-%d"];

/// Resolve a textual upload date to an absolute point in time.
///
/// Returns `None` when the text matches no recognized form; the textual
/// date stays mandatory on the record regardless.
#[must_use]
pub fn parse_textual_date(text: &str) -> Option<DateTime<Utc>> {
    let cleaned = text.trim().trim_end_matches("(edited)").trim();
    if cleaned.is_empty() {
        return None;
    }
    parse_relative(cleaned).or_else(|| parse_absolute(cleaned))
}

fn parse_relative(text: &str) -> Option<DateTime<Utc>> {
    let captures = RELATIVE_RE.captures(text)?;
    let amount: u32 = captures.get(1)?.as_str().parse().ok()?;
    let unit = captures.get(2)?.as_str();

    let now = Utc::now();
    match unit {
        "second" => now.checked_sub_signed(Duration::seconds(i64::from(amount))),
        "minute" => now.checked_sub_signed(Duration::minutes(i64::from(amount))),
        "hour" => now.checked_sub_signed(Duration::hours(i64::from(amount))),
        "day" => now.checked_sub_signed(Duration::days(i64::from(amount))),
        "week" => now.checked_sub_signed(Duration::weeks(i64::from(amount))),
        "month" => now.checked_sub_months(Months::new(amount)),
        "year" => now.checked_sub_months(Months::new(amount.checked_mul(12)?)),
        _ => None,
    }
}

fn parse_absolute(text: &str) -> Option<DateTime<Utc>> {
    ABSOLUTE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(text, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    })
}

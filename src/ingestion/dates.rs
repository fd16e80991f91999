//! Lenient publish-date parsing.
//!
//! Source dates are free-form. A value is tried against a fixed list of layouts, first match
//! wins, and anything that matches none of them is treated as absent. Time-of-day and offsets
//! are accepted but only the calendar date is kept.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

// Month-first before day-first for slash dates; day-first is the fallback when the first
// component cannot be a month.
const DATE_LAYOUTS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    // Two-digit years, only reached once every four-digit layout has been ruled out.
    "%m/%d/%y",
    "%d/%m/%y",
    "%d-%m-%y",
    "%d.%m.%y",
];

const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M",
];

/// Parse a free-form date, returning `None` when no known layout matches.
pub fn parse_publish_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }

    DATE_LAYOUTS
        .iter()
        .find_map(|layout| {
            NaiveDate::parse_from_str(s, layout)
                .ok()
                .filter(|d| year_written_in_full(s, layout, d.year()))
        })
        .or_else(|| {
            DATETIME_LAYOUTS
                .iter()
                .find_map(|layout| {
                    NaiveDateTime::parse_from_str(s, layout)
                        .ok()
                        .filter(|dt| year_written_in_full(s, layout, dt.year()))
                })
                .map(|dt| dt.date())
        })
}

// chrono's `%Y` also takes one or two digits, which would turn `14-03-21` into the year 14.
// A `%Y` match only counts when the year appears in `s` as a run of exactly four digits.
fn year_written_in_full(s: &str, layout: &str, year: i32) -> bool {
    !layout.contains("%Y")
        || s.split(|c: char| !c.is_ascii_digit())
            .any(|run| run.len() == 4 && run.parse::<i32>() == Ok(year))
}

/// Render a parsed date the way feed consumers expect it: `YYYY-MM-DD`, or `""` when absent.
pub fn format_publish_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

//! Release and pickup date arithmetic.
//!
//! Document catalog entries carry a free-text processing time ("5-7 working
//! days"); the first integer found in it drives the advertised release
//! date. Pickup estimates after completion come from a fixed
//! per-document-name table of business days, weekends skipped.

use std::sync::OnceLock;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use regex::Regex;

/// Business days to pickup when a document name is not in the table.
pub const DEFAULT_PICKUP_BUSINESS_DAYS: u32 = 3;

/// Business days to pickup, keyed by catalog document name
/// (case-insensitive exact match).
const PICKUP_BUSINESS_DAYS: &[(&str, u32)] = &[
    ("transcript of records", 5),
    ("diploma", 7),
    ("certificate of enrollment", 2),
    ("certification of graduation", 5),
    ("good moral certificate", 2),
    ("certificate of grades", 3),
];

fn first_integer() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("literal pattern"))
}

/// Number of days promised by a processing-time text: the first integer
/// found, or 0 when the text carries none.
pub fn parse_processing_days(text: &str) -> u64 {
    first_integer()
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Release date for a request submitted on `submitted`: the parsed
/// processing days added as calendar days.
pub fn release_date(submitted: NaiveDate, processing_time: &str) -> NaiveDate {
    submitted
        .checked_add_days(Days::new(parse_processing_days(processing_time)))
        .unwrap_or(submitted)
}

/// Add `days` business days to `start`, skipping Saturdays and Sundays.
pub fn add_business_days(start: NaiveDate, days: u32) -> NaiveDate {
    let mut date = start;
    let mut remaining = days;
    while remaining > 0 {
        date = date.succ_opt().unwrap_or(date);
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            remaining -= 1;
        }
    }
    date
}

/// Estimated pickup date for a completed request.
pub fn pickup_estimate(document_name: &str, completed_on: NaiveDate) -> NaiveDate {
    let normalized = document_name.trim().to_ascii_lowercase();
    let days = PICKUP_BUSINESS_DAYS
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, days)| *days)
        .unwrap_or(DEFAULT_PICKUP_BUSINESS_DAYS);
    add_business_days(completed_on, days)
}

//! The slot catalog: the fixed ordered list of bookable time labels for
//! any calendar day. The same eight one-hour slots apply to every doctor
//! and every date — per-doctor working hours are deliberately not
//! modeled.

use chrono::{DateTime, NaiveDate};

pub const SLOT_CATALOG: [&str; 8] = [
    "09:00 AM", "10:00 AM", "11:00 AM", "12:00 PM",
    "01:00 PM", "02:00 PM", "03:00 PM", "04:00 PM",
];

pub fn catalog() -> &'static [&'static str] {
    &SLOT_CATALOG
}

pub fn is_valid_slot(label: &str) -> bool {
    SLOT_CATALOG.contains(&label)
}

/// Position of a label in the catalog; unknown labels sort last.
pub fn slot_order(label: &str) -> usize {
    SLOT_CATALOG
        .iter()
        .position(|s| *s == label)
        .unwrap_or(SLOT_CATALOG.len())
}

/// Normalize a request date to its day-key: accepts `YYYY-MM-DD` or an
/// RFC3339 datetime whose time-of-day is discarded.
pub fn parse_day(input: &str) -> Option<NaiveDate> {
    if let Ok(day) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(day);
    }
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.date_naive())
}

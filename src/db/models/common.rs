//! Common types and utilities shared across models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format accepted by the availability search and book-room links
pub const SEARCH_DATE_FORMAT: &str = "%Y/%m/%d";

/// Date format used for storage and for display on the reservation pages
pub const STORAGE_DATE_FORMAT: &str = "%Y-%m-%d";

/// A half-open stay `[start, end)`: the guest leaves on `end`, so another
/// stay may begin that same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Returns `None` for empty or negative ranges
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        intervals_overlap(self.start, self.end, other.start, other.end)
    }
}

/// `[s1, e1)` and `[s2, e2)` overlap iff `s1 < e2 && s2 < e1`.
/// Ranges that only touch at a boundary do not overlap.
pub fn intervals_overlap(s1: NaiveDate, e1: NaiveDate, s2: NaiveDate, e2: NaiveDate) -> bool {
    s1 < e2 && s2 < e1
}

pub fn parse_date(value: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), format).ok()
}

pub fn format_storage_date(date: NaiveDate) -> String {
    date.format(STORAGE_DATE_FORMAT).to_string()
}

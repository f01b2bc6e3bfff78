//! Date of birth validation.

use chrono::NaiveDate;

use super::patterns::ISO_DATE;
use super::FieldRule;
use crate::models::record::UNKNOWN;

/// Canonical date format for records.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date field validator accepting `YYYY-MM-DD` only.
pub struct DateValidator;

impl DateValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldRule for DateValidator {
    fn normalize(&self, raw: &str) -> Option<String> {
        parse_iso_date(raw).map(|date| date.format(DATE_FORMAT).to_string())
    }
}

/// Parse a strict `YYYY-MM-DD` calendar date.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let caps = ISO_DATE.captures(raw.trim())?;

    let year: i32 = caps[1].parse().ok()?;
    // No year zero in the Gregorian calendar
    if year < 1 {
        return None;
    }
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Normalize a date of birth to `YYYY-MM-DD`, or `"Unknown"`.
pub fn validate_dob(raw: &str) -> String {
    DateValidator::new()
        .normalize(raw)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

//! Shared traits and calendar helpers for finance and habit records.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::{FinhabitError, Result};

/// Exposes a stable identifier for entities stored in a record book.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Records that carry a monetary amount booked against a calendar month.
pub trait MonthlyAmount {
    fn year(&self) -> i32;
    fn month(&self) -> u32;
    fn amount(&self) -> Decimal;

    fn falls_in(&self, year: i32, month: u32) -> bool {
        self.year() == year && self.month() == month
    }
}

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Rejects months outside 1-12.
pub fn validate_month(month: u32) -> Result<u32> {
    if (1..=12).contains(&month) {
        Ok(month)
    } else {
        Err(FinhabitError::InvalidMonth(month))
    }
}

/// Full English month name; `None` for out-of-range input.
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// Three-letter month label used by compact tables.
pub fn month_abbrev(month: u32) -> Option<&'static str> {
    month_name(month).map(|name| &name[..3])
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

pub fn is_in_month(date: NaiveDate, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_labels_cover_calendar() {
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_abbrev(12), Some("Dec"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2024, 12), Some(31));
        assert_eq!(days_in_month(2024, 13), None);
    }

    #[test]
    fn validate_month_rejects_out_of_range() {
        assert!(validate_month(12).is_ok());
        assert!(matches!(
            validate_month(0),
            Err(FinhabitError::InvalidMonth(0))
        ));
    }
}

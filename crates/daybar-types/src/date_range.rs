//! Closed calendar-date windows.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::DateRangeError;

/// A closed range of calendar dates for extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// Start date (inclusive).
    pub start: NaiveDate,
    /// End date (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new date range, validating that start <= end.
    ///
    /// # Errors
    ///
    /// Returns an error if start > end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a date range for a single day.
    #[must_use]
    pub const fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Creates a window of `days` calendar days ending on `end`.
    ///
    /// A `days` value of 0 or 1 yields the single day `end`.
    ///
    /// # Errors
    ///
    /// Returns an error if the window would start before the earliest
    /// representable date.
    pub fn trailing(end: NaiveDate, days: u32) -> Result<Self, DateRangeError> {
        let back = u64::from(days.saturating_sub(1));
        let start = end
            .checked_sub_days(Days::new(back))
            .ok_or(DateRangeError::OutOfRange { end, days })?;
        Ok(Self { start, end })
    }

    /// Returns the total number of days in the range.
    #[must_use]
    pub fn total_days(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    /// Returns true if the range contains the given date.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

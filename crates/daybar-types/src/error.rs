//! Validation errors for core types.

use chrono::NaiveDate;
use thiserror::Error;

/// Error for invalid date ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    /// Start date is after end date.
    #[error("Invalid date range: {start} > {end}")]
    InvalidRange {
        /// The start date.
        start: NaiveDate,
        /// The end date.
        end: NaiveDate,
    },

    /// A trailing window could not be computed before the start of the calendar.
    #[error("Trailing window of {days} days ending {end} is out of range")]
    OutOfRange {
        /// The end date.
        end: NaiveDate,
        /// Requested window length in days.
        days: u32,
    },
}

/// Error for rejected instrument symbols.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TickerError {
    /// Symbol is empty after trimming.
    #[error("Ticker must not be empty")]
    Empty,

    /// Symbol does not fit the destination column.
    #[error("Ticker '{symbol}' is longer than {max} characters")]
    TooLong {
        /// The rejected symbol.
        symbol: String,
        /// Maximum accepted length.
        max: usize,
    },

    /// Symbol contains a character the provider never issues.
    #[error("Ticker '{symbol}' contains invalid character '{found}'")]
    InvalidCharacter {
        /// The rejected symbol.
        symbol: String,
        /// The first offending character.
        found: char,
    },
}

//! Transformation errors.

use daybar_types::Ticker;
use thiserror::Error;

/// A raw bar could not be coerced into a row.
///
/// Every variant names the ticker and the raw timestamp of the offending bar.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// A price or volume was NaN or infinite.
    #[error("{ticker} at {timestamp}: {field} is not a finite number")]
    NonFinite {
        /// Ticker of the bar.
        ticker: Ticker,
        /// Raw bar timestamp (ms).
        timestamp: i64,
        /// Offending field.
        field: &'static str,
    },

    /// A price does not fit NUMERIC(12,4).
    #[error("{ticker} at {timestamp}: {field} {value} is out of range")]
    PriceOutOfRange {
        /// Ticker of the bar.
        ticker: Ticker,
        /// Raw bar timestamp (ms).
        timestamp: i64,
        /// Offending field.
        field: &'static str,
        /// Provider value.
        value: f64,
    },

    /// Volume is not a whole number.
    #[error("{ticker} at {timestamp}: volume {value} is not a whole number")]
    FractionalVolume {
        /// Ticker of the bar.
        ticker: Ticker,
        /// Raw bar timestamp (ms).
        timestamp: i64,
        /// Provider value.
        value: f64,
    },

    /// Volume is negative or larger than a BIGINT.
    #[error("{ticker} at {timestamp}: volume {value} is out of range")]
    VolumeOutOfRange {
        /// Ticker of the bar.
        ticker: Ticker,
        /// Raw bar timestamp (ms).
        timestamp: i64,
        /// Provider value.
        value: f64,
    },

    /// The timestamp maps to a day outside the supported calendar.
    #[error("{ticker} at {timestamp}: timestamp is out of range")]
    TimestampOutOfRange {
        /// Ticker of the bar.
        ticker: Ticker,
        /// Raw bar timestamp (ms).
        timestamp: i64,
    },
}

impl TransformError {
    /// Returns the ticker of the offending bar.
    #[must_use]
    pub const fn ticker(&self) -> &Ticker {
        match self {
            Self::NonFinite { ticker, .. }
            | Self::PriceOutOfRange { ticker, .. }
            | Self::FractionalVolume { ticker, .. }
            | Self::VolumeOutOfRange { ticker, .. }
            | Self::TimestampOutOfRange { ticker, .. } => ticker,
        }
    }

    /// Returns the raw timestamp of the offending bar.
    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        match self {
            Self::NonFinite { timestamp, .. }
            | Self::PriceOutOfRange { timestamp, .. }
            | Self::FractionalVolume { timestamp, .. }
            | Self::VolumeOutOfRange { timestamp, .. }
            | Self::TimestampOutOfRange { timestamp, .. } => *timestamp,
        }
    }

    /// Returns the name of the offending field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::NonFinite { field, .. } | Self::PriceOutOfRange { field, .. } => field,
            Self::FractionalVolume { .. } | Self::VolumeOutOfRange { .. } => "volume",
            Self::TimestampOutOfRange { .. } => "timestamp",
        }
    }
}

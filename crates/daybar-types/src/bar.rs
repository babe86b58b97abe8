//! Bar representations before and after normalization.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Ticker;

/// One provider-returned observation, as extracted.
///
/// Prices are carried exactly as the provider reported them; validation and
/// fixed-point conversion happen during normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    /// Instrument symbol.
    pub ticker: Ticker,
    /// Opening price.
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume, if the provider published one.
    pub volume: Option<f64>,
    /// Bar start, in milliseconds since the Unix epoch (UTC).
    pub timestamp: i64,
}

impl RawBar {
    /// Creates a new raw bar.
    #[must_use]
    pub const fn new(
        ticker: Ticker,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Option<f64>,
        timestamp: i64,
    ) -> Self {
        Self {
            ticker,
            open,
            high,
            low,
            close,
            volume,
            timestamp,
        }
    }
}

/// Canonical row shape persisted by the loader.
///
/// Exactly seven fields, in column order. Prices are fixed-point with the
/// scale of the destination `NUMERIC` columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedRow {
    /// Instrument symbol.
    pub ticker: Ticker,
    /// UTC calendar day of the bar.
    pub date: NaiveDate,
    /// Opening price.
    pub open: Decimal,
    /// Highest price.
    pub high: Decimal,
    /// Lowest price.
    pub low: Decimal,
    /// Closing price.
    pub close: Decimal,
    /// Traded volume (0 when the provider published none).
    pub volume: i64,
}

impl NormalizedRow {
    /// Destination column names, in order.
    pub const COLUMNS: [&'static str; 7] =
        ["ticker", "date", "open", "high", "low", "close", "volume"];

    /// Returns the primary key of this row.
    #[must_use]
    pub const fn key(&self) -> (&Ticker, NaiveDate) {
        (&self.ticker, self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_row() -> NormalizedRow {
        NormalizedRow {
            ticker: Ticker::new("AAPL").unwrap(),
            date: NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
            open: dec!(229.52),
            high: dec!(229.65),
            low: dec!(223.74),
            close: dec!(226.21),
            volume: 63_285_048,
        }
    }

    #[test]
    fn test_row_serializes_exactly_seven_columns_in_order() {
        let json = serde_json::to_value(sample_row()).unwrap();
        let object = json.as_object().unwrap();

        let keys: Vec<&str> = object.keys().map(String::as_str).collect();
        let mut expected = NormalizedRow::COLUMNS.to_vec();
        expected.sort_unstable();
        let mut sorted = keys.clone();
        sorted.sort_unstable();

        assert_eq!(keys.len(), 7);
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_row_key() {
        let row = sample_row();
        let (ticker, date) = row.key();
        assert_eq!(ticker.as_str(), "AAPL");
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 10, 1).unwrap());
    }

    #[test]
    fn test_raw_bar_round_trips_missing_volume() {
        let bar = RawBar::new(
            Ticker::new("AAPL").unwrap(),
            1.0,
            2.0,
            0.5,
            1.5,
            None,
            1_727_740_800_000,
        );
        let json = serde_json::to_string(&bar).unwrap();
        assert!(json.contains("\"volume\":null"));
        assert_eq!(serde_json::from_str::<RawBar>(&json).unwrap(), bar);
    }
}

//! Instrument symbol.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::TickerError;

/// A validated instrument symbol (e.g., "AAPL", "BRK.B", "X:BTCUSD").
///
/// Symbols are trimmed and upper-cased on construction. The maximum length
/// matches the width of the destination `ticker` column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Maximum symbol length in characters.
    pub const MAX_LEN: usize = 10;

    /// Creates a ticker, normalizing case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol is empty, too long, or contains
    /// characters other than ASCII alphanumerics, `.`, `:` and `-`.
    pub fn new(symbol: impl AsRef<str>) -> Result<Self, TickerError> {
        let symbol = symbol.as_ref().trim().to_ascii_uppercase();

        if symbol.is_empty() {
            return Err(TickerError::Empty);
        }
        if symbol.chars().count() > Self::MAX_LEN {
            return Err(TickerError::TooLong {
                symbol,
                max: Self::MAX_LEN,
            });
        }
        if let Some(found) = symbol
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | ':' | '-')))
        {
            return Err(TickerError::InvalidCharacter { symbol, found });
        }

        Ok(Self(symbol))
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ticker {
    type Err = TickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = TickerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

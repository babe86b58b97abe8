//! Provider bar size definitions.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::str::FromStr;

/// Unit of time for one provider bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Timespan {
    /// Minute bars.
    Minute,
    /// Hourly bars.
    Hour,
    /// Daily bars.
    #[default]
    Day,
    /// Weekly bars.
    Week,
    /// Monthly bars.
    Month,
    /// Quarterly bars.
    Quarter,
    /// Yearly bars.
    Year,
}

impl Timespan {
    /// Returns the unit as the provider's path segment.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }
}

impl std::fmt::Display for Timespan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Timespan {
    type Err = SpanParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minute" | "minutes" | "min" | "m" => Ok(Self::Minute),
            "hour" | "hours" | "h" => Ok(Self::Hour),
            "day" | "days" | "d" | "daily" => Ok(Self::Day),
            "week" | "weeks" | "w" => Ok(Self::Week),
            "month" | "months" => Ok(Self::Month),
            "quarter" | "quarters" | "q" => Ok(Self::Quarter),
            "year" | "years" | "y" => Ok(Self::Year),
            _ => Err(SpanParseError(s.to_string())),
        }
    }
}

/// Size of one provider bar, e.g. `1 day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BarSpan {
    /// Number of `timespan` units per bar.
    pub multiplier: NonZeroU32,
    /// Unit of time.
    pub timespan: Timespan,
}

impl BarSpan {
    /// One bar per calendar day.
    pub const DAILY: Self = Self {
        multiplier: NonZeroU32::MIN,
        timespan: Timespan::Day,
    };

    /// Creates a new bar span.
    #[must_use]
    pub const fn new(multiplier: NonZeroU32, timespan: Timespan) -> Self {
        Self {
            multiplier,
            timespan,
        }
    }

    /// Returns true if every bar covers exactly one calendar day.
    #[must_use]
    pub const fn is_daily(&self) -> bool {
        self.multiplier.get() == 1 && matches!(self.timespan, Timespan::Day)
    }
}

impl Default for BarSpan {
    fn default() -> Self {
        Self::DAILY
    }
}

impl std::fmt::Display for BarSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.multiplier, self.timespan)
    }
}

impl FromStr for BarSpan {
    type Err = SpanParseError;

    /// Parses `"<multiplier> <unit>"` or a bare unit (multiplier 1).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (multiplier, unit) = match (parts.next(), parts.next(), parts.next()) {
            (Some(unit), None, None) => (NonZeroU32::MIN, unit),
            (Some(mult), Some(unit), None) => {
                let multiplier = mult
                    .parse::<NonZeroU32>()
                    .map_err(|_| SpanParseError(s.to_string()))?;
                (multiplier, unit)
            }
            _ => return Err(SpanParseError(s.to_string())),
        };
        let timespan = unit
            .parse::<Timespan>()
            .map_err(|_| SpanParseError(s.to_string()))?;
        Ok(Self::new(multiplier, timespan))
    }
}

/// Error returned when parsing an invalid bar span string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanParseError(String);

impl std::fmt::Display for SpanParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid bar span '{}', expected '<multiplier> <unit>' with unit one of: minute, hour, day, week, month, quarter, year",
            self.0
        )
    }
}

impl std::error::Error for SpanParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timespan_parse() {
        assert_eq!("day".parse::<Timespan>().unwrap(), Timespan::Day);
        assert_eq!("Hours".parse::<Timespan>().unwrap(), Timespan::Hour);
        assert!("fortnight".parse::<Timespan>().is_err());
    }

    #[test]
    fn test_bar_span_parse() {
        assert_eq!("1 day".parse::<BarSpan>().unwrap(), BarSpan::DAILY);
        assert_eq!("day".parse::<BarSpan>().unwrap(), BarSpan::DAILY);

        let five_min: BarSpan = "5 minute".parse().unwrap();
        assert_eq!(five_min.multiplier.get(), 5);
        assert_eq!(five_min.timespan, Timespan::Minute);
        assert!(!five_min.is_daily());

        assert!("0 day".parse::<BarSpan>().is_err());
        assert!("1 day extra".parse::<BarSpan>().is_err());
    }

    #[test]
    fn test_bar_span_display() {
        assert_eq!(BarSpan::DAILY.to_string(), "1 day");
        assert!(BarSpan::default().is_daily());
    }
}

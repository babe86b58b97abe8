//! Polygon aggregates URL construction.

use reqwest::Url;

use crate::{AggregatesQuery, FetchError};

/// Default base URL for the Polygon REST API.
pub const BASE_URL: &str = "https://api.polygon.io";

/// Builds the URL for the first page of an aggregates query.
///
/// URL format:
/// `{base}/v2/aggs/ticker/{TICKER}/range/{MULTIPLIER}/{TIMESPAN}/{FROM}/{TO}?adjusted=true&sort=asc&limit={LIMIT}`
///
/// # Errors
///
/// Returns an error if the base URL is not a valid absolute URL.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use daybar_fetch::AggregatesQuery;
/// use daybar_fetch::url::{BASE_URL, aggregates_url};
/// use daybar_types::{BarSpan, DateRange, Ticker};
/// use std::num::NonZeroU32;
///
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 10, 2).unwrap(),
/// )
/// .unwrap();
/// let query = AggregatesQuery::new(
///     Ticker::new("AAPL").unwrap(),
///     BarSpan::DAILY,
///     range,
///     NonZeroU32::new(2).unwrap(),
/// );
/// let url = aggregates_url(BASE_URL, &query).unwrap();
/// assert_eq!(
///     url,
///     "https://api.polygon.io/v2/aggs/ticker/AAPL/range/1/day/2025-10-01/2025-10-02?adjusted=true&sort=asc&limit=2"
/// );
/// ```
pub fn aggregates_url(base: &str, query: &AggregatesQuery) -> Result<String, FetchError> {
    let url = format!(
        "{}/v2/aggs/ticker/{}/range/{}/{}/{}/{}?adjusted=true&sort=asc&limit={}",
        base.trim_end_matches('/'),
        query.ticker,
        query.span.multiplier,
        query.span.timespan,
        query.range.start.format("%Y-%m-%d"),
        query.range.end.format("%Y-%m-%d"),
        query.limit,
    );
    Url::parse(&url)
        .map(String::from)
        .map_err(|e| FetchError::Malformed(format!("invalid request URL '{url}': {e}")))
}

/// Validates a provider-issued continuation URL against the configured base.
///
/// Continuations must stay on the same scheme, host and port as the base URL
/// so that credentials are only ever sent to the configured provider.
///
/// # Errors
///
/// Returns an error if either URL is invalid or the origins differ.
pub fn check_continuation(base: &str, next: &str) -> Result<(), FetchError> {
    let base_url = Url::parse(base)
        .map_err(|e| FetchError::Malformed(format!("invalid base URL '{base}': {e}")))?;
    let next_url = Url::parse(next)
        .map_err(|e| FetchError::Malformed(format!("invalid continuation URL '{next}': {e}")))?;

    if base_url.origin() != next_url.origin() {
        return Err(FetchError::Malformed(format!(
            "continuation URL '{next}' leaves provider origin '{}'",
            base_url.origin().ascii_serialization()
        )));
    }
    Ok(())
}

//! Aggregates response decoding.

use serde::{Deserialize, Serialize};

use crate::{AggregatesPage, FetchError};

/// One aggregate bar in the provider's wire shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateBar {
    /// Opening price.
    #[serde(rename = "o")]
    pub open: f64,
    /// Highest price.
    #[serde(rename = "h")]
    pub high: f64,
    /// Lowest price.
    #[serde(rename = "l")]
    pub low: f64,
    /// Closing price.
    #[serde(rename = "c")]
    pub close: f64,
    /// Traded volume; absent for some thinly traded instruments.
    #[serde(rename = "v", default)]
    pub volume: Option<f64>,
    /// Bar start in milliseconds since the Unix epoch.
    #[serde(rename = "t")]
    pub timestamp: i64,
}

#[derive(Debug, Deserialize)]
struct AggregatesResponse {
    status: Option<String>,
    #[serde(default)]
    results: Option<Vec<AggregateBar>>,
    next_url: Option<String>,
    error: Option<String>,
    message: Option<String>,
}

impl AggregatesResponse {
    fn detail(&self) -> String {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or("no detail provided")
            .to_string()
    }
}

/// Decodes one aggregates response body into a page.
///
/// A missing or null `results` array is an empty page, not an error.
///
/// # Errors
///
/// Returns an error if the body is not a valid aggregates document or the
/// provider reports an error status.
pub fn decode_page(body: &[u8]) -> Result<AggregatesPage, FetchError> {
    let response: AggregatesResponse = serde_json::from_slice(body)
        .map_err(|e| FetchError::Malformed(format!("undecodable aggregates response: {e}")))?;

    match response.status.as_deref() {
        Some("NOT_AUTHORIZED") => return Err(FetchError::Unauthorized(response.detail())),
        Some("ERROR") => return Err(FetchError::Provider(response.detail())),
        _ => {}
    }

    Ok(AggregatesPage {
        bars: response.results.unwrap_or_default(),
        next: response.next_url.filter(|url| !url.is_empty()),
    })
}

/// Extracts a human-readable detail from an error response body.
pub(crate) fn error_detail(body: &str) -> String {
    serde_json::from_str::<AggregatesResponse>(body)
        .map(|r| r.detail())
        .unwrap_or_else(|_| body.chars().take(200).collect())
}

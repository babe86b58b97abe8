//! Extraction stage: drains the page stream into raw bars.

use daybar_types::{BarSpan, DateRange, RawBar, Ticker};
use futures::TryStreamExt;
use std::num::NonZeroU32;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{AggregatesQuery, AggregatesSource, AuditLog, FetchError, bar_pages, flatten_bars};

/// Extraction failed for a ticker.
#[derive(Error, Debug)]
#[error("Failed to extract bars for {ticker}: {source}")]
pub struct ProviderError {
    /// Ticker being extracted.
    pub ticker: Ticker,
    /// Underlying provider failure.
    #[source]
    pub source: FetchError,
}

/// Pulls every bar for a ticker and window from an [`AggregatesSource`].
#[derive(Debug)]
pub struct Extractor<S> {
    source: S,
    span: BarSpan,
    audit: Option<AuditLog>,
}

impl<S: AggregatesSource> Extractor<S> {
    /// Creates an extractor for daily bars with no audit log.
    pub const fn new(source: S) -> Self {
        Self {
            source,
            span: BarSpan::DAILY,
            audit: None,
        }
    }

    /// Sets the bar span requested from the provider.
    #[must_use]
    pub fn with_span(mut self, span: BarSpan) -> Self {
        self.span = span;
        self
    }

    /// Enables the audit log for non-empty batches.
    #[must_use]
    pub fn with_audit_log(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Extracts every bar in the closed window, in arrival order.
    ///
    /// An empty result is a success. Any page failure fails the whole
    /// extraction and no partial batch is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if any page request fails.
    pub async fn extract(
        &self,
        ticker: &Ticker,
        range: DateRange,
        page_limit: NonZeroU32,
    ) -> Result<Vec<RawBar>, ProviderError> {
        let query = AggregatesQuery::new(ticker.clone(), self.span, range, page_limit);

        let bars: Vec<RawBar> = flatten_bars(bar_pages(&self.source, query))
            .map_ok(|bar| {
                RawBar::new(
                    ticker.clone(),
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    bar.volume,
                    bar.timestamp,
                )
            })
            .try_collect()
            .await
            .map_err(|source| {
                error!(ticker = %ticker, stage = "extract", error = %source, "Extraction failed");
                ProviderError {
                    ticker: ticker.clone(),
                    source,
                }
            })?;

        if bars.is_empty() {
            info!(ticker = %ticker, range = %range, "No bars returned, possibly market closed");
            return Ok(bars);
        }

        info!(ticker = %ticker, range = %range, count = bars.len(), "Extracted bars");

        if let Some(audit) = &self.audit
            && let Err(e) = audit.append(ticker, &bars).await
        {
            warn!(
                ticker = %ticker,
                path = %audit.path_for(ticker).display(),
                error = %e,
                "Failed to write audit log"
            );
        }

        Ok(bars)
    }
}

//! Paginated provider interface.

use async_trait::async_trait;
use daybar_types::{BarSpan, DateRange, Ticker};
use std::num::NonZeroU32;

use crate::{AggregateBar, FetchError};

/// Query for aggregate bars over a closed date window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatesQuery {
    /// Instrument symbol.
    pub ticker: Ticker,
    /// Bar size.
    pub span: BarSpan,
    /// Closed date window.
    pub range: DateRange,
    /// Maximum number of bars per page.
    pub limit: NonZeroU32,
}

impl AggregatesQuery {
    /// Creates a new query.
    #[must_use]
    pub const fn new(ticker: Ticker, span: BarSpan, range: DateRange, limit: NonZeroU32) -> Self {
        Self {
            ticker,
            span,
            range,
            limit,
        }
    }
}

/// One page request: the initial query or a provider-issued continuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// The first page of a query.
    First(AggregatesQuery),
    /// A continuation cursor returned with the previous page.
    Next(String),
}

/// One decoded page of provider results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatesPage {
    /// Bars in provider order.
    pub bars: Vec<AggregateBar>,
    /// Continuation cursor, absent on the last page.
    pub next: Option<String>,
}

impl AggregatesPage {
    /// Creates a final page with no continuation.
    #[must_use]
    pub const fn last(bars: Vec<AggregateBar>) -> Self {
        Self { bars, next: None }
    }

    /// Returns true if another page follows this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// A provider that serves aggregate bars one page at a time.
///
/// Implementations perform exactly one network call per invocation. The
/// pagination loop lives in [`bar_pages`](crate::bar_pages).
#[async_trait]
pub trait AggregatesSource: Send + Sync {
    /// Fetches a single page.
    ///
    /// # Errors
    ///
    /// Returns an error on transport, authentication or provider failure.
    async fn fetch_page(&self, request: &PageRequest) -> Result<AggregatesPage, FetchError>;
}

#[async_trait]
impl<S: AggregatesSource + ?Sized> AggregatesSource for &S {
    async fn fetch_page(&self, request: &PageRequest) -> Result<AggregatesPage, FetchError> {
        (**self).fetch_page(request).await
    }
}

#[async_trait]
impl<S: AggregatesSource + ?Sized> AggregatesSource for std::sync::Arc<S> {
    async fn fetch_page(&self, request: &PageRequest) -> Result<AggregatesPage, FetchError> {
        (**self).fetch_page(request).await
    }
}

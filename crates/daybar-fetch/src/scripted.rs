//! Scripted in-memory aggregates source.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::{AggregateBar, AggregatesPage, AggregatesSource, FetchError, PageRequest};

/// An [`AggregatesSource`] that replays a fixed script of pages and failures.
///
/// Every request, first page or continuation, consumes the next scripted
/// entry. Requests are recorded so tests can assert on the pagination walk.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<AggregatesPage, FetchError>>>,
    requests: Mutex<Vec<PageRequest>>,
}

impl ScriptedSource {
    /// Creates an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a script serving the given pages, linked by continuation cursors.
    #[must_use]
    pub fn paged(pages: Vec<Vec<AggregateBar>>) -> Self {
        let count = pages.len();
        pages
            .into_iter()
            .enumerate()
            .fold(Self::new(), |source, (index, bars)| {
                let next = (index + 1 < count).then(|| format!("scripted://page/{}", index + 1));
                source.page(AggregatesPage { bars, next })
            })
    }

    /// Creates a script whose only page is empty.
    #[must_use]
    pub fn empty() -> Self {
        Self::new().page(AggregatesPage::default())
    }

    /// Appends a page to the script.
    #[must_use]
    pub fn page(self, page: AggregatesPage) -> Self {
        self.push(Ok(page));
        self
    }

    /// Appends a failure to the script.
    #[must_use]
    pub fn failure(self, error: FetchError) -> Self {
        self.push(Err(error));
        self
    }

    /// Returns the requests received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of scripted entries not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn push(&self, entry: Result<AggregatesPage, FetchError>) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(entry);
    }
}

#[async_trait]
impl AggregatesSource for ScriptedSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<AggregatesPage, FetchError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Provider("script exhausted".to_string())))
    }
}

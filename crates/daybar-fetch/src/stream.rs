//! Lazy pagination over an aggregates source.

use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use tracing::debug;

use crate::{AggregateBar, AggregatesPage, AggregatesQuery, AggregatesSource, FetchError, PageRequest};

/// Creates a lazy stream of pages for the given query.
///
/// No request is issued until the stream is polled. Each poll fetches at
/// most one page, following continuation cursors until the provider returns
/// a page without one. The first error is yielded and ends the stream, and a
/// consumed stream cannot be restarted: pagination state is owned by the
/// stream itself.
///
/// # Arguments
///
/// * `source` - The provider to page through
/// * `query` - The query for the first page
pub fn bar_pages<'a, S>(
    source: &'a S,
    query: AggregatesQuery,
) -> impl Stream<Item = Result<AggregatesPage, FetchError>> + 'a
where
    S: AggregatesSource + ?Sized,
{
    stream::try_unfold(
        Some(PageRequest::First(query)),
        move |cursor| async move {
            let Some(request) = cursor else {
                return Ok(None);
            };

            let page = source.fetch_page(&request).await?;
            debug!(bars = page.bars.len(), has_next = page.has_next(), "Fetched page");

            let next = match (&request, page.next.clone()) {
                // A provider that hands back the cursor it was just given would loop forever
                (PageRequest::Next(current), Some(next)) if *current == next => {
                    return Err(FetchError::Malformed(format!(
                        "provider repeated continuation cursor '{next}'"
                    )));
                }
                (_, next) => next.map(PageRequest::Next),
            };

            Ok(Some((page, next)))
        },
    )
}

/// Flattens a page stream into individual bars, preserving arrival order.
pub fn flatten_bars(
    pages: impl Stream<Item = Result<AggregatesPage, FetchError>>,
) -> impl Stream<Item = Result<AggregateBar, FetchError>> {
    pages
        .map_ok(|page| stream::iter(page.bars.into_iter().map(Ok)))
        .try_flatten()
}

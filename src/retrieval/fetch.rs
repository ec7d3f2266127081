//! Paginated fetch of a single time chunk

use futures_util::future::join_all;
use tracing::debug;

use super::accumulator::ResultAccumulator;
use crate::chunking::TimeWindow;
use crate::client::SearchBackend;
use crate::error::{NewsCatcherError, Result};
use crate::models::{HeadlinesRequest, SearchRequest, SearchResponse};

/// First-page request for one chunk against either endpoint
#[derive(Debug, Clone)]
pub(crate) enum PageQuery {
    Search(SearchRequest),
    Headlines(HeadlinesRequest),
}

impl PageQuery {
    fn page(&self, page: u32) -> Self {
        match self {
            PageQuery::Search(request) => PageQuery::Search(request.with_page(page)),
            PageQuery::Headlines(request) => PageQuery::Headlines(request.with_page(page)),
        }
    }

    async fn fetch<B: SearchBackend + ?Sized>(&self, backend: &B) -> Result<SearchResponse> {
        match self {
            PageQuery::Search(request) => backend.search(request).await,
            PageQuery::Headlines(request) => backend.latest_headlines(request).await,
        }
    }
}

/// What a fully or partially fetched chunk contributed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChunkOutcome {
    pub(crate) total_pages: u32,
    pub(crate) pages_fetched: u32,
    pub(crate) accepted: usize,
}

fn chunk_error(window: &TimeWindow, page: u32, source: NewsCatcherError) -> NewsCatcherError {
    NewsCatcherError::ChunkFetch {
        from: window.from_param(),
        to: window.to_param(),
        page,
        source: Box::new(source),
    }
}

/// Fetch every page of one chunk into `acc`
///
/// Page 1 is fetched alone since it carries the page count. Later pages are
/// requested `concurrency` at a time, and each group is merged in page order
/// before the limit is checked again. On failure the rest of the chunk is
/// abandoned; articles already accepted stay in `acc`.
pub(crate) async fn fetch_chunk<B: SearchBackend + ?Sized>(
    backend: &B,
    query: &PageQuery,
    window: &TimeWindow,
    concurrency: usize,
    acc: &mut ResultAccumulator,
) -> std::result::Result<ChunkOutcome, NewsCatcherError> {
    let first = query
        .fetch(backend)
        .await
        .map_err(|e| chunk_error(window, 1, e))?;

    let total_pages = first.page_count();
    let mut outcome = ChunkOutcome {
        total_pages,
        pages_fetched: 1,
        accepted: acc.extend(first.articles),
    };
    debug!(chunk = %window, total_pages, "Fetched first page");

    let step = u32::try_from(concurrency).unwrap_or(u32::MAX).max(1);
    let mut next = 2;
    while next <= total_pages && !acc.is_full() {
        let last = next.saturating_add(step - 1).min(total_pages);
        debug!(chunk = %window, from_page = next, to_page = last, "Fetching pages");

        let requests = (next..=last).map(|page| {
            let request = query.page(page);
            async move { (page, request.fetch(backend).await) }
        });

        for (page, result) in join_all(requests).await {
            let response = result.map_err(|e| chunk_error(window, page, e))?;
            outcome.pages_fetched += 1;
            outcome.accepted += acc.extend(response.articles);
            if acc.is_full() {
                return Ok(outcome);
            }
        }

        next = match last.checked_add(1) {
            Some(page) => page,
            None => break,
        };
    }

    Ok(outcome)
}

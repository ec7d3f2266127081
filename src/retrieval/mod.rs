//! Bulk retrieval across the 10,000-result cap
//!
//! A retrieval call validates the query, splits the requested time range into
//! chunks and searches each chunk page by page, earliest chunk first. Results
//! are merged in chunk, page and server order, deduplicated by article id and
//! truncated at `max_articles`.
//!
//! Failures of individual chunks do not fail the call. They are logged and
//! collected in [`RetrievalReport::failures`].

mod accumulator;
mod fetch;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::chunking::{
    TimeBound, TimeChunks, TimeWindow, lookback_expression, partition, resolve_lookback,
};
use crate::client::SearchBackend;
use crate::error::{NewsCatcherError, Result};
use crate::models::{Article, Filters, HeadlinesRequest, SearchRequest};
use crate::progress::ChunkProgress;
use crate::query::QueryValidator;

pub use accumulator::process_articles;

use accumulator::ResultAccumulator;
use fetch::{PageQuery, fetch_chunk};

/// Limit applied when `max_articles` is not set
pub const DEFAULT_MAX_ARTICLES: usize = 100_000;

/// Search range start when `from` is not set
pub const DEFAULT_SEARCH_FROM: &str = "7d";

pub const DEFAULT_TIME_CHUNK_SIZE: &str = "1h";

pub const DEFAULT_CONCURRENCY: usize = 3;

/// Per-call settings for bulk retrieval
///
/// # Example
///
/// ```
/// use newscatcher_client_rs::RetrievalOptions;
///
/// let options = RetrievalOptions::new()
///     .from("2024-01-01")
///     .to("2024-01-31")
///     .time_chunk_size("1d")
///     .max_articles(50_000)
///     .concurrency(5)
///     .filter("lang", "en")
///     .filter("countries", "US,GB");
///
/// assert_eq!(options.effective_max_articles(), 50_000);
/// ```
#[derive(Debug, Clone)]
pub struct RetrievalOptions {
    /// Range start for searches, default [`DEFAULT_SEARCH_FROM`]; ignored by headlines
    pub from: Option<TimeBound>,
    /// Range end for searches, default now; ignored by headlines
    pub to: Option<TimeBound>,
    /// Chunk length in whole hours or days (`"1h"`, `"12h"`, `"1d"`)
    pub time_chunk_size: String,
    /// `None` means [`DEFAULT_MAX_ARTICLES`]
    pub max_articles: Option<usize>,
    pub deduplicate: bool,
    pub validate_query: bool,
    /// Page requests in flight at once within a chunk
    pub concurrency: usize,
    pub show_progress: bool,
    /// Additional request parameters passed through unchanged
    pub filters: Filters,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            time_chunk_size: DEFAULT_TIME_CHUNK_SIZE.to_string(),
            max_articles: None,
            deduplicate: true,
            validate_query: true,
            concurrency: DEFAULT_CONCURRENCY,
            show_progress: false,
            filters: Filters::new(),
        }
    }
}

impl RetrievalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from<T: Into<TimeBound>>(mut self, from: T) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn to<T: Into<TimeBound>>(mut self, to: T) -> Self {
        self.to = Some(to.into());
        self
    }

    pub fn time_chunk_size<S: Into<String>>(mut self, size: S) -> Self {
        self.time_chunk_size = size.into();
        self
    }

    pub fn max_articles(mut self, max_articles: usize) -> Self {
        self.max_articles = Some(max_articles);
        self
    }

    pub fn deduplicate(mut self, deduplicate: bool) -> Self {
        self.deduplicate = deduplicate;
        self
    }

    pub fn validate_query(mut self, validate: bool) -> Self {
        self.validate_query = validate;
        self
    }

    /// Values below 1 are raised to 1
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Add one pass-through request parameter
    pub fn filter<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Replace all pass-through request parameters
    pub fn filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    pub fn effective_max_articles(&self) -> usize {
        self.max_articles.unwrap_or(DEFAULT_MAX_ARTICLES)
    }
}

/// Result of a bulk retrieval call
#[derive(Debug, Default)]
pub struct RetrievalReport {
    /// Accepted articles in chunk, page and server order
    pub articles: Vec<Article>,
    /// One [`NewsCatcherError::ChunkFetch`] per chunk that failed
    pub failures: Vec<NewsCatcherError>,
    /// Chunks attempted, including failed ones
    pub chunks_processed: usize,
    /// Whether retrieval stopped early at `max_articles`
    pub limit_reached: bool,
}

impl RetrievalReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs chunked retrieval against a [`SearchBackend`]
pub struct ChunkedRetriever<B> {
    backend: B,
    validator: QueryValidator,
}

impl<B: SearchBackend> ChunkedRetriever<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            validator: QueryValidator::new(),
        }
    }

    /// Use `validator` instead of the default rule set
    pub fn with_validator(mut self, validator: QueryValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Validate `query` with this retriever's validator
    pub fn validate_query(&self, query: &str) -> (bool, String) {
        self.validator.validate(query)
    }

    pub async fn get_all_articles(
        &self,
        query: &str,
        options: &RetrievalOptions,
    ) -> Result<Vec<Article>> {
        Ok(self
            .get_all_articles_with_report(query, options)
            .await?
            .articles)
    }

    /// Search `query` over the configured range, one chunk at a time
    #[instrument(skip(self, options), fields(query = %query, chunk_size = %options.time_chunk_size))]
    pub async fn get_all_articles_with_report(
        &self,
        query: &str,
        options: &RetrievalOptions,
    ) -> Result<RetrievalReport> {
        if options.validate_query {
            self.validator.check(query).map_err(|message| {
                warn!(%message, "Query rejected before retrieval");
                NewsCatcherError::InvalidQuery(message)
            })?;
        }

        let now = Utc::now();
        let from = options
            .from
            .clone()
            .unwrap_or_else(|| TimeBound::from(DEFAULT_SEARCH_FROM));
        let to = options.to.clone().unwrap_or(TimeBound::Absolute(now));
        let window = TimeWindow::resolve(&from, &to, now)?;
        let chunks = partition(&window, &options.time_chunk_size)?;

        let template = SearchRequest::new(query, &window, &options.filters)?;
        self.run(chunks, options, "article", |chunk| {
            PageQuery::Search(SearchRequest {
                from: chunk.from_param(),
                to: chunk.to_param(),
                ..template.clone()
            })
        })
        .await
    }

    pub async fn get_all_headlines(
        &self,
        when: &str,
        options: &RetrievalOptions,
    ) -> Result<Vec<Article>> {
        Ok(self
            .get_all_headlines_with_report(when, options)
            .await?
            .articles)
    }

    /// Collect latest headlines published within `when` (e.g. `"7d"`)
    ///
    /// Each chunk is requested with the lookback from now to the chunk start,
    /// so consecutive chunks overlap; deduplication removes the overlap.
    /// Every request covers the most recent part of the window, so chunking
    /// does not lift the per-request result cap for the oldest headlines.
    ///
    /// `when` must be relative (`"30m"`, `"12h"`, `"7d"`); absolute dates are
    /// rejected with `NewsCatcherError::InvalidTimeRange`.
    #[instrument(skip(self, options), fields(when = %when, chunk_size = %options.time_chunk_size))]
    pub async fn get_all_headlines_with_report(
        &self,
        when: &str,
        options: &RetrievalOptions,
    ) -> Result<RetrievalReport> {
        let now = Utc::now();
        let window = TimeWindow::new(resolve_lookback(when, now)?, now)?;
        let chunks = partition(&window, &options.time_chunk_size)?;

        let template = HeadlinesRequest::new(when, &options.filters)?;
        self.run(chunks, options, "headline", |chunk| {
            PageQuery::Headlines(HeadlinesRequest {
                when: lookback_expression(now, chunk.start),
                ..template.clone()
            })
        })
        .await
    }

    async fn run<F>(
        &self,
        chunks: TimeChunks,
        options: &RetrievalOptions,
        label: &'static str,
        chunk_query: F,
    ) -> Result<RetrievalReport>
    where
        F: Fn(&TimeWindow) -> PageQuery,
    {
        let max_articles = options.effective_max_articles();
        let mut acc = ResultAccumulator::new(max_articles, options.deduplicate);
        let mut report = RetrievalReport::default();
        let progress = ChunkProgress::new(chunks.len(), label, options.show_progress);

        for chunk in chunks {
            if acc.is_full() {
                break;
            }

            report.chunks_processed += 1;
            match fetch_chunk(
                &self.backend,
                &chunk_query(&chunk),
                &chunk,
                options.concurrency,
                &mut acc,
            )
            .await
            {
                Ok(outcome) => debug!(
                    chunk = %chunk,
                    pages = outcome.pages_fetched,
                    total_pages = outcome.total_pages,
                    accepted = outcome.accepted,
                    "Chunk complete"
                ),
                Err(err) => {
                    warn!(chunk = %chunk, error = %err, "Chunk failed, continuing with next chunk");
                    report.failures.push(err);
                }
            }
            progress.chunk_done(acc.len());
        }

        if acc.is_full() {
            report.limit_reached = true;
            warn!(max_articles, "Reached maximum article limit, stopping");
            progress.limit_reached(max_articles);
        }

        progress.finish(acc.len());
        info!(
            articles = acc.len(),
            chunks = report.chunks_processed,
            failures = report.failures.len(),
            "Retrieval complete"
        );

        report.articles = acc.into_articles();
        Ok(report)
    }
}

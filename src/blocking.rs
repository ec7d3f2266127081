//! Synchronous retrieval
//!
//! Wraps [`ChunkedRetriever`] with an owned single-threaded tokio runtime so
//! bulk retrieval can be called from non-async code. Must not be used from
//! inside an async runtime.
//!
//! # Example
//!
//! ```no_run
//! use newscatcher_client_rs::{ClientConfig, RetrievalOptions, blocking};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = blocking::NewsCatcherClient::with_config(ClientConfig::from_env())?;
//!     let headlines = client.get_all_headlines("1d", &RetrievalOptions::new())?;
//!     println!("Retrieved {} headlines", headlines.len());
//!     Ok(())
//! }
//! ```

use tokio::runtime::{Builder, Runtime};

use crate::client::{self, SearchBackend};
use crate::config::ClientConfig;
use crate::error::{NewsCatcherError, Result};
use crate::models::{Article, HeadlinesRequest, SearchRequest, SearchResponse};
use crate::query::QueryValidator;
use crate::retrieval::{ChunkedRetriever, RetrievalOptions, RetrievalReport};

/// Blocking counterpart of [`ChunkedRetriever`]
pub struct BlockingRetriever<B> {
    inner: ChunkedRetriever<B>,
    runtime: Runtime,
}

/// Blocking HTTP client
pub type NewsCatcherClient = BlockingRetriever<client::NewsCatcherClient>;

fn build_runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| NewsCatcherError::IoError {
            message: format!("Failed to create runtime: {e}"),
        })
}

impl<B: SearchBackend> BlockingRetriever<B> {
    pub fn new(backend: B) -> Result<Self> {
        Ok(Self {
            inner: ChunkedRetriever::new(backend),
            runtime: build_runtime()?,
        })
    }

    pub fn with_validator(mut self, validator: QueryValidator) -> Self {
        self.inner = self.inner.with_validator(validator);
        self
    }

    pub fn backend(&self) -> &B {
        self.inner.backend()
    }

    pub fn validate_query(&self, query: &str) -> (bool, String) {
        self.inner.validate_query(query)
    }

    pub fn get_all_articles(&self, query: &str, options: &RetrievalOptions) -> Result<Vec<Article>> {
        self.runtime
            .block_on(self.inner.get_all_articles(query, options))
    }

    pub fn get_all_articles_with_report(
        &self,
        query: &str,
        options: &RetrievalOptions,
    ) -> Result<RetrievalReport> {
        self.runtime
            .block_on(self.inner.get_all_articles_with_report(query, options))
    }

    pub fn get_all_headlines(&self, when: &str, options: &RetrievalOptions) -> Result<Vec<Article>> {
        self.runtime
            .block_on(self.inner.get_all_headlines(when, options))
    }

    pub fn get_all_headlines_with_report(
        &self,
        when: &str,
        options: &RetrievalOptions,
    ) -> Result<RetrievalReport> {
        self.runtime
            .block_on(self.inner.get_all_headlines_with_report(when, options))
    }
}

impl BlockingRetriever<client::NewsCatcherClient> {
    /// Create a blocking client with an explicit configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::new(client::NewsCatcherClient::with_config(config))
    }

    /// Fetch a single page of search results
    pub fn search_page(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.runtime.block_on(self.backend().search_page(request))
    }

    /// Fetch a single page of latest headlines
    pub fn latest_headlines_page(&self, request: &HeadlinesRequest) -> Result<SearchResponse> {
        self.runtime
            .block_on(self.backend().latest_headlines_page(request))
    }
}

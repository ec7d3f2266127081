use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{NewsCatcherError, Result};
use crate::models::{Article, HeadlinesRequest, SearchRequest, SearchResponse};
use crate::rate_limit::RateLimiter;
use crate::retrieval::{ChunkedRetriever, RetrievalOptions, RetrievalReport};
use crate::retry::with_retry;

/// Header carrying the API token
pub const API_TOKEN_HEADER: &str = "x-api-token";

const SEARCH_ENDPOINT: &str = "api/search";
const LATEST_HEADLINES_ENDPOINT: &str = "api/latest_headlines";

/// Single-page access to the search endpoints
///
/// [`ChunkedRetriever`] is generic over this trait so retrieval can run
/// against something other than the HTTP API.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Fetch one page of `/api/search` results
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;

    /// Fetch one page of `/api/latest_headlines` results
    async fn latest_headlines(&self, request: &HeadlinesRequest) -> Result<SearchResponse>;
}

/// Client for the NewsCatcher news API
#[derive(Clone)]
pub struct NewsCatcherClient {
    client: Client,
    base_url: String,
    rate_limiter: RateLimiter,
    config: ClientConfig,
}

impl NewsCatcherClient {
    /// Create a client configured from `NEWSCATCHER_API_KEY` / `NEWSCATCHER_BASE_URL`
    ///
    /// # Example
    ///
    /// ```
    /// use newscatcher_client_rs::NewsCatcherClient;
    ///
    /// let client = NewsCatcherClient::new();
    /// ```
    pub fn new() -> Self {
        Self::with_config(ClientConfig::from_env())
    }

    /// Create a client with an explicit configuration
    ///
    /// # Example
    ///
    /// ```
    /// use newscatcher_client_rs::{ClientConfig, NewsCatcherClient};
    ///
    /// let config = ClientConfig::new()
    ///     .with_api_key("your_api_key_here")
    ///     .with_rate_limit(2.0);
    ///
    /// let client = NewsCatcherClient::with_config(config);
    /// ```
    pub fn with_config(config: ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.effective_user_agent())
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Falling back to default HTTP client");
                Client::new()
            });

        Self::with_client(client, config)
    }

    /// Create a client around a preconfigured `reqwest::Client`
    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        Self {
            client,
            base_url: config.effective_base_url().to_string(),
            rate_limiter: config.create_rate_limiter(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch a single page of search results
    #[instrument(skip(self, request), fields(q = %request.q, page = request.page))]
    pub async fn search_page(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.post_json(SEARCH_ENDPOINT, request).await
    }

    /// Fetch a single page of latest headlines
    #[instrument(skip(self, request), fields(when = %request.when, page = request.page))]
    pub async fn latest_headlines_page(
        &self,
        request: &HeadlinesRequest,
    ) -> Result<SearchResponse> {
        self.post_json(LATEST_HEADLINES_ENDPOINT, request).await
    }

    /// Retrieve every article matching `query`, beyond the 10,000-result cap of a single search
    ///
    /// The time range in `options` is split into chunks that are searched one
    /// after another. Chunk failures are logged and skipped; use
    /// [`get_all_articles_with_report`](Self::get_all_articles_with_report) to
    /// inspect them.
    ///
    /// # Errors
    ///
    /// * `NewsCatcherError::InvalidQuery` - If validation is enabled and the query is rejected
    /// * `NewsCatcherError::InvalidTimeRange` - If the time range cannot be resolved or is inverted
    /// * `NewsCatcherError::InvalidDuration` - If the chunk size is malformed
    ///
    /// # Example
    ///
    /// ```no_run
    /// use newscatcher_client_rs::{NewsCatcherClient, RetrievalOptions};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = NewsCatcherClient::new();
    ///     let options = RetrievalOptions::new()
    ///         .from("10d")
    ///         .time_chunk_size("1d")
    ///         .max_articles(5000)
    ///         .filter("lang", "en");
    ///
    ///     let articles = client.get_all_articles("\"renewable energy\"", &options).await?;
    ///     println!("Retrieved {} articles", articles.len());
    ///     Ok(())
    /// }
    /// ```
    pub async fn get_all_articles(
        &self,
        query: &str,
        options: &RetrievalOptions,
    ) -> Result<Vec<Article>> {
        self.retriever().get_all_articles(query, options).await
    }

    /// Same as [`get_all_articles`](Self::get_all_articles), also returning chunk failures
    pub async fn get_all_articles_with_report(
        &self,
        query: &str,
        options: &RetrievalOptions,
    ) -> Result<RetrievalReport> {
        self.retriever()
            .get_all_articles_with_report(query, options)
            .await
    }

    /// Retrieve every headline published within `when` (e.g. `"7d"`)
    ///
    /// `when` must be a relative lookback; see
    /// [`ChunkedRetriever::get_all_headlines_with_report`] for how chunks overlap.
    pub async fn get_all_headlines(
        &self,
        when: &str,
        options: &RetrievalOptions,
    ) -> Result<Vec<Article>> {
        self.retriever().get_all_headlines(when, options).await
    }

    /// Same as [`get_all_headlines`](Self::get_all_headlines), also returning chunk failures
    pub async fn get_all_headlines_with_report(
        &self,
        when: &str,
        options: &RetrievalOptions,
    ) -> Result<RetrievalReport> {
        self.retriever()
            .get_all_headlines_with_report(when, options)
            .await
    }

    fn retriever(&self) -> ChunkedRetriever<Self> {
        ChunkedRetriever::new(self.clone())
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<SearchResponse> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self.make_request(&url, body).await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "API request failed");
            return Err(NewsCatcherError::ApiError {
                status: status.as_u16(),
                message: if message.is_empty() {
                    status.canonical_reason().unwrap_or("Unknown error").to_string()
                } else {
                    message
                },
            });
        }

        let text = response.text().await?;
        let page: SearchResponse = serde_json::from_str(&text)?;
        debug!(
            articles = page.articles.len(),
            total_pages = page.page_count(),
            "Received page"
        );
        Ok(page)
    }

    /// POST with rate limiting; 429 and 5xx responses are retried
    async fn make_request<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<Response> {
        with_retry(
            || async {
                self.rate_limiter.acquire().await;
                debug!("Making API request to: {url}");

                let mut request = self.client.post(url).json(body);
                if let Some(api_key) = &self.config.api_key {
                    request = request.header(API_TOKEN_HEADER, api_key);
                }
                let response = request.send().await.map_err(NewsCatcherError::from)?;

                let status = response.status();
                if status.is_server_error() || status.as_u16() == 429 {
                    return Err(NewsCatcherError::ApiError {
                        status: status.as_u16(),
                        message: status
                            .canonical_reason()
                            .unwrap_or("Unknown error")
                            .to_string(),
                    });
                }

                Ok(response)
            },
            &self.config.retry_config,
            "NewsCatcher API request",
        )
        .await
    }
}

impl Default for NewsCatcherClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchBackend for NewsCatcherClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.search_page(request).await
    }

    async fn latest_headlines(&self, request: &HeadlinesRequest) -> Result<SearchResponse> {
        self.latest_headlines_page(request).await
    }
}

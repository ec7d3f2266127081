//! # NewsCatcher Client
//!
//! A Rust client for the NewsCatcher news search API with bulk retrieval
//! beyond the API's 10,000-result cap per search.
//!
//! ## Features
//!
//! - **Chunked Retrieval**: Split a time range into chunks, page through each
//!   one and merge the results with deduplication and an article limit
//! - **Local Query Validation**: Reject malformed queries before any request,
//!   with the same messages the API returns
//! - **Async and Blocking**: Built on tokio, with a blocking wrapper for sync code
//! - **Rate Limiting and Retries**: Token-bucket throttling and exponential backoff
//!   on transient failures
//!
//! ## Quick Start
//!
//! ### Retrieving Articles
//!
//! ```no_run
//! use newscatcher_client_rs::{ClientConfig, NewsCatcherClient, RetrievalOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = NewsCatcherClient::with_config(
//!         ClientConfig::new().with_api_key("your_api_key_here"),
//!     );
//!
//!     let options = RetrievalOptions::new()
//!         .from("30d")
//!         .time_chunk_size("1d")
//!         .max_articles(20_000)
//!         .show_progress(true)
//!         .filter("lang", "en");
//!
//!     let report = client
//!         .get_all_articles_with_report("\"artificial intelligence\" OR AI", &options)
//!         .await?;
//!
//!     println!("Retrieved {} articles", report.articles.len());
//!     for failure in &report.failures {
//!         eprintln!("Skipped: {failure}");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Validating Queries
//!
//! ```
//! use newscatcher_client_rs::validate_query;
//!
//! let (is_valid, message) = validate_query("AI OR artificial intelligence");
//! assert!(!is_valid);
//! assert!(message.contains("not allowed at same level"));
//!
//! assert!(validate_query("AI OR \"artificial intelligence\"").0);
//! ```

pub mod blocking;
pub mod chunking;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
mod progress;
pub mod query;
pub mod rate_limit;
pub mod retrieval;
pub mod retry;

// Re-export main types for convenience
pub use chunking::{ChunkSize, TimeBound, TimeChunks, TimeWindow, partition, resolve_lookback};
pub use client::{NewsCatcherClient, SearchBackend};
pub use config::ClientConfig;
pub use error::{NewsCatcherError, Result};
pub use models::{Article, Filters, HeadlinesRequest, SearchRequest, SearchResponse};
pub use query::{QueryRule, QueryValidator, validate_query};
pub use rate_limit::RateLimiter;
pub use retrieval::{
    ChunkedRetriever, DEFAULT_MAX_ARTICLES, RetrievalOptions, RetrievalReport, process_articles,
};
pub use retry::RetryConfig;

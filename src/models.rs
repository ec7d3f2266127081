use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::chunking::TimeWindow;
use crate::error::{NewsCatcherError, Result};

/// Pass-through request parameters (`lang`, `countries`, `sources`, ...)
pub type Filters = Map<String, Value>;

/// Page size used when the caller does not set one
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Largest page size the API accepts
pub const MAX_PAGE_SIZE: u32 = 1000;

/// A news article as returned by the search endpoints
///
/// Only the fields used by retrieval are typed; everything else the API
/// returns is kept in `extra`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Article {
    /// Article identifier, the deduplication key
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub published_date: Option<String>,
    /// Remaining response fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Article {
    /// Create an article with only an identifier set
    pub fn with_id<S: Into<String>>(id: S) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }
}

/// One page of search or headlines results
///
/// A page with no matches omits `articles`; it decodes as an empty page.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct SearchResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub total_hits: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub articles: Vec<Article>,
    /// Echo of the request parameters, present on some responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_input: Option<Value>,
}

impl SearchResponse {
    /// Number of pages in this result set, at least 1
    pub fn page_count(&self) -> u32 {
        self.total_pages.unwrap_or(1).max(1)
    }
}

/// Split caller filters into the pass-through map and an effective page size
///
/// `page` and the keys in `owned` are dropped; `page_size` defaults to
/// [`DEFAULT_PAGE_SIZE`] and is clamped to `1..=MAX_PAGE_SIZE`. A
/// `page_size` that is not a non-negative integer is rejected.
fn prepare_filters(filters: &Filters, owned: &[&str]) -> Result<(Filters, u32)> {
    let mut params = filters.clone();
    params.remove("page");
    for key in owned {
        params.remove(*key);
    }

    let page_size = match params.remove("page_size") {
        None => DEFAULT_PAGE_SIZE,
        Some(value) => {
            let size = value
                .as_u64()
                .ok_or_else(|| NewsCatcherError::InvalidParameter {
                    name: "page_size".to_string(),
                    message: format!("expected a non-negative integer, got {value}"),
                })?;
            // Clamped value always fits in u32
            size.clamp(1, u64::from(MAX_PAGE_SIZE)) as u32
        }
    };

    Ok((params, page_size))
}

/// Body of a `POST /api/search` request
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SearchRequest {
    pub q: String,
    #[serde(rename = "from_")]
    pub from: String,
    pub to: String,
    pub page: u32,
    pub page_size: u32,
    #[serde(flatten)]
    pub filters: Filters,
}

impl SearchRequest {
    /// First-page request for `query` restricted to `window`
    ///
    /// # Errors
    ///
    /// * `NewsCatcherError::InvalidParameter` - If `filters` carries a non-integer `page_size`
    pub fn new(query: &str, window: &TimeWindow, filters: &Filters) -> Result<Self> {
        let (filters, page_size) = prepare_filters(filters, &["q", "from_", "to", "when"])?;
        Ok(Self {
            q: query.to_string(),
            from: window.from_param(),
            to: window.to_param(),
            page: 1,
            page_size,
            filters,
        })
    }

    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}

/// Body of a `POST /api/latest_headlines` request
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct HeadlinesRequest {
    /// Relative lookback such as `"7d"` or `"12h"`
    pub when: String,
    pub page: u32,
    pub page_size: u32,
    #[serde(flatten)]
    pub filters: Filters,
}

impl HeadlinesRequest {
    /// First-page request for headlines published within `when`
    pub fn new(when: &str, filters: &Filters) -> Result<Self> {
        let (filters, page_size) = prepare_filters(filters, &["q", "from_", "to", "when"])?;
        Ok(Self {
            when: when.to_string(),
            page: 1,
            page_size,
            filters,
        })
    }

    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}

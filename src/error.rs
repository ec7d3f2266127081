use std::result;

use crate::retry::RetryableError;
use thiserror::Error;

/// Error types for NewsCatcher client operations
#[derive(Error, Debug)]
pub enum NewsCatcherError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Query rejected by local validation before any request was made
    #[error("Invalid query syntax: {0}")]
    InvalidQuery(String),

    /// Time window cannot be resolved or is inverted
    #[error("Invalid time range: {message}")]
    InvalidTimeRange { message: String },

    /// Duration specifier (e.g. `"1h"`, `"7d"`) cannot be parsed or is not positive
    #[error("Invalid duration {value:?}: {reason}")]
    InvalidDuration { value: String, reason: String },

    /// A pass-through request parameter has an unusable value
    #[error("Invalid parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    /// Generic API error with HTTP status code
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// IO error (runtime construction for the blocking client)
    #[error("IO error: {message}")]
    IoError { message: String },

    /// A single page request inside a time chunk failed
    ///
    /// Never returned from the bulk retrieval calls; recorded in
    /// [`RetrievalReport::failures`](crate::retrieval::RetrievalReport) instead.
    #[error("Chunk {from} to {to} failed on page {page}: {source}")]
    ChunkFetch {
        from: String,
        to: String,
        page: u32,
        #[source]
        source: Box<NewsCatcherError>,
    },
}

pub type Result<T> = result::Result<T, NewsCatcherError>;

impl RetryableError for NewsCatcherError {
    fn is_retryable(&self) -> bool {
        match self {
            NewsCatcherError::RequestError(err) => {
                if err.is_timeout() || err.is_connect() {
                    return true;
                }

                if let Some(status) = err.status() {
                    return status.is_server_error() || status.as_u16() == 429;
                }

                !err.is_builder() && !err.is_redirect() && !err.is_decode()
            }

            NewsCatcherError::ApiError { status, message } => {
                (*status >= 500 && *status < 600) || *status == 429 || {
                    let lower_msg = message.to_lowercase();
                    lower_msg.contains("temporarily unavailable")
                        || lower_msg.contains("timeout")
                        || lower_msg.contains("connection")
                }
            }

            NewsCatcherError::JsonError(_)
            | NewsCatcherError::InvalidQuery(_)
            | NewsCatcherError::InvalidTimeRange { .. }
            | NewsCatcherError::InvalidDuration { .. }
            | NewsCatcherError::InvalidParameter { .. }
            | NewsCatcherError::IoError { .. }
            | NewsCatcherError::ChunkFetch { .. } => false,
        }
    }

    fn retry_reason(&self) -> &str {
        if self.is_retryable() {
            match self {
                NewsCatcherError::RequestError(err) if err.is_timeout() => "Request timeout",
                NewsCatcherError::RequestError(err) if err.is_connect() => "Connection error",
                NewsCatcherError::RequestError(_) => "Network error",
                NewsCatcherError::ApiError { status, .. } => match status {
                    429 => "Rate limit exceeded",
                    500..=599 => "Server error",
                    _ => "Temporary API error",
                },
                _ => "Transient error",
            }
        } else {
            match self {
                NewsCatcherError::JsonError(_) => "Invalid JSON response",
                NewsCatcherError::InvalidQuery(_) => "Invalid query",
                NewsCatcherError::InvalidTimeRange { .. }
                | NewsCatcherError::InvalidDuration { .. }
                | NewsCatcherError::InvalidParameter { .. } => "Invalid input",
                NewsCatcherError::ApiError { status: 422, .. } => "Request rejected by API",
                NewsCatcherError::IoError { .. } => "Runtime error",
                _ => "Non-transient error",
            }
        }
    }
}

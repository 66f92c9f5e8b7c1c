//! Error types for the fetcher module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for page fetching
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be parsed
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    /// The request did not complete within the configured timeout
    #[error("Timed out fetching {url}")]
    Timeout { url: String },

    /// HTTP client error
    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// Non-success status code
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// The response is not an HTML document
    #[error("{url} is not HTML (content type '{content_type}')")]
    NotHtml { url: String, content_type: String },

    /// The response body exceeds the configured limit
    #[error("{url} body of {size} bytes exceeds limit of {limit} bytes")]
    TooLarge {
        url: String,
        size: usize,
        limit: usize,
    },

    /// The page rendered to an empty document
    #[error("{url} returned an empty document")]
    EmptyBody { url: String },

    /// Crawler backend failure
    #[error("Crawler error fetching {url}: {message}")]
    Crawler { url: String, message: String },
}

impl FetchError {
    /// The URL the failed fetch was for
    pub fn url(&self) -> &str {
        match self {
            FetchError::InvalidUrl { url, .. }
            | FetchError::Timeout { url }
            | FetchError::Http { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::NotHtml { url, .. }
            | FetchError::TooLarge { url, .. }
            | FetchError::EmptyBody { url }
            | FetchError::Crawler { url, .. } => url,
        }
    }

    /// Whether the failure was a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }
}

impl From<FetchError> for CrateError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Http { source, .. } => CrateError::Http(source),
            _ => CrateError::Fetch(err.to_string()),
        }
    }
}

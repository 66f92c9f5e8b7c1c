//! Error types for the company profiler crate

use thiserror::Error;

/// Result type for company profiler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for company profiler operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Link extraction error
    #[error("Link error: {0}")]
    Links(String),

    /// Page fetch error
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Content normalization error
    #[error("Normalization error: {0}")]
    Normalize(String),

    /// Relevance classification error
    #[error("Classification error: {0}")]
    Classification(String),

    /// Profile synthesis error
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// Pipeline error, tagged with the stage that failed
    #[error("Pipeline error at {stage}: {message}")]
    Pipeline {
        /// Stage that produced the failure
        stage: &'static str,
        /// Error message
        message: String,
    },

    /// Job intake error
    #[error("Job error: {0}")]
    Job(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

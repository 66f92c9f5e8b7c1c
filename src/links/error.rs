//! Error types for the link extraction module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for link extraction
#[derive(Debug, Error)]
pub enum LinkError {
    /// The base URL could not be parsed as an absolute URL
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        /// The offending base URL
        url: String,
        /// Underlying parse error
        source: url::ParseError,
    },

    /// A configured exclusion pattern failed to compile
    #[error("Invalid {rule} pattern: {source}")]
    InvalidPattern {
        /// Which filter rule the pattern belongs to
        rule: &'static str,
        /// Underlying regex error
        source: regex::Error,
    },
}

impl From<LinkError> for CrateError {
    fn from(err: LinkError) -> Self {
        CrateError::Links(err.to_string())
    }
}

//! Error types for the normalizer module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for content normalization
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// A noise pattern failed to compile
    #[error("Invalid noise pattern '{name}': {source}")]
    InvalidPattern {
        /// Name of the filter the pattern belongs to
        name: String,
        /// Underlying regex error
        source: regex::Error,
    },
}

impl From<NormalizeError> for CrateError {
    fn from(err: NormalizeError) -> Self {
        CrateError::Normalize(err.to_string())
    }
}

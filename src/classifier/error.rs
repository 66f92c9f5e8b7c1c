//! Error types for the classifier module

use crate::error::Error as CrateError;
use rig::completion::PromptError;
use thiserror::Error;

/// The classification service answered, but not in the agreed shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationShapeError {
    /// The response is not a JSON object of the expected form
    #[error("Malformed classification response: {0}")]
    Malformed(String),

    /// A label other than the literal "YES" or "NO"
    #[error("Invalid label {label} for {url}")]
    InvalidLabel { url: String, label: String },

    /// The same link was labelled more than once
    #[error("Link labelled more than once: {0}")]
    DuplicateLink(String),

    /// Links that were asked about but not labelled
    #[error("Response is missing {} link(s): {}", .0.len(), .0.join(", "))]
    MissingLinks(Vec<String>),

    /// Links that were labelled but never asked about
    #[error("Response contains {} unexpected link(s): {}", .0.len(), .0.join(", "))]
    UnexpectedLinks(Vec<String>),

    /// More YES labels than allowed
    #[error("Response marks {count} links YES, at most {max} allowed")]
    TooManyYes { count: usize, max: usize },
}

/// Error type for relevance classification
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The text-generation service failed
    #[error("Classification request failed: {0}")]
    Completion(#[from] PromptError),

    /// The text-generation service did not answer in time
    #[error("Classification timed out after {0} seconds")]
    Timeout(u64),

    /// The answer violated the response contract
    #[error(transparent)]
    Shape(#[from] ClassificationShapeError),
}

impl From<ClassifyError> for CrateError {
    fn from(err: ClassifyError) -> Self {
        CrateError::Classification(err.to_string())
    }
}

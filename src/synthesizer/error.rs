//! Error types for the synthesizer module

use crate::error::Error as CrateError;
use rig::completion::PromptError;
use thiserror::Error;

/// Error type for profile synthesis
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The text-generation service failed
    #[error("Synthesis request failed: {0}")]
    Completion(#[from] PromptError),

    /// The text-generation service did not answer in time
    #[error("Synthesis timed out after {0} seconds")]
    Timeout(u64),

    /// The service answered with nothing
    #[error("Synthesis returned an empty profile")]
    EmptyResponse,

    /// Asked to describe a company from an empty corpus
    #[error("Nothing to synthesize: corpus is empty")]
    EmptyCorpus,
}

impl From<SynthesisError> for CrateError {
    fn from(err: SynthesisError) -> Self {
        CrateError::Synthesis(err.to_string())
    }
}

//! Error types for the pipeline module

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::classifier::ClassifyError;
use crate::error::Error as CrateError;
use crate::fetcher::FetchError;
use crate::links::LinkError;
use crate::synthesizer::SynthesisError;

/// Pipeline stage a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Homepage,
    Links,
    Classification,
    Corpus,
    Synthesis,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Homepage => "homepage",
            Stage::Links => "links",
            Stage::Classification => "classification",
            Stage::Corpus => "corpus",
            Stage::Synthesis => "synthesis",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a run ended without any content worth summarizing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyCorpusReason {
    /// The homepage has no links left after filtering
    NoCandidateLinks,
    /// The classifier marked no link YES
    NoRelevantLinks,
    /// Every relevant page failed to fetch
    NoPagesFetched { failed: usize },
    /// Every fetched page was empty after cleaning
    AllPagesEmpty { pages: usize },
}

impl fmt::Display for EmptyCorpusReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyCorpusReason::NoCandidateLinks => write!(f, "no candidate links on the homepage"),
            EmptyCorpusReason::NoRelevantLinks => write!(f, "no link was classified as relevant"),
            EmptyCorpusReason::NoPagesFetched { failed } => {
                write!(f, "all {} relevant pages failed to fetch", failed)
            }
            EmptyCorpusReason::AllPagesEmpty { pages } => {
                write!(f, "all {} fetched pages were empty after cleaning", pages)
            }
        }
    }
}

/// Error type for a pipeline run, tagged with stage and company URL
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The homepage could not be fetched, nothing else ran
    #[error("Homepage {url} could not be fetched: {source}")]
    Homepage { url: String, source: FetchError },

    /// Links could not be extracted from the homepage
    #[error("Link extraction failed for {url}: {source}")]
    Links { url: String, source: LinkError },

    /// Classification failed or violated the response contract
    #[error("Classification failed for {url}: {source}")]
    Classification { url: String, source: ClassifyError },

    /// Nothing to summarize; the synthesizer was not called
    #[error("Insufficient data for {url}: {reason}")]
    EmptyCorpus {
        url: String,
        reason: EmptyCorpusReason,
    },

    /// The synthesis service failed
    #[error("Synthesis failed for {url}: {source}")]
    Synthesis { url: String, source: SynthesisError },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Homepage { .. } => Stage::Homepage,
            PipelineError::Links { .. } => Stage::Links,
            PipelineError::Classification { .. } => Stage::Classification,
            PipelineError::EmptyCorpus { .. } => Stage::Corpus,
            PipelineError::Synthesis { .. } => Stage::Synthesis,
        }
    }

    /// Company URL the run was started with
    pub fn url(&self) -> &str {
        match self {
            PipelineError::Homepage { url, .. }
            | PipelineError::Links { url, .. }
            | PipelineError::Classification { url, .. }
            | PipelineError::EmptyCorpus { url, .. }
            | PipelineError::Synthesis { url, .. } => url,
        }
    }

    /// Whether the run completed but found nothing to summarize
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, PipelineError::EmptyCorpus { .. })
    }
}

impl From<PipelineError> for CrateError {
    fn from(err: PipelineError) -> Self {
        CrateError::Pipeline {
            stage: err.stage().as_str(),
            message: err.to_string(),
        }
    }
}

//! # Profile Synthesis Module
//!
//! Sends the normalized corpus to a text-generation model and returns the
//! two-section company profile it writes. The sections are a presentation
//! convention of the prompt; the answer is kept as free text.

mod config;
mod error;
pub mod prompt;

pub use config::{DEFAULT_LANGUAGE, SynthesizerConfig, SynthesizerConfigBuilder};
pub use error::SynthesisError;

use rig::agent::Agent;
use rig::completion::{CompletionModel, Prompt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use tracing::{info, instrument};

use crate::model::Client;
use crate::normalizer::NormalizedCorpus;

/// Profile text written by the synthesis service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub text: String,
    pub language: String,
}

impl CompanyProfile {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for CompanyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Writes a company profile from a normalized corpus
pub trait ProfileSynthesizer: Send + Sync {
    fn synthesize(
        &self,
        corpus: &NormalizedCorpus,
    ) -> impl Future<Output = Result<CompanyProfile, SynthesisError>> + Send;
}

/// Synthesizer backed by a `rig` completion model
pub struct LlmProfileSynthesizer<M>
where
    M: CompletionModel,
{
    agent: Agent<M>,
    config: SynthesizerConfig,
}

impl<M> LlmProfileSynthesizer<M>
where
    M: CompletionModel,
{
    pub fn new(client: &Client<M>, config: SynthesizerConfig) -> Self {
        Self {
            agent: client.agent(&prompt::preamble(&config.language)),
            config,
        }
    }
}

impl<M> ProfileSynthesizer for LlmProfileSynthesizer<M>
where
    M: CompletionModel,
{
    #[instrument(skip(self, corpus), fields(sources = corpus.sources().len(), chars = corpus.as_str().len()))]
    async fn synthesize(&self, corpus: &NormalizedCorpus) -> Result<CompanyProfile, SynthesisError> {
        if corpus.is_empty() {
            return Err(SynthesisError::EmptyCorpus);
        }

        let request = prompt::build_prompt(corpus, &self.config.language);
        let response = tokio::time::timeout(self.config.timeout(), self.agent.prompt(request))
            .await
            .map_err(|_| SynthesisError::Timeout(self.config.timeout_secs))??;

        let text = response.trim();
        if text.is_empty() {
            return Err(SynthesisError::EmptyResponse);
        }

        info!(chars = text.len(), "Synthesized company profile");
        Ok(CompanyProfile {
            text: text.to_string(),
            language: self.config.language.clone(),
        })
    }
}

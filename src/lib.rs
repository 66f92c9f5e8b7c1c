//! # Company Profiler - LLM-guided company profiles from corporate websites
//!
//! This crate turns a company's website into a short, two-section profile:
//! what the company is (producer, distributor, service provider, its assets
//! and channels) and what it offers. It reads only the few pages that matter
//! and cleans them before any text reaches the language model.
//!
//! ## Pipeline
//!
//! 1. `links`: candidate links one hop from the homepage, noise filtered out
//! 2. `classifier`: YES/NO relevance per link, strictly validated, capped
//! 3. `fetcher`: rendered HTML of the relevant pages, converted to text
//! 4. `normalizer`: boilerplate removal and deduplication into one corpus
//! 5. `synthesizer`: the profile, written by a text-generation model
//!
//! `pipeline` wires the stages together for one company; `jobs` runs many
//! companies from a JSON Lines file.
//!
//! ## Example
//!
//! ```rust,no_run
//! use company_profiler::classifier::{ClassifierConfig, LlmLinkClassifier};
//! use company_profiler::fetcher::{FetcherConfig, HttpPageFetcher};
//! use company_profiler::model::{Client, DEFAULT_OPENAI_MODEL};
//! use company_profiler::pipeline::{PipelineConfig, ProfilePipeline};
//! use company_profiler::synthesizer::{LlmProfileSynthesizer, SynthesizerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new_openai_from_env(DEFAULT_OPENAI_MODEL)?;
//!
//!     let pipeline = ProfilePipeline::new(
//!         HttpPageFetcher::new(FetcherConfig::default())?,
//!         LlmLinkClassifier::new(&client, ClassifierConfig::default()),
//!         LlmProfileSynthesizer::new(&client, SynthesizerConfig::default()),
//!         PipelineConfig::default(),
//!     )?;
//!
//!     let report = pipeline.run("https://example.com").await?;
//!     println!("{}", report.profile);
//!     Ok(())
//! }
//! ```

mod error;
pub mod model;

pub mod classifier;
pub mod fetcher;
pub mod jobs;
pub mod links;
pub mod normalizer;
pub mod pipeline;
pub mod synthesizer;

pub use error::Error;

/// Re-export of commonly used types
pub mod prelude {
    pub use crate::classifier::{LinkVerdict, LlmLinkClassifier, Relevance, RelevanceClassifier};
    pub use crate::error::Error;
    pub use crate::error::Result;
    pub use crate::fetcher::{HttpPageFetcher, PageFetcher, SpiderPageFetcher};
    pub use crate::links::{CandidateLink, extract_links};
    pub use crate::normalizer::{NormalizedCorpus, PageDocument, normalize};
    pub use crate::pipeline::{PipelineConfig, PipelineError, ProfilePipeline};
    pub use crate::synthesizer::{CompanyProfile, LlmProfileSynthesizer, ProfileSynthesizer};
}

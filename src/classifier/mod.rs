//! # Relevance Classification Module
//!
//! Decides which candidate links are worth fetching. The judgment itself is
//! delegated to a text-generation service; this module owns the request
//! protocol and the strict validation of whatever comes back.
//!
//! ## Key Components
//!
//! - `Relevance` / `LinkVerdict`: the validated YES/NO labelling of a link set
//! - `RelevanceClassifier`: the classification boundary
//! - `LlmLinkClassifier`: implementation backed by a `rig` completion model
//! - `parse_verdict`: free text to `LinkVerdict`, or a `ClassificationShapeError`
//!
//! A verdict always labels exactly the links it was asked about and never
//! carries more YES labels than the cap. Which links get YES is up to the
//! service and is not deterministic.

mod config;
mod error;
pub mod prompt;
mod validation;

pub use config::{ClassifierConfig, ClassifierConfigBuilder, DEFAULT_MAX_YES};
pub use error::{ClassificationShapeError, ClassifyError};
pub use validation::parse_verdict;

use rig::agent::Agent;
use rig::completion::{CompletionModel, Prompt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use tracing::{info, instrument};

use crate::links::CandidateLink;
use crate::model::Client;

/// Relevance label for one link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Relevance {
    #[serde(rename = "YES")]
    Yes,
    #[serde(rename = "NO")]
    No,
}

/// YES/NO labels for a set of candidate links
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LinkVerdict {
    labels: BTreeMap<CandidateLink, Relevance>,
}

impl LinkVerdict {
    /// Build a verdict, checking it against the set of links that was asked about
    pub fn try_new(
        expected: &BTreeSet<CandidateLink>,
        labels: BTreeMap<CandidateLink, Relevance>,
        max_yes: usize,
    ) -> Result<Self, ClassificationShapeError> {
        let unexpected: Vec<String> = labels
            .keys()
            .filter(|link| !expected.contains(*link))
            .map(|link| link.to_string())
            .collect();
        if !unexpected.is_empty() {
            return Err(ClassificationShapeError::UnexpectedLinks(unexpected));
        }

        let missing: Vec<String> = expected
            .iter()
            .filter(|link| !labels.contains_key(*link))
            .map(|link| link.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ClassificationShapeError::MissingLinks(missing));
        }

        let verdict = Self { labels };
        let count = verdict.yes_count();
        if count > max_yes {
            return Err(ClassificationShapeError::TooManyYes {
                count,
                max: max_yes,
            });
        }
        Ok(verdict)
    }

    /// Links labelled YES, in lexicographic order
    pub fn yes_links(&self) -> impl Iterator<Item = &CandidateLink> {
        self.labels
            .iter()
            .filter(|(_, relevance)| **relevance == Relevance::Yes)
            .map(|(link, _)| link)
    }

    pub fn yes_count(&self) -> usize {
        self.yes_links().count()
    }

    pub fn get(&self, link: &CandidateLink) -> Option<Relevance> {
        self.labels.get(link).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CandidateLink, Relevance)> {
        self.labels.iter().map(|(link, relevance)| (link, *relevance))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Re-check the verdict against a link set and cap
    pub fn ensure_covers(
        &self,
        expected: &BTreeSet<CandidateLink>,
        max_yes: usize,
    ) -> Result<(), ClassificationShapeError> {
        Self::try_new(expected, self.labels.clone(), max_yes).map(|_| ())
    }
}

/// Labels candidate links as worth fetching or not
pub trait RelevanceClassifier: Send + Sync {
    /// Label every link in `urls`, with at most `max_yes` YES labels
    fn classify(
        &self,
        urls: &BTreeSet<CandidateLink>,
        max_yes: usize,
    ) -> impl Future<Output = Result<LinkVerdict, ClassifyError>> + Send;
}

/// Classifier that asks a language model
pub struct LlmLinkClassifier<M>
where
    M: CompletionModel,
{
    agent: Agent<M>,
    config: ClassifierConfig,
}

impl<M> LlmLinkClassifier<M>
where
    M: CompletionModel,
{
    pub fn new(client: &Client<M>, config: ClassifierConfig) -> Self {
        Self {
            agent: client.agent(prompt::PREAMBLE),
            config,
        }
    }
}

impl<M> RelevanceClassifier for LlmLinkClassifier<M>
where
    M: CompletionModel,
{
    #[instrument(skip(self, urls), fields(candidates = urls.len()))]
    async fn classify(
        &self,
        urls: &BTreeSet<CandidateLink>,
        max_yes: usize,
    ) -> Result<LinkVerdict, ClassifyError> {
        if urls.is_empty() {
            return Ok(LinkVerdict::default());
        }

        let request = prompt::build_prompt(urls, &self.config, max_yes);
        let response = tokio::time::timeout(self.config.timeout(), self.agent.prompt(request))
            .await
            .map_err(|_| ClassifyError::Timeout(self.config.timeout_secs))??;

        let verdict = parse_verdict(&response, urls, max_yes)?;
        info!(yes = verdict.yes_count(), "Classified {} links", verdict.len());
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mock_model::MockCompletionModel;
    use std::time::Duration;

    fn candidates(urls: &[&str]) -> BTreeSet<CandidateLink> {
        urls.iter()
            .map(|u| CandidateLink::parse(u).unwrap())
            .collect()
    }

    fn classifier(mock: &MockCompletionModel, timeout_secs: u64) -> LlmLinkClassifier<MockCompletionModel> {
        let client = Client::new(mock.clone());
        LlmLinkClassifier::new(
            &client,
            ClassifierConfig::builder().timeout_secs(timeout_secs).build(),
        )
    }

    #[tokio::test]
    async fn test_classify_structural_properties() {
        let mock = MockCompletionModel::new();
        mock.push_text(
            r#"{"links": {"https://site.com/o-nas": "YES", "https://site.com/kariera": "NO", "https://site.com/oferta": "YES"}}"#,
        )
        .await;
        let urls = candidates(&[
            "https://site.com/o-nas",
            "https://site.com/kariera",
            "https://site.com/oferta",
        ]);

        let verdict = classifier(&mock, 5).classify(&urls, 3).await.unwrap();

        let keys: BTreeSet<CandidateLink> = verdict.iter().map(|(l, _)| l.clone()).collect();
        assert_eq!(keys, urls);
        assert!(verdict.yes_count() <= 3);
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_classify_surfaces_shape_error() {
        let mock = MockCompletionModel::new();
        mock.push_text(
            r#"{"links": {"https://site.com/a": "YES", "https://site.com/b": "YES"}}"#,
        )
        .await;
        let urls = candidates(&["https://site.com/a", "https://site.com/b"]);

        let result = classifier(&mock, 5).classify(&urls, 1).await;

        assert!(matches!(
            result,
            Err(ClassifyError::Shape(ClassificationShapeError::TooManyYes {
                count: 2,
                max: 1
            }))
        ));
    }

    #[tokio::test]
    async fn test_classify_empty_set_skips_service() {
        let mock = MockCompletionModel::new();

        let verdict = classifier(&mock, 5)
            .classify(&BTreeSet::new(), 3)
            .await
            .unwrap();

        assert!(verdict.is_empty());
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_classify_service_failure() {
        let mock = MockCompletionModel::new();
        mock.push_failure("upstream unavailable").await;
        let urls = candidates(&["https://site.com/a"]);

        let result = classifier(&mock, 5).classify(&urls, 3).await;

        assert!(matches!(result, Err(ClassifyError::Completion(_))));
    }

    #[tokio::test]
    async fn test_classify_timeout() {
        let mock = MockCompletionModel::new().with_delay(Duration::from_secs(5));
        mock.push_text(r#"{"links": {"https://site.com/a": "YES"}}"#).await;
        let urls = candidates(&["https://site.com/a"]);

        tokio::time::pause();
        let result = classifier(&mock, 1).classify(&urls, 3).await;

        assert!(matches!(result, Err(ClassifyError::Timeout(1))));
    }

    #[test]
    fn test_relevance_serializes_as_literals() {
        assert_eq!(serde_json::to_string(&Relevance::Yes).unwrap(), "\"YES\"");
        assert_eq!(serde_json::to_string(&Relevance::No).unwrap(), "\"NO\"");
    }

    #[test]
    fn test_ensure_covers_detects_other_set() {
        let urls = candidates(&["https://site.com/a"]);
        let labels = BTreeMap::from([(CandidateLink::parse("https://site.com/a").unwrap(), Relevance::Yes)]);
        let verdict = LinkVerdict::try_new(&urls, labels, 3).unwrap();

        let other = candidates(&["https://site.com/a", "https://site.com/b"]);

        assert!(verdict.ensure_covers(&urls, 3).is_ok());
        assert!(matches!(
            verdict.ensure_covers(&other, 3),
            Err(ClassificationShapeError::MissingLinks(_))
        ));
        assert!(matches!(
            verdict.ensure_covers(&urls, 0),
            Err(ClassificationShapeError::TooManyYes { .. })
        ));
    }
}

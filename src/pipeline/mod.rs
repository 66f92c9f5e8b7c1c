//! # Profiling Pipeline
//!
//! Runs one company through every stage: homepage fetch, link extraction,
//! relevance classification, fetching the relevant pages, normalization and
//! synthesis. Each run owns its own links, pages and corpus, so independent
//! runs can go in parallel without coordination.
//!
//! Failure policy:
//! - homepage fetch failure aborts the run before anything else is invoked
//! - a classification failure aborts the run before any page is fetched
//! - a failed relevant page is skipped and recorded; its siblings carry on
//! - nothing to summarize ends the run as insufficient data, without a
//!   synthesis call

mod config;
mod error;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{EmptyCorpusReason, PipelineError, Stage};

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{info, instrument, warn};

use crate::classifier::{ClassifyError, LinkVerdict, RelevanceClassifier};
use crate::fetcher::{FetchError, PageFetcher, extract_text};
use crate::links::{CandidateLink, LinkError, LinkFilter, extract_links};
use crate::normalizer::{NormalizedCorpus, PageDocument, normalize};
use crate::synthesizer::{CompanyProfile, ProfileSynthesizer};

/// A relevant page that was left out of the corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPage {
    pub url: String,
    pub reason: String,
}

/// Everything gathered up to and including the normalized corpus
#[derive(Debug, Clone, Serialize)]
pub struct CorpusReport {
    pub url: String,
    pub candidates: BTreeSet<CandidateLink>,
    pub verdict: LinkVerdict,
    pub skipped: Vec<SkippedPage>,
    pub corpus: NormalizedCorpus,
}

/// Result of a complete run
#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    #[serde(flatten)]
    pub corpus: CorpusReport,
    pub profile: CompanyProfile,
}

/// One company in, one profile out
pub struct ProfilePipeline<F, C, S> {
    fetcher: F,
    classifier: C,
    synthesizer: S,
    link_filter: LinkFilter,
    config: PipelineConfig,
}

impl<F, C, S> ProfilePipeline<F, C, S>
where
    F: PageFetcher,
    C: RelevanceClassifier,
    S: ProfileSynthesizer,
{
    /// Assemble a pipeline; fails only if the link filter patterns are invalid
    pub fn new(
        fetcher: F,
        classifier: C,
        synthesizer: S,
        config: PipelineConfig,
    ) -> Result<Self, LinkError> {
        let link_filter = config.link_filter.compile()?;
        Ok(Self {
            fetcher,
            classifier,
            synthesizer,
            link_filter,
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage for one company
    #[instrument(skip(self))]
    pub async fn run(&self, url: &str) -> Result<ProfileReport, PipelineError> {
        let corpus = self.build_corpus(url).await?;
        let profile = self.synthesize(&corpus).await?;

        info!(sources = corpus.corpus.sources().len(), "Company profile ready");
        Ok(ProfileReport { corpus, profile })
    }

    /// Write the profile for an already built corpus
    pub async fn synthesize(&self, report: &CorpusReport) -> Result<CompanyProfile, PipelineError> {
        self.synthesizer
            .synthesize(&report.corpus)
            .await
            .map_err(|source| PipelineError::Synthesis {
                url: report.url.clone(),
                source,
            })
    }

    /// Run every stage except synthesis
    #[instrument(skip(self))]
    pub async fn build_corpus(&self, url: &str) -> Result<CorpusReport, PipelineError> {
        let candidates = self.discover_links(url).await?;
        if candidates.is_empty() {
            return Err(PipelineError::EmptyCorpus {
                url: url.to_string(),
                reason: EmptyCorpusReason::NoCandidateLinks,
            });
        }

        let verdict = self.classify_links(url, &candidates).await?;
        let (corpus, skipped) = self.collect_corpus(url, &verdict).await?;

        Ok(CorpusReport {
            url: url.to_string(),
            candidates,
            verdict,
            skipped,
            corpus,
        })
    }

    /// Fetch the homepage and extract its candidate links
    #[instrument(skip(self))]
    pub async fn discover_links(&self, url: &str) -> Result<BTreeSet<CandidateLink>, PipelineError> {
        let html = self
            .fetch_html(url)
            .await
            .map_err(|source| PipelineError::Homepage {
                url: url.to_string(),
                source,
            })?;

        let candidates =
            extract_links(&html, url, &self.link_filter).map_err(|source| PipelineError::Links {
                url: url.to_string(),
                source,
            })?;

        info!(candidates = candidates.len(), "Discovered candidate links");
        Ok(candidates)
    }

    /// Label candidate links, rejecting any verdict that breaks the contract
    pub async fn classify_links(
        &self,
        url: &str,
        candidates: &BTreeSet<CandidateLink>,
    ) -> Result<LinkVerdict, PipelineError> {
        let max_yes = self.config.max_yes;
        let classification_error = |source: ClassifyError| PipelineError::Classification {
            url: url.to_string(),
            source,
        };

        let verdict = self
            .classifier
            .classify(candidates, max_yes)
            .await
            .map_err(classification_error)?;

        // Checked here too, so every classifier implementation meets the same contract
        verdict
            .ensure_covers(candidates, max_yes)
            .map_err(|shape| classification_error(shape.into()))?;

        Ok(verdict)
    }

    /// Fetch every YES page and normalize the results
    pub async fn collect_corpus(
        &self,
        url: &str,
        verdict: &LinkVerdict,
    ) -> Result<(NormalizedCorpus, Vec<SkippedPage>), PipelineError> {
        let relevant: Vec<&CandidateLink> = verdict.yes_links().collect();
        if relevant.is_empty() {
            return Err(PipelineError::EmptyCorpus {
                url: url.to_string(),
                reason: EmptyCorpusReason::NoRelevantLinks,
            });
        }

        // `buffered` yields in input order, whatever order fetches finish in
        let results: Vec<(&CandidateLink, Result<String, FetchError>)> = stream::iter(relevant)
            .map(|link| async move { (link, self.fetch_html(link.as_str()).await) })
            .buffered(self.config.fetch_concurrency.max(1))
            .collect()
            .await;

        let mut pages = Vec::new();
        let mut skipped = Vec::new();
        for (link, result) in results {
            match result {
                Ok(html) => {
                    let text = extract_text(&html, &self.config.exclude_selectors);
                    pages.push(PageDocument::new(link.as_str(), text));
                }
                Err(e) => {
                    warn!(url = %link, error = %e, "Skipping page that failed to fetch");
                    skipped.push(SkippedPage {
                        url: link.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if pages.is_empty() {
            return Err(PipelineError::EmptyCorpus {
                url: url.to_string(),
                reason: EmptyCorpusReason::NoPagesFetched {
                    failed: skipped.len(),
                },
            });
        }

        let corpus = normalize(&pages, &self.config.noise_filters);
        if corpus.is_empty() {
            return Err(PipelineError::EmptyCorpus {
                url: url.to_string(),
                reason: EmptyCorpusReason::AllPagesEmpty { pages: pages.len() },
            });
        }

        for page in &pages {
            if !corpus.sources().contains(&page.url) {
                skipped.push(SkippedPage {
                    url: page.url.clone(),
                    reason: "empty after cleaning".to_string(),
                });
            }
        }

        Ok((corpus, skipped))
    }

    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        tokio::time::timeout(self.config.fetch_timeout(), self.fetcher.fetch(url))
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassificationShapeError, ClassifierConfig, LlmLinkClassifier};
    use crate::model::Client;
    use crate::model::mock_model::MockCompletionModel;
    use crate::synthesizer::{LlmProfileSynthesizer, SynthesizerConfig};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const HOME: &str = "https://firma.pl";

    const HOMEPAGE: &str = r#"<html><body>
        <a href="/o-nas">O nas</a>
        <a href="/oferta">Oferta</a>
        <a href="/kariera">Kariera</a>
        <a href="/blog/nowosci">Blog</a>
        <a href="mailto:biuro@firma.pl">Napisz</a>
    </body></html>"#;

    #[derive(Clone)]
    enum Page {
        Html(String),
        Missing,
        Hang,
    }

    #[derive(Clone, Default)]
    struct StubFetcher {
        pages: HashMap<String, Page>,
        requested: Arc<Mutex<Vec<String>>>,
    }

    impl StubFetcher {
        fn with(mut self, url: &str, page: Page) -> Self {
            self.pages.insert(url.to_string(), page);
            self
        }

        fn html(self, url: &str, body: &str) -> Self {
            self.with(url, Page::Html(format!("<html><body><p>{}</p></body></html>", body)))
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    impl PageFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());
            match self.pages.get(url).cloned().unwrap_or(Page::Missing) {
                Page::Html(html) => Ok(html),
                Page::Missing => Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                }),
                Page::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(FetchError::EmptyBody {
                        url: url.to_string(),
                    })
                }
            }
        }
    }

    struct Harness {
        fetcher: StubFetcher,
        classifier_model: MockCompletionModel,
        synthesizer_model: MockCompletionModel,
    }

    impl Harness {
        fn new(fetcher: StubFetcher) -> Self {
            Self {
                fetcher,
                classifier_model: MockCompletionModel::new(),
                synthesizer_model: MockCompletionModel::new(),
            }
        }

        fn pipeline(
            &self,
        ) -> ProfilePipeline<
            StubFetcher,
            LlmLinkClassifier<MockCompletionModel>,
            LlmProfileSynthesizer<MockCompletionModel>,
        > {
            ProfilePipeline::new(
                self.fetcher.clone(),
                LlmLinkClassifier::new(
                    &Client::new(self.classifier_model.clone()),
                    ClassifierConfig::default(),
                ),
                LlmProfileSynthesizer::new(
                    &Client::new(self.synthesizer_model.clone()),
                    SynthesizerConfig::default(),
                ),
                PipelineConfig::builder().fetch_timeout_secs(5).build(),
            )
            .unwrap()
        }
    }

    fn verdict_json(o_nas: &str, oferta: &str, kariera: &str) -> String {
        format!(
            r#"{{"links": {{"https://firma.pl/o-nas": "{}", "https://firma.pl/oferta": "{}", "https://firma.pl/kariera": "{}"}}}}"#,
            o_nas, oferta, kariera
        )
    }

    #[tokio::test]
    async fn test_full_run() {
        let harness = Harness::new(
            StubFetcher::default()
                .with(HOME, Page::Html(HOMEPAGE.to_string()))
                .html("https://firma.pl/o-nas", "Jesteśmy producentem okien. tel. 22 123 45 67")
                .html("https://firma.pl/oferta", "Okna PCV. Drzwi. Okna PCV."),
        );
        harness
            .classifier_model
            .push_text(&verdict_json("YES", "YES", "NO"))
            .await;
        harness
            .synthesizer_model
            .push_text("Profil funkcjonalny: producent okien.")
            .await;

        let report = harness.pipeline().run(HOME).await.unwrap();

        assert_eq!(report.profile.as_str(), "Profil funkcjonalny: producent okien.");
        assert_eq!(report.corpus.candidates.len(), 3);
        assert_eq!(
            report.corpus.corpus.sources(),
            &["https://firma.pl/o-nas", "https://firma.pl/oferta"]
        );
        assert!(report.corpus.corpus.as_str().contains("Okna PCV. Drzwi."));
        assert!(!report.corpus.corpus.as_str().contains("123 45 67"));
        assert!(report.corpus.skipped.is_empty());
        assert!(!harness.fetcher.requested().contains(&"https://firma.pl/kariera".to_string()));
        assert_eq!(harness.synthesizer_model.calls(), 1);
    }

    #[tokio::test]
    async fn test_homepage_timeout_stops_everything() {
        let harness = Harness::new(StubFetcher::default().with(HOME, Page::Hang));

        tokio::time::pause();
        let result = harness.pipeline().run(HOME).await;

        let err = result.unwrap_err();
        assert_eq!(err.stage(), Stage::Homepage);
        assert!(matches!(
            err,
            PipelineError::Homepage { source: FetchError::Timeout { .. }, .. }
        ));
        assert_eq!(harness.fetcher.requested(), vec![HOME.to_string()]);
        assert_eq!(harness.classifier_model.calls(), 0);
        assert_eq!(harness.synthesizer_model.calls(), 0);
    }

    #[tokio::test]
    async fn test_all_pages_empty_skips_synthesis() {
        let harness = Harness::new(
            StubFetcher::default()
                .with(HOME, Page::Html(HOMEPAGE.to_string()))
                .html("https://firma.pl/o-nas", "   ")
                .html("https://firma.pl/oferta", "Cookies. Polityka prywatności"),
        );
        harness
            .classifier_model
            .push_text(&verdict_json("YES", "YES", "NO"))
            .await;

        let err = harness.pipeline().run(HOME).await.unwrap_err();

        assert!(err.is_insufficient_data());
        assert!(matches!(
            err,
            PipelineError::EmptyCorpus {
                reason: EmptyCorpusReason::AllPagesEmpty { pages: 2 },
                ..
            }
        ));
        assert_eq!(harness.synthesizer_model.calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_page_is_skipped_not_fatal() {
        let harness = Harness::new(
            StubFetcher::default()
                .with(HOME, Page::Html(HOMEPAGE.to_string()))
                .html("https://firma.pl/oferta", "Okna PCV."),
        );
        harness
            .classifier_model
            .push_text(&verdict_json("YES", "YES", "NO"))
            .await;
        harness.synthesizer_model.push_text("Profil.").await;

        let report = harness.pipeline().run(HOME).await.unwrap();

        assert_eq!(report.corpus.corpus.sources(), &["https://firma.pl/oferta"]);
        assert_eq!(report.corpus.skipped.len(), 1);
        assert_eq!(report.corpus.skipped[0].url, "https://firma.pl/o-nas");
        assert!(report.corpus.skipped[0].reason.contains("404"));
    }

    #[tokio::test]
    async fn test_every_page_failing_is_insufficient_data() {
        let harness = Harness::new(StubFetcher::default().with(HOME, Page::Html(HOMEPAGE.to_string())));
        harness
            .classifier_model
            .push_text(&verdict_json("YES", "NO", "NO"))
            .await;

        let err = harness.pipeline().run(HOME).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::EmptyCorpus {
                reason: EmptyCorpusReason::NoPagesFetched { failed: 1 },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_shape_violation_aborts_before_fetching() {
        let harness = Harness::new(StubFetcher::default().with(HOME, Page::Html(HOMEPAGE.to_string())));
        harness
            .classifier_model
            .push_text(&verdict_json("YES", "YES", "maybe"))
            .await;

        let err = harness.pipeline().run(HOME).await.unwrap_err();

        assert_eq!(err.stage(), Stage::Classification);
        assert!(matches!(
            err,
            PipelineError::Classification {
                source: ClassifyError::Shape(ClassificationShapeError::InvalidLabel { .. }),
                ..
            }
        ));
        assert_eq!(harness.fetcher.requested(), vec![HOME.to_string()]);
        assert_eq!(harness.synthesizer_model.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_relevant_links_has_no_fallback() {
        let harness = Harness::new(StubFetcher::default().with(HOME, Page::Html(HOMEPAGE.to_string())));
        harness
            .classifier_model
            .push_text(&verdict_json("NO", "NO", "NO"))
            .await;

        let err = harness.pipeline().run(HOME).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::EmptyCorpus {
                reason: EmptyCorpusReason::NoRelevantLinks,
                ..
            }
        ));
        assert_eq!(harness.fetcher.requested(), vec![HOME.to_string()]);
    }

    #[tokio::test]
    async fn test_homepage_without_links() {
        let harness = Harness::new(
            StubFetcher::default().with(HOME, Page::Html("<p>Strona w budowie</p>".to_string())),
        );

        let err = harness.pipeline().run(HOME).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::EmptyCorpus {
                reason: EmptyCorpusReason::NoCandidateLinks,
                ..
            }
        ));
        assert_eq!(harness.classifier_model.calls(), 0);
    }

    struct OverEagerClassifier;

    impl RelevanceClassifier for OverEagerClassifier {
        async fn classify(
            &self,
            _urls: &BTreeSet<CandidateLink>,
            _max_yes: usize,
        ) -> Result<LinkVerdict, ClassifyError> {
            let everything: BTreeSet<CandidateLink> = ["https://firma.pl/o-nas", "https://firma.pl/x"]
                .iter()
                .map(|u| CandidateLink::parse(u).unwrap())
                .collect();
            let labels = everything
                .iter()
                .map(|l| (l.clone(), crate::classifier::Relevance::Yes))
                .collect();
            Ok(LinkVerdict::try_new(&everything, labels, 10)?)
        }
    }

    #[tokio::test]
    async fn test_pipeline_revalidates_foreign_classifier() {
        let fetcher = StubFetcher::default().with(HOME, Page::Html(HOMEPAGE.to_string()));
        let pipeline = ProfilePipeline::new(
            fetcher.clone(),
            OverEagerClassifier,
            LlmProfileSynthesizer::new(
                &Client::new(MockCompletionModel::new()),
                SynthesizerConfig::default(),
            ),
            PipelineConfig::default(),
        )
        .unwrap();

        let err = pipeline.build_corpus(HOME).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Classification {
                source: ClassifyError::Shape(ClassificationShapeError::UnexpectedLinks(_)),
                ..
            }
        ));
        assert_eq!(fetcher.requested(), vec![HOME.to_string()]);
    }

    #[test]
    fn test_error_converts_with_stage() {
        let err = PipelineError::EmptyCorpus {
            url: HOME.to_string(),
            reason: EmptyCorpusReason::NoRelevantLinks,
        };

        let crate_err: crate::Error = err.into();

        assert!(matches!(crate_err, crate::Error::Pipeline { stage: "corpus", .. }));
    }
}

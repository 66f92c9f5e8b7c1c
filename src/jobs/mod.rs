//! # Job Intake Module
//!
//! Batch processing of many companies. A job file is JSON Lines, one
//! `{"row": ..., "url": ..., "regon": ...}` object per line (`strona_www` is
//! accepted for `url`). Every job is an independent pipeline run; outcomes
//! are written back as JSON Lines, one per job, in input order.

mod error;

pub use error::JobError;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

use crate::classifier::RelevanceClassifier;
use crate::fetcher::PageFetcher;
use crate::normalizer::digits;
use crate::pipeline::{PipelineError, ProfilePipeline, Stage};
use crate::synthesizer::ProfileSynthesizer;

/// Opaque reference back to the job's source row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowRef {
    Index(u64),
    Key(String),
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowRef::Index(index) => write!(f, "{}", index),
            RowRef::Key(key) => f.write_str(key),
        }
    }
}

/// One company to profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub row: RowRef,

    #[serde(alias = "strona_www")]
    pub url: String,

    /// Registration number, only checked for presence in the corpus
    #[serde(default)]
    pub regon: Option<String>,
}

impl Job {
    /// The URL to start from; bare domains get an `https://` scheme
    pub fn target_url(&self) -> String {
        let url = self.url.trim();
        if url.contains("://") {
            url.to_string()
        } else {
            format!("https://{}", url)
        }
    }

    /// The registration number, if it has any digits at all
    fn regon_digits(&self) -> Option<String> {
        self.regon
            .as_deref()
            .map(digits)
            .filter(|digits| !digits.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Completed,
    InsufficientData,
    Failed,
}

/// Why a job did not produce a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobFailure {
    pub stage: Stage,
    pub reason: String,
}

/// Result record for one job
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub row: RowRef,
    pub url: String,
    pub status: JobStatus,
    pub profile: Option<String>,
    pub failure: Option<JobFailure>,
    /// Whether the job's REGON digits appear in the corpus; `None` when there
    /// was no REGON or no corpus to check
    pub regon_found: Option<bool>,
    pub sources: Vec<String>,
    pub processed_at: DateTime<Utc>,
}

impl JobOutcome {
    fn new(job: &Job, url: String) -> Self {
        Self {
            row: job.row.clone(),
            url,
            status: JobStatus::Failed,
            profile: None,
            failure: None,
            regon_found: None,
            sources: Vec::new(),
            processed_at: Utc::now(),
        }
    }

    fn with_error(mut self, err: &PipelineError) -> Self {
        self.status = if err.is_insufficient_data() {
            JobStatus::InsufficientData
        } else {
            JobStatus::Failed
        };
        self.failure = Some(JobFailure {
            stage: err.stage(),
            reason: err.to_string(),
        });
        self
    }
}

/// Parse JSON Lines job text, skipping blank lines
pub fn parse_jobs(text: &str) -> Result<Vec<Job>, JobError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|source| JobError::Parse {
                line: index + 1,
                source,
            })
        })
        .collect()
}

/// Read a JSON Lines job file
pub async fn read_jobs(path: &Path) -> Result<Vec<Job>, JobError> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|source| JobError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_jobs(&text)
}

/// Write outcomes as JSON Lines, replacing the file
pub async fn write_outcomes(path: &Path, outcomes: &[JobOutcome]) -> Result<(), JobError> {
    let mut text = String::new();
    for outcome in outcomes {
        text.push_str(&serde_json::to_string(outcome)?);
        text.push('\n');
    }
    fs::write(path, text).await.map_err(|source| JobError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Run one job to completion; failures become part of the outcome
#[instrument(skip(pipeline, job), fields(row = %job.row))]
pub async fn run_job<F, C, S>(pipeline: &ProfilePipeline<F, C, S>, job: Job) -> JobOutcome
where
    F: PageFetcher,
    C: RelevanceClassifier,
    S: ProfileSynthesizer,
{
    let url = job.target_url();
    let outcome = JobOutcome::new(&job, url.clone());

    let report = match pipeline.build_corpus(&url).await {
        Ok(report) => report,
        Err(e) => {
            warn!(error = %e, "Job ended without a corpus");
            return outcome.with_error(&e);
        }
    };

    let mut outcome = JobOutcome {
        regon_found: job
            .regon_digits()
            .map(|regon| report.corpus.mentions_identifier(&regon)),
        sources: report.corpus.sources().to_vec(),
        ..outcome
    };

    match pipeline.synthesize(&report).await {
        Ok(profile) => {
            info!(regon_found = ?outcome.regon_found, "Job completed");
            outcome.status = JobStatus::Completed;
            outcome.profile = Some(profile.text);
            outcome
        }
        Err(e) => {
            warn!(error = %e, "Job failed at synthesis");
            outcome.with_error(&e)
        }
    }
}

/// Run jobs as independent pipelines, at most `concurrency` at a time
///
/// `on_outcome` is called as each job finishes. Outcomes are returned in
/// job order.
pub async fn run_batch<F, C, S, P>(
    pipeline: &ProfilePipeline<F, C, S>,
    jobs: Vec<Job>,
    concurrency: usize,
    mut on_outcome: P,
) -> Vec<JobOutcome>
where
    F: PageFetcher,
    C: RelevanceClassifier,
    S: ProfileSynthesizer,
    P: FnMut(&JobOutcome),
{
    stream::iter(jobs)
        .map(|job| run_job(pipeline, job))
        .buffered(concurrency.max(1))
        .inspect(|outcome| on_outcome(outcome))
        .collect()
        .await
}

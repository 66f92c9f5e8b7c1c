//! Error types for the jobs module

use std::{io, path::PathBuf};
use thiserror::Error;

use crate::error::Error as CrateError;

/// Error type for job intake and outcome storage
#[derive(Debug, Error)]
pub enum JobError {
    /// Reading or writing a job file failed
    #[error("IO error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    /// A line of the job file is not a valid job
    #[error("Invalid job on line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },

    /// An outcome could not be serialized
    #[error("Could not serialize outcome: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<JobError> for CrateError {
    fn from(err: JobError) -> Self {
        CrateError::Job(err.to_string())
    }
}

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{path} is missing required column `{column}`")]
    MissingColumn { path: PathBuf, column: String },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to encode run manifest: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("refusing to overwrite existing export {0}")]
    AlreadyExists(PathBuf),
}

/// Raised when the assembled snapshot does not cover the roster exactly once.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("snapshot incomplete: {} missing, {} duplicated, {} unexpected", .missing.len(), .duplicated.len(), .unexpected.len())]
pub struct CompletenessError {
    pub missing: Vec<String>,
    pub duplicated: Vec<String>,
    pub unexpected: Vec<String>,
}

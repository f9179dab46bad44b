//! Error taxonomy for the archive and the scoring path.
//!
//! Dataset-level problems ([`ArchiveError`]) are fatal: no partial archive is
//! ever produced. Scoring problems ([`ScoreError`]) are per-item and are
//! recorded by the pipeline rather than propagated.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ArchiveError {
    /// A key is not a calendar date, a key repeats, or the source is unreadable.
    #[error("malformed dataset: {key}: {reason}")]
    MalformedDataset { key: String, reason: String },

    #[error("malformed dataset: source contains no entries")]
    EmptySource,

    #[error("archive is empty")]
    EmptyArchive,
}

impl ArchiveError {
    pub fn malformed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ArchiveError::MalformedDataset {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoreError {
    #[error("text is empty")]
    EmptyText,

    #[error("classifier failed: {0}")]
    Classifier(String),

    #[error("classifier returned confidence {0} outside [0, 1]")]
    InvalidConfidence(f64),

    #[error("classifier timed out after {0:?}")]
    Timeout(Duration),
}

impl ScoreError {
    /// Stable machine-readable tag used in failure reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ScoreError::EmptyText => "empty_text",
            ScoreError::Classifier(_) => "classifier",
            ScoreError::InvalidConfidence(_) => "invalid_confidence",
            ScoreError::Timeout(_) => "timeout",
        }
    }
}

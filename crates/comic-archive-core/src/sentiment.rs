//! Sentiment scoring through an injected classifier.
//!
//! Defines the [`Classifier`] trait that all classification backends
//! implement, and [`SentimentScorer`], which turns a classifier verdict into
//! a signed score in `[-1.0, 1.0]`:
//!
//! | Label | Score |
//! |-------|-------|
//! | `POSITIVE` | `confidence` |
//! | `NEGATIVE` | `-confidence` |
//!
//! The mapping is exact; there is no smoothing or thresholding. Concrete
//! classifier implementations (built-in lexicon, HTTP inference endpoint)
//! live in the `comic-archive` app crate.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ScoreError;
use crate::models::{Classification, Label};

/// Trait for sentiment classification backends.
///
/// A classifier may be expensive to invoke; callers should not assume
/// anything about its latency. It is only ever called with non-blank text.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Returns the backend identifier (e.g. `"lexicon"`).
    fn name(&self) -> &str;

    /// Classify one text.
    async fn classify(&self, text: &str) -> Result<Classification, ScoreError>;
}

/// Map a classifier verdict to a signed score.
///
/// Fails with [`ScoreError::InvalidConfidence`] when the confidence is not a
/// number in `[0, 1]`.
pub fn signed_score(verdict: Classification) -> Result<f64, ScoreError> {
    let c = verdict.confidence;
    if !(0.0..=1.0).contains(&c) {
        return Err(ScoreError::InvalidConfidence(c));
    }
    Ok(match verdict.label {
        Label::Positive => c,
        Label::Negative => -c,
    })
}

/// Scores item text with a shared [`Classifier`].
#[derive(Clone)]
pub struct SentimentScorer {
    classifier: Arc<dyn Classifier>,
}

impl SentimentScorer {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Score `text`. Empty or whitespace-only text fails with
    /// [`ScoreError::EmptyText`] without reaching the classifier.
    pub async fn score(&self, text: &str) -> Result<f64, ScoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ScoreError::EmptyText);
        }
        let verdict = self.classifier.classify(text).await?;
        signed_score(verdict)
    }
}

//! Sentiment classifier backends.
//!
//! Implements the core [`Classifier`] trait for:
//! - **[`DisabledClassifier`]**: returns errors; used when sentiment is not configured.
//! - **[`LexiconClassifier`]**: a deterministic built-in word-list classifier that
//!   needs no model download. The default.
//! - **[`HttpClassifier`]**: calls a Hugging Face style inference endpoint with
//!   retry and backoff.
//!
//! # Provider Selection
//!
//! Use [`create_classifier`] to instantiate the backend named in the config:
//!
//! ```rust,no_run
//! # use comic_archive::config::SentimentConfig;
//! # use comic_archive::classifier::create_classifier;
//! let config = SentimentConfig::default(); // provider = "lexicon"
//! let classifier = create_classifier(&config).unwrap();
//! assert_eq!(classifier.name(), "lexicon");
//! ```
//!
//! # Retry Strategy
//!
//! The HTTP backend retries transient errors with exponential backoff:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use comic_archive_core::error::ScoreError;
use comic_archive_core::models::{Classification, Label};
use comic_archive_core::sentiment::Classifier;

use crate::config::SentimentConfig;

/// Environment variable holding an optional bearer token for [`HttpClassifier`].
pub const TOKEN_ENV: &str = "COMICS_CLASSIFIER_TOKEN";

/// Create the [`Classifier`] named by `config.provider`.
///
/// | Config Value | Classifier |
/// |-------------|----------|
/// | `"disabled"` | [`DisabledClassifier`] |
/// | `"lexicon"` | [`LexiconClassifier`] |
/// | `"http"` | [`HttpClassifier`] |
pub fn create_classifier(config: &SentimentConfig) -> Result<Arc<dyn Classifier>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledClassifier)),
        "lexicon" => Ok(Arc::new(LexiconClassifier::new())),
        "http" => Ok(Arc::new(HttpClassifier::new(config)?)),
        other => bail!("Unknown sentiment provider: {}", other),
    }
}

// ============ Disabled ============

/// A classifier that always fails.
pub struct DisabledClassifier;

#[async_trait]
impl Classifier for DisabledClassifier {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn classify(&self, _text: &str) -> Result<Classification, ScoreError> {
        Err(ScoreError::Classifier(
            "sentiment provider is disabled".to_string(),
        ))
    }
}

// ============ Lexicon ============

const POSITIVE_WORDS: &[&str] = &[
    "amazing", "awesome", "best", "better", "brilliant", "celebrate", "cool", "delighted",
    "enjoy", "excellent", "excited", "fantastic", "fun", "glad", "good", "great", "happy",
    "hooray", "love", "lovely", "lucky", "nice", "perfect", "pleased", "promoted", "proud",
    "success", "successful", "thank", "thanks", "win", "wonderful", "yay", "yes",
];

const NEGATIVE_WORDS: &[&str] = &[
    "angry", "annoying", "awful", "bad", "boring", "broken", "cut", "dead", "die", "disaster",
    "doomed", "fail", "failed", "failure", "fired", "hate", "horrible", "idiot", "kill",
    "layoff", "layoffs", "miserable", "no", "pain", "sad", "stupid", "terrible", "ugh",
    "useless", "waste", "worse", "worst", "wrong",
];

/// Word-list classifier.
///
/// Counts positive and negative words; the label follows the sign of the
/// difference and the confidence is `|pos - neg| / (pos + neg)`. Text with
/// no sentiment words, or a tie, is `POSITIVE` with confidence `0.0`.
pub struct LexiconClassifier {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
}

impl LexiconClassifier {
    pub fn new() -> Self {
        Self {
            positive: POSITIVE_WORDS.iter().copied().collect(),
            negative: NEGATIVE_WORDS.iter().copied().collect(),
        }
    }

    pub fn verdict(&self, text: &str) -> Classification {
        let mut pos = 0usize;
        let mut neg = 0usize;
        for word in text
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|w| !w.is_empty())
        {
            let word = word.trim_matches('\'').to_lowercase();
            if self.positive.contains(word.as_str()) {
                pos += 1;
            } else if self.negative.contains(word.as_str()) {
                neg += 1;
            }
        }

        let total = pos + neg;
        if total == 0 || pos == neg {
            return Classification::positive(0.0);
        }
        let confidence = pos.abs_diff(neg) as f64 / total as f64;
        if pos > neg {
            Classification::positive(confidence)
        } else {
            Classification::negative(confidence)
        }
    }
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Classifier for LexiconClassifier {
    fn name(&self) -> &str {
        "lexicon"
    }

    async fn classify(&self, text: &str) -> Result<Classification, ScoreError> {
        Ok(self.verdict(text))
    }
}

// ============ HTTP ============

/// Classifier backed by an HTTP inference endpoint.
///
/// Sends `POST {endpoint}` with `{"inputs": "<text>"}` and accepts either
/// `[{"label": ..., "score": ...}]` or the nested `[[...]]` form; the
/// highest-scoring label wins.
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    max_retries: u32,
}

impl HttpClassifier {
    /// Create a new HTTP classifier from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoint` is not set or the HTTP client cannot be built.
    pub fn new(config: &SentimentConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| anyhow::anyhow!("sentiment.endpoint required for http provider"))?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        tracing::info!(endpoint = %endpoint, model = %config.model, "using http classifier");

        Ok(Self {
            client,
            endpoint,
            token: std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()),
            max_retries: config.max_retries,
        })
    }

    async fn request(&self, text: &str) -> Result<Classification> {
        let body = serde_json::json!({ "inputs": text });
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, 8s, ...
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tracing::debug!(attempt, ?delay, "retrying classifier request");
                tokio::time::sleep(delay).await;
            }

            let mut req = self.client.post(&self.endpoint).json(&body);
            if let Some(ref token) = self.token {
                req = req.bearer_auth(token);
            }

            match req.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return parse_response(&json);
                    }

                    // Rate limited or server error, retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err = Some(anyhow::anyhow!(
                            "classifier error {}: {}",
                            status,
                            body_text
                        ));
                        continue;
                    }

                    // Client error (not 429), no retry
                    let body_text = response.text().await.unwrap_or_default();
                    bail!("classifier error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("classification failed after retries")))
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    fn name(&self) -> &str {
        "http"
    }

    async fn classify(&self, text: &str) -> Result<Classification, ScoreError> {
        self.request(text)
            .await
            .map_err(|e| ScoreError::Classifier(format!("{:#}", e)))
    }
}

/// Parse an inference response into the highest-scoring [`Classification`].
fn parse_response(json: &serde_json::Value) -> Result<Classification> {
    let mut candidates = json
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("invalid classifier response: expected an array"))?;

    // Text-classification endpoints nest one list per input.
    if let Some(inner) = candidates.first().and_then(|v| v.as_array()) {
        candidates = inner;
    }

    let mut best: Option<Classification> = None;
    for candidate in candidates {
        let label = candidate
            .get("label")
            .and_then(|l| l.as_str())
            .ok_or_else(|| anyhow::anyhow!("invalid classifier response: missing label"))?;
        let score = candidate
            .get("score")
            .and_then(|s| s.as_f64())
            .ok_or_else(|| anyhow::anyhow!("invalid classifier response: missing score"))?;
        let label: Label = label.parse().map_err(|e: String| anyhow::anyhow!(e))?;

        if best.map_or(true, |b| score > b.confidence) {
            best = Some(Classification {
                label,
                confidence: score,
            });
        }
    }

    best.ok_or_else(|| anyhow::anyhow!("invalid classifier response: no labels"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lexicon_positive_and_negative() {
        let lex = LexiconClassifier::new();
        assert_eq!(
            lex.verdict("What a great day, I love it!"),
            Classification::positive(1.0)
        );
        let v = lex.verdict("This is the worst plan. Great, just great. Terrible and stupid.");
        assert_eq!(v.label, Label::Negative);
        assert!((v.confidence - 1.0 / 5.0).abs() < 1e-12);
    }

    #[test]
    fn lexicon_neutral_text_scores_zero() {
        let lex = LexiconClassifier::new();
        assert_eq!(lex.verdict("The meeting is at noon."), Classification::positive(0.0));
        assert_eq!(lex.verdict("good bad"), Classification::positive(0.0));
    }

    #[test]
    fn lexicon_is_case_insensitive() {
        let lex = LexiconClassifier::new();
        assert_eq!(lex.verdict("FIRED!"), Classification::negative(1.0));
    }

    #[test]
    fn parse_flat_response() {
        let v = parse_response(&json!([{"label": "NEGATIVE", "score": 0.93}])).unwrap();
        assert_eq!(v, Classification::negative(0.93));
    }

    #[test]
    fn parse_nested_response_picks_best() {
        let v = parse_response(&json!([[
            {"label": "LABEL_0", "score": 0.2},
            {"label": "LABEL_1", "score": 0.8}
        ]]))
        .unwrap();
        assert_eq!(v, Classification::positive(0.8));
    }

    #[test]
    fn parse_rejects_bad_responses() {
        assert!(parse_response(&json!({"error": "loading"})).is_err());
        assert!(parse_response(&json!([])).is_err());
        assert!(parse_response(&json!([{"label": "NEUTRAL", "score": 0.5}])).is_err());
        assert!(parse_response(&json!([{"label": "POSITIVE"}])).is_err());
    }

    #[test]
    fn create_known_providers() {
        let mut config = SentimentConfig::default();
        assert_eq!(create_classifier(&config).unwrap().name(), "lexicon");
        config.provider = "disabled".to_string();
        assert_eq!(create_classifier(&config).unwrap().name(), "disabled");
        config.provider = "http".to_string();
        assert!(create_classifier(&config).is_err());
        config.endpoint = Some("http://127.0.0.1:9/classify".to_string());
        assert_eq!(create_classifier(&config).unwrap().name(), "http");
    }

    #[tokio::test]
    async fn disabled_always_fails() {
        let err = DisabledClassifier.classify("hello").await.unwrap_err();
        assert!(matches!(err, ScoreError::Classifier(_)));
    }
}

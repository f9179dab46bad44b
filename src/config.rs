use anyhow::{Context, Result};
use comic_archive_core::search::{SearchOptions, SearchOrder, DEFAULT_EXCERPT_CHARS};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub sentiment: SentimentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatasetConfig {
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
        }
    }
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("data/comics_transcripts.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
    #[serde(default)]
    pub order: SearchOrder,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            excerpt_chars: default_excerpt_chars(),
            order: SearchOrder::default(),
            default_limit: default_limit(),
        }
    }
}

fn default_excerpt_chars() -> usize {
    DEFAULT_EXCERPT_CHARS
}
fn default_limit() -> usize {
    20
}

impl SearchConfig {
    pub fn options(&self, limit: Option<usize>) -> SearchOptions {
        SearchOptions {
            excerpt_chars: self.excerpt_chars,
            order: self.order,
            limit: Some(limit.unwrap_or(self.default_limit)),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SentimentConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Budget for one item, retries and backoff included.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Budget for a single HTTP attempt. Defaults to an even share of
    /// `timeout_secs` across all attempts.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: None,
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            request_timeout_secs: None,
            max_retries: default_max_retries(),
            progress_every: default_progress_every(),
        }
    }
}

fn default_provider() -> String {
    "lexicon".to_string()
}
fn default_model() -> String {
    "distilbert-base-uncased-finetuned-sst-2-english".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}
fn default_progress_every() -> usize {
    100
}

impl SentimentConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }

    pub fn item_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Timeout for one classifier request. Shorter than the item timeout so
    /// a hung attempt still leaves room to retry.
    pub fn request_timeout(&self) -> Duration {
        match self.request_timeout_secs {
            Some(secs) => Duration::from_secs(secs),
            None => {
                let attempts = self.max_retries.saturating_add(1);
                (self.item_timeout() / attempts).max(Duration::from_secs(1))
            }
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_chart")]
    pub chart: String,
    #[serde(default = "default_failures")]
    pub failures: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            table: default_table(),
            chart: default_chart(),
            failures: default_failures(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("analysis/yearly_sentiment")
}
fn default_table() -> String {
    "yearly_sentiment.csv".to_string()
}
fn default_chart() -> String {
    "yearly_sentiment.svg".to_string()
}
fn default_failures() -> String {
    "failures.json".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self {
            dataset: DatasetConfig::default(),
            search: SearchConfig::default(),
            sentiment: SentimentConfig::default(),
            output: OutputConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load `path` if it exists; otherwise fall back to [`Config::minimal`]
/// when the caller is using the default location.
pub fn load_or_default(path: &Path, is_default_path: bool) -> Result<Config> {
    if is_default_path && !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::minimal());
    }
    load_config(path)
}

fn validate(config: &Config) -> Result<()> {
    // Validate search
    if config.search.excerpt_chars == 0 {
        anyhow::bail!("search.excerpt_chars must be > 0");
    }
    if config.search.default_limit < 1 {
        anyhow::bail!("search.default_limit must be >= 1");
    }

    // Validate sentiment
    if config.sentiment.progress_every < 1 {
        anyhow::bail!("sentiment.progress_every must be >= 1");
    }
    if config.sentiment.timeout_secs == 0 {
        anyhow::bail!("sentiment.timeout_secs must be > 0");
    }
    if let Some(secs) = config.sentiment.request_timeout_secs {
        if secs == 0 || secs >= config.sentiment.timeout_secs {
            anyhow::bail!("sentiment.request_timeout_secs must be > 0 and < sentiment.timeout_secs");
        }
    }

    match config.sentiment.provider.as_str() {
        "disabled" | "lexicon" => {}
        "http" => {
            if config.sentiment.endpoint.is_none() {
                anyhow::bail!("sentiment.endpoint must be specified when provider is 'http'");
            }
        }
        other => anyhow::bail!(
            "Unknown sentiment provider: '{}'. Must be disabled, lexicon, or http.",
            other
        ),
    }

    Ok(())
}

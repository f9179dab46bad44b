//! Core data types shared by the archive, search, and analysis pipeline.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Date format used for archive keys (`1989-04-16`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw dataset entry before it becomes an [`Item`].
///
/// The loader hands these to [`crate::archive::Archive::build`]; the key is
/// still an unparsed string at this point.
#[derive(Debug, Clone, Default)]
pub struct RawEntry {
    pub key: String,
    pub title: Option<String>,
    pub transcript: String,
    /// Every other field of the source record, untouched.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One dated strip in the archive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub date: NaiveDate,
    pub title: Option<String>,
    pub transcript: String,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Item {
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// A search hit. Relevance is binary: an item either matches or it doesn't.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub date: NaiveDate,
    pub title: Option<String>,
    /// Text around the first transcript match, or the title for title-only hits.
    pub excerpt: String,
    pub matched: MatchField,
}

/// Which field produced a search hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchField {
    Transcript,
    Title,
}

/// Classifier output label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Positive,
    Negative,
}

impl std::str::FromStr for Label {
    type Err = String;

    /// Accepts `POSITIVE`/`NEGATIVE` in any case, and the `LABEL_1`/`LABEL_0`
    /// names binary sentiment models often report.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "POSITIVE" | "POS" | "LABEL_1" => Ok(Label::Positive),
            "NEGATIVE" | "NEG" | "LABEL_0" => Ok(Label::Negative),
            other => Err(format!("unknown sentiment label: {}", other)),
        }
    }
}

/// Raw classifier verdict: a label and a confidence in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub label: Label,
    pub confidence: f64,
}

impl Classification {
    pub fn positive(confidence: f64) -> Self {
        Self {
            label: Label::Positive,
            confidence,
        }
    }

    pub fn negative(confidence: f64) -> Self {
        Self {
            label: Label::Negative,
            confidence,
        }
    }
}

/// Signed sentiment for one item, in `[-1.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentRecord {
    pub date: NaiveDate,
    pub score: f64,
}

impl SentimentRecord {
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// Per-year aggregate of successfully scored items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlySummary {
    pub year: i32,
    pub mean_sentiment: f64,
    pub comic_count: usize,
}

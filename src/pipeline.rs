//! Sentiment analysis pipeline orchestration.
//!
//! Coordinates the full analysis flow: archive → per-item scoring →
//! yearly aggregation. Each item produces either a [`SentimentRecord`] or
//! an [`ItemFailure`]; failures are collected and never abort the run.
//!
//! The run can be stopped between items through an [`Interrupt`]. Whatever
//! was scored up to that point is still aggregated and returned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use comic_archive_core::aggregate::YearBuckets;
use comic_archive_core::archive::Archive;
use comic_archive_core::error::ScoreError;
use comic_archive_core::models::{Item, SentimentRecord, YearlySummary};
use comic_archive_core::sentiment::SentimentScorer;
use serde::Serialize;

use crate::config::SentimentConfig;
use crate::progress::{AnalyzeProgressEvent, ProgressReporter};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Emit a progress event every this many items.
    pub progress_every: usize,
    /// Per-item classifier timeout.
    pub item_timeout: Option<Duration>,
    /// Process at most this many items (oldest first).
    pub limit: Option<usize>,
}

impl PipelineOptions {
    pub fn from_config(config: &SentimentConfig, limit: Option<usize>) -> Self {
        Self {
            progress_every: config.progress_every,
            item_timeout: Some(config.item_timeout()),
            limit,
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            progress_every: 100,
            item_timeout: None,
            limit: None,
        }
    }
}

/// Shared stop flag, checked between items.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One item that could not be scored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemFailure {
    pub date: NaiveDate,
    /// Stable tag: `empty_text`, `classifier`, `invalid_confidence`, or `timeout`.
    pub reason: &'static str,
    pub message: String,
}

impl ItemFailure {
    fn new(date: NaiveDate, err: &ScoreError) -> Self {
        Self {
            date,
            reason: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub summaries: Vec<YearlySummary>,
    pub failures: Vec<ItemFailure>,
    /// Items scored successfully.
    pub scored: usize,
    /// Items attempted (scored + failed).
    pub processed: usize,
    /// Items the run intended to process.
    pub total: usize,
    pub interrupted: bool,
}

enum ItemOutcome {
    Scored(SentimentRecord),
    Failed(ItemFailure),
}

/// Score every item in `archive` and aggregate the scores by year.
pub async fn run(
    archive: &Archive,
    scorer: &SentimentScorer,
    opts: &PipelineOptions,
    reporter: &dyn ProgressReporter,
    interrupt: &Interrupt,
) -> PipelineOutcome {
    let total = opts.limit.map_or(archive.len(), |l| l.min(archive.len()));
    let every = opts.progress_every.max(1);

    tracing::info!(
        total,
        classifier = scorer.classifier_name(),
        "starting sentiment analysis"
    );

    let mut buckets = YearBuckets::new();
    let mut failures: Vec<ItemFailure> = Vec::new();
    let mut processed = 0usize;
    let mut interrupted = false;

    for item in archive.iter().take(total) {
        if interrupt.is_triggered() {
            tracing::warn!(processed, total, "analysis interrupted");
            interrupted = true;
            break;
        }

        match score_item(item, scorer, opts.item_timeout).await {
            ItemOutcome::Scored(record) => buckets.push(&record),
            ItemOutcome::Failed(failure) => {
                tracing::debug!(date = %failure.date, reason = failure.reason, "item skipped");
                failures.push(failure);
            }
        }
        processed += 1;

        if processed % every == 0 {
            reporter.report(AnalyzeProgressEvent::Scoring {
                n: processed as u64,
                total: total as u64,
                failed: failures.len() as u64,
            });
        }
    }

    if processed % every != 0 {
        reporter.report(AnalyzeProgressEvent::Scoring {
            n: processed as u64,
            total: total as u64,
            failed: failures.len() as u64,
        });
    }

    let scored = buckets.count();
    reporter.report(AnalyzeProgressEvent::Aggregating {
        scored: scored as u64,
    });
    let summaries = buckets.finish();

    tracing::info!(
        scored,
        failed = failures.len(),
        years = summaries.len(),
        "sentiment analysis finished"
    );

    PipelineOutcome {
        summaries,
        failures,
        scored,
        processed,
        total,
        interrupted,
    }
}

async fn score_item(
    item: &Item,
    scorer: &SentimentScorer,
    timeout: Option<Duration>,
) -> ItemOutcome {
    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, scorer.score(&item.transcript))
            .await
            .unwrap_or(Err(ScoreError::Timeout(limit))),
        None => scorer.score(&item.transcript).await,
    };

    match result {
        Ok(score) => ItemOutcome::Scored(SentimentRecord {
            date: item.date,
            score,
        }),
        Err(err) => ItemOutcome::Failed(ItemFailure::new(item.date, &err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use comic_archive_core::models::{Classification, RawEntry};
    use comic_archive_core::sentiment::Classifier;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Classifier keyed by exact transcript text.
    struct Scripted {
        verdicts: HashMap<String, Result<Classification, ScoreError>>,
    }

    #[async_trait]
    impl Classifier for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn classify(&self, text: &str) -> Result<Classification, ScoreError> {
            if text == "slow" {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            self.verdicts
                .get(text)
                .cloned()
                .unwrap_or(Err(ScoreError::Classifier(format!("unscripted: {}", text))))
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<AnalyzeProgressEvent>>);

    impl ProgressReporter for Recorder {
        fn report(&self, event: AnalyzeProgressEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    fn entry(key: &str, transcript: &str) -> RawEntry {
        RawEntry {
            key: key.to_string(),
            transcript: transcript.to_string(),
            ..RawEntry::default()
        }
    }

    fn scorer(pairs: &[(&str, Result<Classification, ScoreError>)]) -> SentimentScorer {
        let verdicts = pairs
            .iter()
            .map(|(t, v)| (t.to_string(), v.clone()))
            .collect();
        SentimentScorer::new(Arc::new(Scripted { verdicts }))
    }

    #[tokio::test]
    async fn end_to_end_yearly_means() {
        let archive = Archive::build(vec![
            entry("1989-04-16", "a"),
            entry("1989-04-17", "b"),
            entry("1990-01-01", "c"),
        ])
        .unwrap();
        let scorer = scorer(&[
            ("a", Ok(Classification::positive(0.9))),
            ("b", Ok(Classification::negative(0.4))),
            ("c", Ok(Classification::positive(0.2))),
        ]);

        let out = run(
            &archive,
            &scorer,
            &PipelineOptions::default(),
            &Recorder::default(),
            &Interrupt::new(),
        )
        .await;

        assert_eq!(out.summaries.len(), 2);
        assert_eq!(out.summaries[0].year, 1989);
        assert_eq!(out.summaries[0].comic_count, 2);
        assert!((out.summaries[0].mean_sentiment - 0.25).abs() < 1e-9);
        assert_eq!(out.summaries[1].year, 1990);
        assert_eq!(out.summaries[1].comic_count, 1);
        assert!((out.summaries[1].mean_sentiment - 0.2).abs() < 1e-9);
        assert!(out.failures.is_empty());
        assert_eq!(out.scored, 3);
        assert!(!out.interrupted);
    }

    #[tokio::test]
    async fn failures_are_isolated_and_reported() {
        let archive = Archive::build(vec![
            entry("1989-04-16", "a"),
            entry("1989-04-17", "   "),
            entry("1989-04-18", "broken"),
            entry("1990-01-01", "c"),
        ])
        .unwrap();
        let scorer = scorer(&[
            ("a", Ok(Classification::positive(0.5))),
            ("c", Ok(Classification::negative(0.5))),
            ("broken", Ok(Classification::positive(2.0))),
        ]);

        let out = run(
            &archive,
            &scorer,
            &PipelineOptions::default(),
            &Recorder::default(),
            &Interrupt::new(),
        )
        .await;

        assert_eq!(out.summaries[0].comic_count, 1);
        assert_eq!(out.processed, 4);
        let reasons: Vec<(String, &str)> = out
            .failures
            .iter()
            .map(|f| (f.date.to_string(), f.reason))
            .collect();
        assert_eq!(
            reasons,
            vec![
                ("1989-04-17".to_string(), "empty_text"),
                ("1989-04-18".to_string(), "invalid_confidence"),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_items_time_out() {
        let archive = Archive::build(vec![entry("2000-01-01", "slow"), entry("2000-01-02", "a")])
            .unwrap();
        let scorer = scorer(&[("a", Ok(Classification::positive(1.0)))]);
        let opts = PipelineOptions {
            item_timeout: Some(Duration::from_secs(1)),
            ..PipelineOptions::default()
        };

        let out = run(&archive, &scorer, &opts, &Recorder::default(), &Interrupt::new()).await;
        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].reason, "timeout");
        assert_eq!(out.scored, 1);
    }

    /// Positive classifier that raises the interrupt while scoring.
    struct InterruptingClassifier {
        interrupt: Interrupt,
    }

    #[async_trait]
    impl Classifier for InterruptingClassifier {
        fn name(&self) -> &str {
            "interrupting"
        }

        async fn classify(&self, _text: &str) -> Result<Classification, ScoreError> {
            self.interrupt.trigger();
            Ok(Classification::positive(0.5))
        }
    }

    #[tokio::test]
    async fn interrupt_mid_run_keeps_scored_items() {
        let archive = Archive::build(vec![
            entry("1999-12-31", "a"),
            entry("2000-01-01", "b"),
            entry("2000-01-02", "c"),
        ])
        .unwrap();
        let interrupt = Interrupt::new();
        let scorer = SentimentScorer::new(Arc::new(InterruptingClassifier {
            interrupt: interrupt.clone(),
        }));
        let recorder = Recorder::default();

        let out = run(
            &archive,
            &scorer,
            &PipelineOptions::default(),
            &recorder,
            &interrupt,
        )
        .await;

        assert!(out.interrupted);
        assert_eq!(out.processed, 1);
        assert_eq!(out.scored, 1);
        assert_eq!(out.total, 3);
        assert!(out.failures.is_empty());
        assert_eq!(out.summaries.len(), 1);
        assert_eq!(out.summaries[0].year, 1999);
        assert_eq!(out.summaries[0].comic_count, 1);
        assert!((out.summaries[0].mean_sentiment - 0.5).abs() < 1e-9);
        assert_eq!(
            recorder.0.lock().unwrap().last(),
            Some(&AnalyzeProgressEvent::Aggregating { scored: 1 })
        );
    }

    #[tokio::test]
    async fn interrupt_before_start_scores_nothing() {
        let archive = Archive::build(vec![entry("2000-01-01", "a"), entry("2000-01-02", "a")])
            .unwrap();
        let scorer = scorer(&[("a", Ok(Classification::positive(1.0)))]);
        let interrupt = Interrupt::new();
        interrupt.trigger();

        let out = run(
            &archive,
            &scorer,
            &PipelineOptions::default(),
            &Recorder::default(),
            &interrupt,
        )
        .await;
        assert!(out.interrupted);
        assert_eq!(out.processed, 0);
        assert!(out.summaries.is_empty());
    }

    #[tokio::test]
    async fn progress_cadence_and_limit() {
        let entries: Vec<RawEntry> = (1..=7)
            .map(|d| entry(&format!("2000-01-{:02}", d), "a"))
            .collect();
        let archive = Archive::build(entries).unwrap();
        let scorer = scorer(&[("a", Ok(Classification::positive(0.5)))]);
        let recorder = Recorder::default();
        let opts = PipelineOptions {
            progress_every: 2,
            limit: Some(5),
            ..PipelineOptions::default()
        };

        let out = run(&archive, &scorer, &opts, &recorder, &Interrupt::new()).await;
        assert_eq!(out.total, 5);
        assert_eq!(out.processed, 5);

        let events = recorder.0.lock().unwrap().clone();
        let ticks: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                AnalyzeProgressEvent::Scoring { n, .. } => Some(*n),
                _ => None,
            })
            .collect();
        assert_eq!(ticks, vec![2, 4, 5]);
        assert_eq!(
            events.last(),
            Some(&AnalyzeProgressEvent::Aggregating { scored: 5 })
        );
    }

    #[tokio::test]
    async fn rerun_is_idempotent() {
        let archive = Archive::build(vec![
            entry("1999-12-31", "a"),
            entry("2000-01-01", "b"),
            entry("2000-06-01", ""),
        ])
        .unwrap();
        let scorer = scorer(&[
            ("a", Ok(Classification::negative(0.3))),
            ("b", Ok(Classification::positive(0.6))),
        ]);
        let opts = PipelineOptions::default();
        let first = run(&archive, &scorer, &opts, &Recorder::default(), &Interrupt::new()).await;
        let second = run(&archive, &scorer, &opts, &Recorder::default(), &Interrupt::new()).await;
        assert_eq!(first.summaries, second.summaries);
        assert_eq!(first.failures, second.failures);
    }
}

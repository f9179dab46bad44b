use anyhow::{bail, Result};
use comic_archive_core::aggregate::overall_mean;
use comic_archive_core::archive::Archive;
use comic_archive_core::models::YearlySummary;
use comic_archive_core::sentiment::SentimentScorer;
use std::path::PathBuf;

use crate::chart::SvgLineChart;
use crate::classifier;
use crate::config::Config;
use crate::export;
use crate::pipeline::{self, Interrupt, PipelineOptions, PipelineOutcome};
use crate::progress::ProgressMode;

/// Rows shown from each end of the table in the run summary.
const SUMMARY_ROWS: usize = 10;

/// Score the whole archive, aggregate by year, and write the outputs.
///
/// Ctrl-C stops the run between items; the partial table is still written.
pub async fn run_analyze(
    archive: &Archive,
    config: &Config,
    output_dir: Option<PathBuf>,
    limit: Option<usize>,
    progress: ProgressMode,
) -> Result<PipelineOutcome> {
    if !config.sentiment.is_enabled() {
        bail!("Sentiment provider is disabled. Set [sentiment] provider in config.");
    }

    let scorer = SentimentScorer::new(classifier::create_classifier(&config.sentiment)?);
    let opts = PipelineOptions::from_config(&config.sentiment, limit);
    let reporter = progress.reporter();

    let interrupt = Interrupt::new();
    let on_signal = interrupt.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, finishing current item");
            on_signal.trigger();
        }
    });

    let outcome = pipeline::run(archive, &scorer, &opts, reporter.as_ref(), &interrupt).await;
    signal_task.abort();

    let dir = output_dir.unwrap_or_else(|| config.output.dir.clone());
    let written = export::write_outputs(
        &config.output,
        &dir,
        &outcome.summaries,
        &outcome.failures,
        &SvgLineChart::default(),
    )?;

    println!("analyze");
    println!("  classifier: {}", scorer.classifier_name());
    println!("  processed: {} / {}", outcome.processed, outcome.total);
    println!("  scored: {}", outcome.scored);
    println!("  failed: {}", outcome.failures.len());
    println!("  years: {}", outcome.summaries.len());
    if let Some(mean) = overall_mean(&outcome.summaries) {
        println!("  overall mean: {:.4}", mean);
    }
    if let Some(best) = extreme(&outcome.summaries, true) {
        println!("  most positive year: {} ({:.4})", best.year, best.mean_sentiment);
    }
    if let Some(worst) = extreme(&outcome.summaries, false) {
        println!("  most negative year: {} ({:.4})", worst.year, worst.mean_sentiment);
    }
    println!("  table: {}", written.table.display());
    println!("  chart: {}", written.chart.display());
    println!("  failures: {}", written.failures.display());

    print_rows(&outcome.summaries);

    if outcome.interrupted {
        println!("interrupted");
    } else {
        println!("ok");
    }

    Ok(outcome)
}

fn extreme(summaries: &[YearlySummary], highest: bool) -> Option<&YearlySummary> {
    let cmp = |a: &&YearlySummary, b: &&YearlySummary| a.mean_sentiment.total_cmp(&b.mean_sentiment);
    if highest {
        summaries.iter().max_by(cmp)
    } else {
        summaries.iter().min_by(cmp)
    }
}

fn print_rows(summaries: &[YearlySummary]) {
    if summaries.is_empty() {
        return;
    }
    println!();
    println!("  {:<6} {:>14} {:>12}", "YEAR", "MEAN", "COMICS");
    println!("  {}", "-".repeat(34));

    let row = |s: &YearlySummary| {
        println!(
            "  {:<6} {:>14.4} {:>12}",
            s.year, s.mean_sentiment, s.comic_count
        );
    };

    if summaries.len() <= SUMMARY_ROWS * 2 {
        summaries.iter().for_each(row);
    } else {
        summaries[..SUMMARY_ROWS].iter().for_each(row);
        println!("  ...");
        summaries[summaries.len() - SUMMARY_ROWS..]
            .iter()
            .for_each(row);
    }
    println!();
}

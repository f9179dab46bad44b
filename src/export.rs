//! Write analysis results to disk.
//!
//! Produces the yearly table as CSV (`year,mean_sentiment,comic_count`,
//! mean at 4 decimals), the per-item failure report as JSON, and the trend
//! chart through a [`ChartRenderer`](crate::chart::ChartRenderer).

use anyhow::{Context, Result};
use comic_archive_core::models::YearlySummary;
use polars::prelude::*;
use std::path::{Path, PathBuf};

use crate::chart::ChartRenderer;
use crate::config::OutputConfig;
use crate::pipeline::ItemFailure;

/// Paths of the files written by [`write_outputs`].
#[derive(Debug, Clone)]
pub struct WrittenOutputs {
    pub table: PathBuf,
    pub chart: PathBuf,
    pub failures: PathBuf,
}

/// Build the yearly table as a `DataFrame`, one row per year.
pub fn table_frame(summaries: &[YearlySummary]) -> Result<DataFrame> {
    let years: Vec<i32> = summaries.iter().map(|s| s.year).collect();
    let means: Vec<f64> = summaries.iter().map(|s| s.mean_sentiment).collect();
    let counts: Vec<u64> = summaries.iter().map(|s| s.comic_count as u64).collect();
    let df = df!(
        "year" => years,
        "mean_sentiment" => means,
        "comic_count" => counts
    )?;
    Ok(df)
}

/// Render the yearly table as CSV text.
pub fn table_csv(summaries: &[YearlySummary]) -> Result<String> {
    let mut df = table_frame(summaries)?;
    let mut buf: Vec<u8> = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .with_float_precision(Some(4))
        .finish(&mut df)
        .context("Failed to encode yearly table as CSV")?;
    Ok(String::from_utf8(buf)?)
}

/// Write the table, chart, and failure report into `dir` (created if missing).
pub fn write_outputs(
    output: &OutputConfig,
    dir: &Path,
    summaries: &[YearlySummary],
    failures: &[ItemFailure],
    renderer: &dyn ChartRenderer,
) -> Result<WrittenOutputs> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let table = dir.join(&output.table);
    write_file(&table, &table_csv(summaries)?)?;

    let chart = dir.join(&output.chart);
    write_file(&chart, &renderer.render(summaries)?)?;

    let failures_path = dir.join(&output.failures);
    write_file(&failures_path, &serde_json::to_string_pretty(failures)?)?;

    tracing::info!(
        table = %table.display(),
        chart = %chart.display(),
        failures = failures.len(),
        "wrote analysis outputs"
    );

    Ok(WrittenOutputs {
        table,
        chart,
        failures: failures_path,
    })
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

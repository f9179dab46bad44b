//! Archive statistics and health overview.
//!
//! Provides a quick summary of what was loaded: item counts, the date span,
//! per-year breakdown, missing transcripts, and the widest calendar gap.
//! Used by `comics stats` and `GET /stats`.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveDate;
use comic_archive_core::archive::Archive;
use serde::Serialize;

use crate::config::Config;

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveStats {
    pub items: usize,
    pub first: NaiveDate,
    pub last: NaiveDate,
    pub years: usize,
    pub per_year: BTreeMap<i32, usize>,
    pub empty_transcripts: usize,
    pub untitled: usize,
    pub largest_gap: Option<DateGap>,
}

/// Widest stretch between two consecutive archive dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateGap {
    pub after: NaiveDate,
    pub before: NaiveDate,
    pub days: i64,
}

pub fn compute_stats(archive: &Archive) -> Result<ArchiveStats> {
    let (first, last) = archive.span()?;

    let mut per_year: BTreeMap<i32, usize> = BTreeMap::new();
    for item in archive {
        *per_year.entry(item.year()).or_default() += 1;
    }

    let largest_gap = archive
        .items()
        .windows(2)
        .map(|pair| DateGap {
            after: pair[0].date,
            before: pair[1].date,
            days: (pair[1].date - pair[0].date).num_days(),
        })
        .fold(None::<DateGap>, |best, gap| match best {
            Some(b) if b.days >= gap.days => Some(b),
            _ => Some(gap),
        });

    Ok(ArchiveStats {
        items: archive.len(),
        first,
        last,
        years: per_year.len(),
        per_year,
        empty_transcripts: archive
            .iter()
            .filter(|i| i.transcript.trim().is_empty())
            .count(),
        untitled: archive.iter().filter(|i| i.title.is_none()).count(),
        largest_gap,
    })
}

/// Run the stats command: compute and print a summary.
pub fn run_stats(archive: &Archive, config: &Config, json: bool) -> Result<()> {
    let stats = compute_stats(archive)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Comic Archive Stats");
    println!("===================");
    println!();
    println!("  Dataset:            {}", config.dataset.path.display());
    println!("  Comics:             {}", stats.items);
    println!("  Span:               {} to {}", stats.first, stats.last);
    println!("  Years:              {}", stats.years);
    println!("  Empty transcripts:  {}", stats.empty_transcripts);
    println!("  Untitled:           {}", stats.untitled);
    if let Some(ref gap) = stats.largest_gap {
        println!(
            "  Largest gap:        {} days ({} to {})",
            gap.days, gap.after, gap.before
        );
    }

    println!();
    println!("  {:<8} {:>8}", "YEAR", "COMICS");
    println!("  {}", "-".repeat(17));
    for (year, count) in &stats.per_year {
        println!("  {:<8} {:>8}", year, count);
    }
    println!();

    Ok(())
}

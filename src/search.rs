use anyhow::Result;
use comic_archive_core::archive::Archive;
use comic_archive_core::search::{search, SearchOrder};

use crate::config::Config;

/// CLI entry point for `comics search`.
pub fn run_search(
    archive: &Archive,
    config: &Config,
    query: &str,
    limit: Option<usize>,
    oldest_first: bool,
    json: bool,
) -> Result<()> {
    let mut opts = config.search.options(limit);
    if oldest_first {
        opts.order = SearchOrder::OldestFirst;
    }

    let results = search(archive, query, &opts);
    tracing::debug!(query, hits = results.len(), "search finished");

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        let title_display = result.title.as_deref().unwrap_or("(untitled)");
        println!("{}. {} / {}", i + 1, result.date, title_display);
        println!("    excerpt: \"{}\"", result.excerpt);
        println!();
    }

    Ok(())
}

//! Case-insensitive substring search over titles and transcripts.
//!
//! The search is a linear scan over the [`Archive`]: every item is checked
//! against the query, and each hit carries a bounded excerpt around the
//! first transcript match. There is no ranking; an item matches or it
//! doesn't, and results are ordered by date.
//!
//! # Matching
//!
//! 1. The query is trimmed; an empty query returns no results.
//! 2. Query and text are compared char by char after Unicode lowercasing,
//!    so the cost per item is at most `O(n · m)` for text length `n` and
//!    query length `m`.
//! 3. The transcript is checked first. Title-only hits use the title as
//!    their excerpt.

use serde::{Deserialize, Serialize};

use crate::archive::Archive;
use crate::models::{Item, MatchField, SearchResult};

/// Default excerpt width, in characters.
pub const DEFAULT_EXCERPT_CHARS: usize = 160;

const ELLIPSIS: char = '…';

/// Result ordering. Both are deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Search tuning parameters, decoupled from application config.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Width of the excerpt window in characters.
    pub excerpt_chars: usize,
    pub order: SearchOrder,
    /// Maximum results to return; `None` returns every hit.
    pub limit: Option<usize>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
            order: SearchOrder::NewestFirst,
            limit: None,
        }
    }
}

/// Search the archive for `query` in titles and transcripts.
pub fn search(archive: &Archive, query: &str, opts: &SearchOptions) -> Vec<SearchResult> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    let needle: Vec<char> = query.chars().flat_map(char::to_lowercase).collect();
    let limit = opts.limit.unwrap_or(usize::MAX);

    let hits = archive
        .iter()
        .filter_map(|item| match_item(item, &needle, opts.excerpt_chars));

    match opts.order {
        SearchOrder::NewestFirst => hits.rev().take(limit).collect(),
        SearchOrder::OldestFirst => hits.take(limit).collect(),
    }
}

fn match_item(item: &Item, needle: &[char], excerpt_chars: usize) -> Option<SearchResult> {
    if let Some(span) = find_ignore_case(&item.transcript, needle) {
        return Some(SearchResult {
            date: item.date,
            title: item.title.clone(),
            excerpt: excerpt(&item.transcript, span, excerpt_chars),
            matched: MatchField::Transcript,
        });
    }

    let title = item.title.as_deref()?;
    find_ignore_case(title, needle).map(|_| SearchResult {
        date: item.date,
        title: item.title.clone(),
        excerpt: title.to_string(),
        matched: MatchField::Title,
    })
}

/// Byte span of the first case-insensitive occurrence of `needle`
/// (already lowercased) in `haystack`.
pub fn find_ignore_case(haystack: &str, needle: &[char]) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }
    haystack
        .char_indices()
        .find_map(|(start, _)| match_at(&haystack[start..], needle).map(|len| (start, start + len)))
}

/// Length in bytes of the prefix of `rest` matching `needle`, if any.
fn match_at(rest: &str, needle: &[char]) -> Option<usize> {
    let mut expected = needle.iter();
    let mut want = expected.next()?;
    for (offset, c) in rest.char_indices() {
        for lower in c.to_lowercase() {
            if lower != *want {
                return None;
            }
            match expected.next() {
                Some(next) => want = next,
                None => return Some(offset + c.len_utf8()),
            }
        }
    }
    None
}

/// Cut a window of about `width` chars around a match at byte span `span`,
/// snapped to word boundaries and with whitespace collapsed.
fn excerpt(text: &str, span: (usize, usize), width: usize) -> String {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let len = chars.len();
    let match_start = chars.partition_point(|(b, _)| *b < span.0);
    let match_end = chars.partition_point(|(b, _)| *b < span.1);

    let width = width.max(1);
    let lead = width / 3;
    let mut start = match_start.saturating_sub(lead);
    let mut end = (start + width).min(len);

    // Don't start or end mid-word when a boundary is available outside the match.
    if start > 0 {
        if let Some(ws) = chars[start..match_start].iter().position(|(_, c)| c.is_whitespace()) {
            start += ws + 1;
        }
    }
    if end < len && match_end < end {
        if let Some(ws) = chars[match_end..end].iter().rposition(|(_, c)| c.is_whitespace()) {
            end = match_end + ws;
        }
    }

    let byte_start = chars[start].0;
    let byte_end = if end < len { chars[end].0 } else { text.len() };
    let body = text[byte_start..byte_end]
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let mut out = String::with_capacity(body.len() + 8);
    if start > 0 {
        out.push(ELLIPSIS);
    }
    out.push_str(&body);
    if end < len {
        out.push(ELLIPSIS);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawEntry;

    fn entry(key: &str, title: Option<&str>, transcript: &str) -> RawEntry {
        RawEntry {
            key: key.to_string(),
            title: title.map(str::to_string),
            transcript: transcript.to_string(),
            extra: serde_json::Map::new(),
        }
    }

    fn sample() -> Archive {
        Archive::build(vec![
            entry("1989-04-16", Some("Pilot"), "Dilbert meets Dogbert at the office."),
            entry("1990-05-01", Some("Budget Meeting"), "The boss cuts the budget again."),
            entry("1995-07-10", None, "Catbert explains the new HR policy to Dilbert."),
            entry("2001-02-02", Some("Elbonia"), ""),
        ])
        .unwrap()
    }

    fn lower(q: &str) -> Vec<char> {
        q.chars().flat_map(char::to_lowercase).collect()
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let archive = sample();
        assert!(search(&archive, "", &SearchOptions::default()).is_empty());
        assert!(search(&archive, "   ", &SearchOptions::default()).is_empty());
    }

    #[test]
    fn test_case_insensitive_match() {
        let archive = sample();
        let results = search(&archive, "DILBERT", &SearchOptions::default());
        let dates: Vec<String> = results.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["1995-07-10", "1989-04-16"]);
        assert!(results.iter().all(|r| r.matched == MatchField::Transcript));
    }

    #[test]
    fn test_oldest_first_and_limit() {
        let archive = sample();
        let opts = SearchOptions {
            order: SearchOrder::OldestFirst,
            limit: Some(1),
            ..SearchOptions::default()
        };
        let results = search(&archive, "dilbert", &opts);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].date.to_string(), "1989-04-16");
    }

    #[test]
    fn test_title_only_match_uses_title() {
        let archive = sample();
        let results = search(&archive, "elbonia", &SearchOptions::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].matched, MatchField::Title);
        assert_eq!(results[0].excerpt, "Elbonia");
    }

    #[test]
    fn test_results_only_contain_matches() {
        let archive = sample();
        for q in ["budget", "bert", "zzz", "the"] {
            for r in search(&archive, q, &SearchOptions::default()) {
                let item = archive.get(r.date).unwrap();
                let hay = format!(
                    "{} {}",
                    item.title.clone().unwrap_or_default(),
                    item.transcript
                )
                .to_lowercase();
                assert!(hay.contains(q), "{} should contain {}", r.date, q);
            }
        }
        assert!(search(&archive, "zzz", &SearchOptions::default()).is_empty());
    }

    #[test]
    fn test_find_ignore_case_unicode() {
        assert_eq!(find_ignore_case("Straße ÜBER", &lower("über")), Some((8, 13)));
        assert_eq!(find_ignore_case("abc", &lower("abcd")), None);
        assert_eq!(find_ignore_case("abc", &[]), None);
    }

    #[test]
    fn test_excerpt_is_bounded_and_contains_match() {
        let long = format!("{} needle {}", "word ".repeat(200), "tail ".repeat(200));
        let span = find_ignore_case(&long, &lower("needle")).unwrap();
        let ex = excerpt(&long, span, 60);
        assert!(ex.contains("needle"));
        assert!(ex.starts_with('…'));
        assert!(ex.ends_with('…'));
        assert!(ex.chars().count() <= 62);
    }

    #[test]
    fn test_excerpt_short_text_is_whole_text() {
        let text = "The boss\ncuts  the budget.";
        let span = find_ignore_case(text, &lower("budget")).unwrap();
        assert_eq!(excerpt(text, span, 160), "The boss cuts the budget.");
    }
}

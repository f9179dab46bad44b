//! Archive navigation commands.
//!
//! Backs `comics first|last|get|prev|next|random` and the matching HTTP
//! routes. Neighbor lookups past either end of the archive produce a
//! boundary response, not an error.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use comic_archive_core::archive::{parse_date, Archive};
use comic_archive_core::models::Item;
use serde::Serialize;

/// Direction for neighbor lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Result of a navigation query: an item, or the boundary signal.
#[derive(Debug, Clone, Serialize)]
pub struct NavigationResponse<'a> {
    pub item: Option<&'a Item>,
    pub boundary: bool,
}

impl<'a> NavigationResponse<'a> {
    pub fn from_neighbor(item: Option<&'a Item>) -> Self {
        Self {
            boundary: item.is_none(),
            item,
        }
    }

    pub fn found(item: &'a Item) -> Self {
        Self {
            item: Some(item),
            boundary: false,
        }
    }
}

/// Result of an exact-date lookup: the item, or `found: false`.
#[derive(Debug, Clone, Serialize)]
pub struct LookupResponse<'a> {
    pub item: Option<&'a Item>,
    pub found: bool,
}

impl<'a> LookupResponse<'a> {
    pub fn new(item: Option<&'a Item>) -> Self {
        Self {
            found: item.is_some(),
            item,
        }
    }
}

pub fn lookup(archive: &Archive, date: NaiveDate) -> LookupResponse<'_> {
    LookupResponse::new(archive.get(date))
}

pub fn neighbor(archive: &Archive, date: NaiveDate, direction: Direction) -> Option<&Item> {
    match direction {
        Direction::Previous => archive.previous(date),
        Direction::Next => archive.next(date),
    }
}

/// Parse a `YYYY-MM-DD` argument.
pub fn parse_date_arg(s: &str) -> Result<NaiveDate> {
    parse_date(s.trim()).with_context(|| format!("invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn run_first(archive: &Archive, json: bool) -> Result<()> {
    print_item(archive.first()?, json)
}

pub fn run_last(archive: &Archive, json: bool) -> Result<()> {
    print_item(archive.last()?, json)
}

pub fn run_random(archive: &Archive, json: bool) -> Result<()> {
    print_item(archive.random()?, json)
}

/// Print the item stored under `date`.
///
/// With `json` the output is always `{"item": ..., "found": bool}`; in text
/// mode a missing date is reported as an error.
pub fn run_get(archive: &Archive, date: &str, json: bool) -> Result<()> {
    let date = parse_date_arg(date)?;
    let resp = lookup(archive, date);

    if json {
        println!("{}", serde_json::to_string_pretty(&resp)?);
        return Ok(());
    }

    match resp.item {
        Some(item) => print_item(item, false),
        None => bail!("no comic for {}", date),
    }
}

pub fn run_neighbor(archive: &Archive, date: &str, direction: Direction, json: bool) -> Result<()> {
    let date = parse_date_arg(date)?;
    let found = neighbor(archive, date, direction);

    if json {
        let resp = NavigationResponse::from_neighbor(found);
        println!("{}", serde_json::to_string_pretty(&resp)?);
        return Ok(());
    }

    match found {
        Some(item) => print_item(item, false),
        None => {
            let edge = match direction {
                Direction::Previous => "earlier",
                Direction::Next => "later",
            };
            println!("No {} comic than {} in the archive.", edge, date);
            Ok(())
        }
    }
}

fn print_item(item: &Item, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
        return Ok(());
    }

    println!("--- Comic ---");
    println!("date:   {}", item.date);
    println!("title:  {}", item.title.as_deref().unwrap_or("(untitled)"));
    for (key, value) in &item.extra {
        match value.as_str() {
            Some(s) => println!("{:<7} {}", format!("{}:", key), s),
            None => println!("{:<7} {}", format!("{}:", key), value),
        }
    }
    println!();
    println!("--- Transcript ---");
    if item.transcript.trim().is_empty() {
        println!("(no transcript)");
    } else {
        println!("{}", item.transcript.trim());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use comic_archive_core::models::RawEntry;

    fn archive() -> Archive {
        Archive::build(vec![
            RawEntry {
                key: "1989-04-16".to_string(),
                transcript: "a".to_string(),
                ..RawEntry::default()
            },
            RawEntry {
                key: "1989-04-23".to_string(),
                transcript: "b".to_string(),
                ..RawEntry::default()
            },
        ])
        .unwrap()
    }

    #[test]
    fn neighbor_follows_direction() {
        let a = archive();
        let d = parse_date_arg("1989-04-20").unwrap();
        assert_eq!(neighbor(&a, d, Direction::Previous).unwrap().transcript, "a");
        assert_eq!(neighbor(&a, d, Direction::Next).unwrap().transcript, "b");
    }

    #[test]
    fn boundary_response_serializes() {
        let a = archive();
        let last = a.last().unwrap().date;
        let resp = NavigationResponse::from_neighbor(neighbor(&a, last, Direction::Next));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["boundary"], true);
        assert!(json["item"].is_null());
    }

    #[test]
    fn parse_date_arg_rejects_garbage() {
        assert!(parse_date_arg("yesterday").is_err());
        assert!(parse_date_arg(" 1989-04-16 ").is_ok());
    }

    #[test]
    fn get_missing_date_is_error_in_text_mode() {
        assert!(run_get(&archive(), "1990-01-01", false).is_err());
        assert!(run_get(&archive(), "1989-04-16", false).is_ok());
    }

    #[test]
    fn get_missing_date_is_tagged_in_json_mode() {
        assert!(run_get(&archive(), "1990-01-01", true).is_ok());

        let a = archive();
        let missing = lookup(&a, parse_date_arg("1990-01-01").unwrap());
        let json = serde_json::to_value(&missing).unwrap();
        assert_eq!(json["found"], false);
        assert!(json["item"].is_null());

        let hit = lookup(&a, parse_date_arg("1989-04-16").unwrap());
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["found"], true);
        assert_eq!(json["item"]["transcript"], "a");
    }
}

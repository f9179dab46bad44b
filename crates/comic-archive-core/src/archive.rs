//! Date-indexed archive with sparse-calendar navigation.
//!
//! Items are kept in a `Vec` sorted by date, with a companion
//! `HashMap<NaiveDate, usize>` for exact lookups. Neighbor queries never do
//! date arithmetic: they binary-search the sorted sequence, so gaps in the
//! calendar are skipped naturally and a date that is not in the archive
//! still resolves to its neighbors as a virtual insertion point.
//!
//! # Boundary policy
//!
//! [`Archive::previous`] and [`Archive::next`] do not wrap. Past either end
//! they return `None`; cyclic browsing is the caller's choice, via
//! [`Archive::first`] and [`Archive::last`].

use std::collections::HashMap;

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::ArchiveError;
use crate::models::{Item, RawEntry, DATE_FORMAT};

/// Immutable, date-sorted collection of [`Item`]s.
#[derive(Debug, Clone, Default)]
pub struct Archive {
    items: Vec<Item>,
    index: HashMap<NaiveDate, usize>,
}

impl Archive {
    /// Build an archive from raw dataset entries.
    ///
    /// Fails if the source is empty, if any key is not a `YYYY-MM-DD`
    /// calendar date, or if two keys name the same date. Nothing is
    /// returned on failure.
    pub fn build<I>(entries: I) -> Result<Self, ArchiveError>
    where
        I: IntoIterator<Item = RawEntry>,
    {
        let mut items: Vec<Item> = Vec::new();
        for entry in entries {
            let date = parse_date(&entry.key)?;
            items.push(Item {
                date,
                title: entry.title,
                transcript: entry.transcript,
                extra: entry.extra,
            });
        }

        if items.is_empty() {
            return Err(ArchiveError::EmptySource);
        }

        items.sort_by_key(|item| item.date);

        let mut index = HashMap::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            if index.insert(item.date, pos).is_some() {
                return Err(ArchiveError::malformed(
                    item.date.format(DATE_FORMAT).to_string(),
                    "duplicate date",
                ));
            }
        }

        Ok(Self { items, index })
    }

    /// An archive with no items. Temporal queries on it fail with
    /// [`ArchiveError::EmptyArchive`].
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in ascending date order.
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn first(&self) -> Result<&Item, ArchiveError> {
        self.items.first().ok_or(ArchiveError::EmptyArchive)
    }

    pub fn last(&self) -> Result<&Item, ArchiveError> {
        self.items.last().ok_or(ArchiveError::EmptyArchive)
    }

    /// Exact-match lookup.
    pub fn get(&self, date: NaiveDate) -> Option<&Item> {
        self.index.get(&date).map(|&pos| &self.items[pos])
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.index.contains_key(&date)
    }

    /// Nearest item strictly before `date`, or `None` at the start boundary.
    pub fn previous(&self, date: NaiveDate) -> Option<&Item> {
        let pos = self.items.partition_point(|item| item.date < date);
        pos.checked_sub(1).map(|p| &self.items[p])
    }

    /// Nearest item strictly after `date`, or `None` at the end boundary.
    pub fn next(&self, date: NaiveDate) -> Option<&Item> {
        let pos = self.items.partition_point(|item| item.date <= date);
        self.items.get(pos)
    }

    /// True when no item exists before `date`.
    pub fn is_at_start(&self, date: NaiveDate) -> bool {
        self.previous(date).is_none()
    }

    /// True when no item exists after `date`.
    pub fn is_at_end(&self, date: NaiveDate) -> bool {
        self.next(date).is_none()
    }

    /// First and last dates in the archive.
    pub fn span(&self) -> Result<(NaiveDate, NaiveDate), ArchiveError> {
        Ok((self.first()?.date, self.last()?.date))
    }

    /// An item chosen uniformly over items (not over calendar days).
    pub fn random(&self) -> Result<&Item, ArchiveError> {
        self.random_with(&mut rand::thread_rng())
    }

    /// Like [`Archive::random`], with a caller-supplied RNG.
    pub fn random_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&Item, ArchiveError> {
        self.items.choose(rng).ok_or(ArchiveError::EmptyArchive)
    }
}

impl<'a> IntoIterator for &'a Archive {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Parse an archive key (`YYYY-MM-DD`).
pub fn parse_date(key: &str) -> Result<NaiveDate, ArchiveError> {
    NaiveDate::parse_from_str(key, DATE_FORMAT)
        .map_err(|e| ArchiveError::malformed(key, format!("not a calendar date ({})", e)))
}

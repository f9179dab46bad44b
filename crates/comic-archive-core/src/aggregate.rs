//! Yearly aggregation of per-item sentiment scores.
//!
//! Records are grouped by calendar year; each group yields the arithmetic
//! mean of its scores and the number of scores. Only years present in the
//! input appear in the output (no zero-count filler rows), in ascending
//! order.
//!
//! The result depends only on the multiset of `(year, score)` pairs. Each
//! year's scores are sorted before summation, and the sum uses Neumaier
//! compensation, so reordering the input cannot change a single bit of the
//! output.

use std::collections::BTreeMap;

use crate::models::{SentimentRecord, YearlySummary};

/// Scores bucketed by year.
///
/// Buckets filled independently (e.g. by separate workers) combine with
/// [`YearBuckets::merge`]; the finished table is the same as if every score
/// had been pushed into one bucket set.
#[derive(Debug, Clone, Default)]
pub struct YearBuckets {
    years: BTreeMap<i32, Vec<f64>>,
}

impl YearBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: &SentimentRecord) {
        self.years.entry(record.year()).or_default().push(record.score);
    }

    pub fn merge(&mut self, other: YearBuckets) {
        for (year, scores) in other.years {
            self.years.entry(year).or_default().extend(scores);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Total number of scores across all years.
    pub fn count(&self) -> usize {
        self.years.values().map(Vec::len).sum()
    }

    pub fn finish(self) -> Vec<YearlySummary> {
        self.years
            .into_iter()
            .filter(|(_, scores)| !scores.is_empty())
            .map(|(year, mut scores)| {
                scores.sort_by(f64::total_cmp);
                let comic_count = scores.len();
                YearlySummary {
                    year,
                    mean_sentiment: stable_sum(&scores) / comic_count as f64,
                    comic_count,
                }
            })
            .collect()
    }
}

impl<'a> Extend<&'a SentimentRecord> for YearBuckets {
    fn extend<T: IntoIterator<Item = &'a SentimentRecord>>(&mut self, iter: T) {
        for record in iter {
            self.push(record);
        }
    }
}

/// Group records by year and compute mean sentiment and count per year.
pub fn aggregate(records: &[SentimentRecord]) -> Vec<YearlySummary> {
    let mut buckets = YearBuckets::new();
    buckets.extend(records);
    buckets.finish()
}

/// Count-weighted mean over all summaries, or `None` when nothing was scored.
pub fn overall_mean(summaries: &[YearlySummary]) -> Option<f64> {
    let total: usize = summaries.iter().map(|s| s.comic_count).sum();
    if total == 0 {
        return None;
    }
    let weighted: Vec<f64> = summaries
        .iter()
        .map(|s| s.mean_sentiment * s.comic_count as f64)
        .collect();
    Some(stable_sum(&weighted) / total as f64)
}

/// Neumaier-compensated sum.
fn stable_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0f64;
    let mut compensation = 0.0f64;
    for &v in values {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            compensation += (sum - t) + v;
        } else {
            compensation += (v - t) + sum;
        }
        sum = t;
    }
    sum + compensation
}

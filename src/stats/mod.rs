//! Grouped statistics over an assembled table: counts and mean rating per
//! decade, genre, cast member and director.
//!
//! Genres and cast are stored as comma-joined text. By default membership
//! is decided by substring search in that text ([`Membership::Contains`]),
//! so a key such as "Act" also counts rows whose genres read "Action".
//! Each key where substring and exact-token counts disagree is logged.
//! [`Membership::Token`] groups by exact token equality instead.

use crate::dataset::normalize::{decade_label, split_list};
use crate::dataset::{Row, Table};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// How a row is matched against a key of a multi-valued column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Membership {
    /// Key is a substring of the comma-joined text.
    #[default]
    Contains,
    /// Key equals one of the comma-separated tokens.
    Token,
}

/// Column a grouped statistic is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Genres,
    Cast,
    Director,
}

impl Column {
    fn name(self) -> &'static str {
        match self {
            Column::Genres => "genre",
            Column::Cast => "cast",
            Column::Director => "director",
        }
    }

    fn text(self, row: &Row) -> &str {
        match self {
            Column::Genres => &row.genres,
            Column::Cast => &row.cast,
            Column::Director => &row.director,
        }
    }
}

/// Count and mean rating of the rows matching one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatEntry {
    pub key: String,
    pub count: usize,
    /// Mean rating of the matched rows; `None` when nothing matched
    pub avg_rating: Option<f64>,
}

impl StatEntry {
    fn from_ratings(key: impl Into<String>, ratings: &[f32]) -> Self {
        Self { key: key.into(), count: ratings.len(), avg_rating: mean(ratings) }
    }
}

/// Per-decade counts of the rows carrying one genre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreDecades {
    pub genre: String,
    /// Ascending decades with at least one matching row
    pub decades: Vec<StatEntry>,
}

/// Number of entries kept by the top-rated views.
pub const TOP_RATED: usize = 10;

/// All statistic views of one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub rows: usize,
    pub decades: Vec<StatEntry>,
    pub genres: Vec<StatEntry>,
    pub genre_decades: Vec<GenreDecades>,
    pub cast: Vec<StatEntry>,
    pub directors: Vec<StatEntry>,
    /// Best mean rating first, at most [`TOP_RATED`] entries
    pub top_rated_cast: Vec<StatEntry>,
    pub top_rated_directors: Vec<StatEntry>,
}

/// Computes grouped statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    membership: Membership,
}

impl Aggregator {
    pub fn new(membership: Membership) -> Self {
        Self { membership }
    }

    pub fn membership(&self) -> Membership {
        self.membership
    }

    /// Rows per decade in ascending order. Decades without rows are omitted,
    /// not zero-filled.
    pub fn decade_distribution(&self, table: &Table) -> Vec<StatEntry> {
        by_decade(table.iter())
    }

    /// Decade distribution of each genre's rows, genres in [`genre_stats`]
    /// order. Rows are matched per [`Membership`], like every genre view.
    ///
    /// [`genre_stats`]: Aggregator::genre_stats
    pub fn genre_decades(&self, table: &Table) -> Vec<GenreDecades> {
        self.genre_stats(table)
            .into_iter()
            .map(|entry| {
                let rows = table.iter().filter(|row| self.matches(row, Column::Genres, &entry.key));
                GenreDecades { decades: by_decade(rows), genre: entry.key }
            })
            .collect()
    }

    pub fn genre_stats(&self, table: &Table) -> Vec<StatEntry> {
        self.grouped(table, Column::Genres)
    }

    pub fn cast_stats(&self, table: &Table) -> Vec<StatEntry> {
        self.grouped(table, Column::Cast)
    }

    /// Director is single-valued, so rows always match by equality.
    pub fn director_stats(&self, table: &Table) -> Vec<StatEntry> {
        self.grouped(table, Column::Director)
    }

    /// Cast members by mean rating, best first, at most `limit` entries.
    pub fn top_rated_cast(&self, table: &Table, limit: usize) -> Vec<StatEntry> {
        top_by_rating(self.cast_stats(table), limit)
    }

    /// Directors by mean rating, best first, at most `limit` entries.
    pub fn top_rated_directors(&self, table: &Table, limit: usize) -> Vec<StatEntry> {
        top_by_rating(self.director_stats(table), limit)
    }

    /// Statistics for an independently supplied key set, in the given order.
    /// Keys matching no row get `count 0` and no average.
    pub fn stats_for_keys(&self, table: &Table, column: Column, keys: &[&str]) -> Vec<StatEntry> {
        keys.iter().map(|key| self.entry(table, column, key)).collect()
    }

    /// Bundles every view.
    pub fn report(&self, table: &Table) -> StatsReport {
        StatsReport {
            rows: table.len(),
            decades: self.decade_distribution(table),
            genres: self.genre_stats(table),
            genre_decades: self.genre_decades(table),
            cast: self.cast_stats(table),
            directors: self.director_stats(table),
            top_rated_cast: self.top_rated_cast(table, TOP_RATED),
            top_rated_directors: self.top_rated_directors(table, TOP_RATED),
        }
    }

    /// One entry per distinct key of `column`, by count descending then key.
    fn grouped(&self, table: &Table, column: Column) -> Vec<StatEntry> {
        let keys = distinct_keys(table, column);
        debug!("{} distinct {} keys", keys.len(), column.name());

        let mut entries: Vec<StatEntry> =
            keys.into_iter().map(|key| self.entry(table, column, key)).collect();

        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        entries
    }

    fn entry(&self, table: &Table, column: Column, key: &str) -> StatEntry {
        let ratings: Vec<f32> = table
            .iter()
            .filter(|row| self.matches(row, column, key))
            .map(|row| row.rating)
            .collect();

        if self.membership == Membership::Contains && column != Column::Director {
            let exact = table.iter().filter(|row| has_token(column.text(row), key)).count();
            if exact != ratings.len() {
                warn!(
                    "{} '{}' matched {} rows by substring but {} by exact token",
                    column.name(),
                    key,
                    ratings.len(),
                    exact
                );
            }
        }

        StatEntry::from_ratings(key, &ratings)
    }

    fn matches(&self, row: &Row, column: Column, key: &str) -> bool {
        let text = column.text(row);
        match column {
            Column::Director => text.trim() == key,
            Column::Genres | Column::Cast => match self.membership {
                Membership::Contains => !key.is_empty() && text.contains(key),
                Membership::Token => has_token(text, key),
            },
        }
    }
}

fn distinct_keys(table: &Table, column: Column) -> BTreeSet<&str> {
    table
        .iter()
        .flat_map(|row| match column {
            Column::Director => {
                let director = row.director.trim();
                (!director.is_empty()).then_some(director).into_iter().collect::<Vec<_>>()
            }
            Column::Genres | Column::Cast => split_list(column.text(row)).collect(),
        })
        .collect()
}

fn by_decade<'a>(rows: impl Iterator<Item = &'a Row>) -> Vec<StatEntry> {
    let mut buckets: BTreeMap<i32, Vec<f32>> = BTreeMap::new();
    for row in rows {
        buckets.entry(row.decade).or_default().push(row.rating);
    }

    buckets
        .into_iter()
        .map(|(decade, ratings)| StatEntry::from_ratings(decade_label(decade), &ratings))
        .collect()
}

/// Re-sorts entries by mean rating descending (ties by count, then key) and
/// keeps the first `limit`.
pub fn top_by_rating(mut entries: Vec<StatEntry>, limit: usize) -> Vec<StatEntry> {
    entries.sort_by(|a, b| {
        let a_avg = a.avg_rating.unwrap_or(f64::NEG_INFINITY);
        let b_avg = b.avg_rating.unwrap_or(f64::NEG_INFINITY);
        b_avg
            .total_cmp(&a_avg)
            .then_with(|| b.count.cmp(&a.count))
            .then_with(|| a.key.cmp(&b.key))
    });
    entries.truncate(limit);
    entries
}

fn has_token(text: &str, key: &str) -> bool {
    split_list(text).any(|token| token == key)
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().map(|v| f64::from(*v)).sum();
    Some(sum / values.len() as f64)
}

//! Dataset assembly: joins listing stubs with detail records into typed rows.

pub mod export;
pub mod normalize;

use crate::chart::models::{DetailRecord, StubRecord};
use crate::config::ErrorPolicy;
use crate::error::{Result, ScrapeError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One ranked title with normalized columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub title: String,
    pub year: i32,
    pub rating: f32,
    pub director: String,
    /// Runtime text as shown on the page ("2h 22m")
    pub runtime: String,
    /// Comma-joined genres, no spaces ("Crime,Drama")
    pub genres: String,
    /// Comma-joined cast names
    pub cast: String,
    pub votes: u64,
    /// Decade bucket, always `year.div_euclid(10) * 10`
    pub decade: i32,
    /// Detail reference the row was joined on; not exported
    #[serde(skip)]
    pub detail_ref: String,
}

impl Row {
    /// Merges a stub with its detail record, normalizing every column.
    pub fn from_parts(stub: StubRecord, detail: DetailRecord) -> Result<Self> {
        let year = normalize::parse_year(&stub.year)?;

        Ok(Self {
            rating: normalize::parse_rating(&stub.rating)?,
            votes: normalize::parse_votes(&detail.votes)?,
            decade: normalize::decade_of(year),
            year,
            title: stub.title,
            director: detail.director,
            runtime: detail.runtime,
            genres: normalize::join_list(&detail.genres),
            cast: normalize::join_list(&detail.cast),
            detail_ref: stub.detail_ref,
        })
    }

    /// Decade label ("1990").
    pub fn decade_label(&self) -> String {
        normalize::decade_label(self.decade)
    }

    pub fn genre_list(&self) -> Vec<&str> {
        normalize::split_list(&self.genres).collect()
    }

    pub fn cast_list(&self) -> Vec<&str> {
        normalize::split_list(&self.cast).collect()
    }
}

/// Ordered rows, one per ranked title. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Zips stubs and details by position. Both sequences must have the same
/// length; the first conversion failure aborts.
pub fn assemble(stubs: Vec<StubRecord>, details: Vec<DetailRecord>) -> Result<Table> {
    if stubs.len() != details.len() {
        return Err(ScrapeError::LengthMismatch { stubs: stubs.len(), details: details.len() });
    }

    let rows = stubs
        .into_iter()
        .zip(details)
        .map(|(stub, detail)| Row::from_parts(stub, detail))
        .collect::<Result<Vec<_>>>()?;

    Ok(Table::from_rows(rows))
}

#[derive(Debug)]
enum Slot {
    Pending,
    Filled(DetailRecord),
    Skipped,
}

/// Accumulates detail records against the listing stubs.
///
/// Every detail is attached at the position of its stub and must carry the
/// same reference, so a reordered or mismatched fetch is an error rather
/// than a silently misaligned row.
#[derive(Debug)]
pub struct TableBuilder {
    stubs: Vec<StubRecord>,
    slots: Vec<Slot>,
}

impl TableBuilder {
    pub fn new(stubs: Vec<StubRecord>) -> Self {
        let slots = stubs.iter().map(|_| Slot::Pending).collect();
        Self { stubs, slots }
    }

    pub fn stubs(&self) -> &[StubRecord] {
        &self.stubs
    }

    pub fn len(&self) -> usize {
        self.stubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stubs.is_empty()
    }

    /// Attaches the detail record fetched for `reference` at `index`.
    pub fn attach(&mut self, index: usize, reference: &str, detail: DetailRecord) -> Result<()> {
        let expected = self.stubs.get(index).map(StubRecord::key);
        if expected != Some(reference) {
            return Err(ScrapeError::ReferenceMismatch {
                index,
                reference: reference.to_string(),
                expected: expected.unwrap_or_default().to_string(),
            });
        }

        self.slots[index] = Slot::Filled(detail);
        Ok(())
    }

    /// Drops the item at `index` from the final table.
    pub fn skip(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Slot::Skipped;
        }
    }

    /// Normalizes every filled position into a row.
    ///
    /// Positions never attached nor skipped fail with `MissingDetail`.
    /// Conversion failures abort under `ErrorPolicy::Abort` and drop the row
    /// under `ErrorPolicy::Skip`.
    pub fn build(self, policy: ErrorPolicy) -> Result<Table> {
        let mut rows = Vec::with_capacity(self.stubs.len());

        for (index, (stub, slot)) in self.stubs.into_iter().zip(self.slots).enumerate() {
            match slot {
                Slot::Filled(detail) => match Row::from_parts(stub, detail) {
                    Ok(row) => rows.push(row),
                    Err(e) if policy == ErrorPolicy::Skip => {
                        warn!("Skipping position {}: {}", index, e);
                    }
                    Err(e) => return Err(e),
                },
                Slot::Skipped => debug!("Position {} ({}) skipped", index, stub.detail_ref),
                Slot::Pending => {
                    return Err(ScrapeError::MissingDetail { index, reference: stub.detail_ref });
                }
            }
        }

        Ok(Table::from_rows(rows))
    }
}

//! Detail page parser: director, runtime, genres, cast and vote count.

use crate::chart::extract;
use crate::chart::models::DetailRecord;
use crate::chart::selectors::detail;
use crate::error::{Result, ScrapeError};
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// What to do when a page has no genre chips or no cast grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingLists {
    /// Treat the page as malformed.
    #[default]
    Abort,
    /// Record an empty list.
    Empty,
}

/// Parser for title detail pages.
#[derive(Debug, Clone, Default)]
pub struct DetailParser {
    missing_lists: MissingLists,
}

impl DetailParser {
    pub fn new(missing_lists: MissingLists) -> Self {
        Self { missing_lists }
    }

    /// Parses one detail document. Missing fields are reported as
    /// `DetailParse { reference, field }`.
    pub fn parse(&self, html: &str, reference: &str) -> Result<DetailRecord> {
        let document = Html::parse_document(html);
        let record = self.extract(document.root_element()).map_err(|e| e.in_detail(reference))?;

        trace!(
            "Parsed detail {}: {} genres, {} cast members",
            reference,
            record.genres.len(),
            record.cast.len()
        );
        Ok(record)
    }

    fn extract(&self, root: ElementRef<'_>) -> Result<DetailRecord> {
        Ok(DetailRecord {
            director: director(root)?,
            runtime: runtime(root)?,
            genres: self.genres(root)?,
            cast: self.cast(root)?,
            votes: extract::text(root, &detail::VOTES)?,
        })
    }

    fn genres(&self, root: ElementRef<'_>) -> Result<Vec<String>> {
        let chips = extract::all(root, &detail::GENRE_CHIP);
        if chips.is_empty() {
            return self.missing(&detail::GENRE_CHIP);
        }

        chips.into_iter().map(|chip| extract::text(chip, &detail::GENRE_TEXT)).collect()
    }

    fn cast(&self, root: ElementRef<'_>) -> Result<Vec<String>> {
        let grid = match extract::first(root, &detail::CAST_GRID) {
            Ok(grid) => grid,
            Err(_) => return self.missing(&detail::CAST_GRID),
        };

        // Every child is a cast card; a card without a name fails the record.
        grid.children()
            .filter_map(ElementRef::wrap)
            .map(|card| extract::text(card, &detail::CAST_NAME))
            .collect()
    }

    fn missing(&self, locator: &extract::Locator) -> Result<Vec<String>> {
        match self.missing_lists {
            MissingLists::Abort => Err(ScrapeError::FieldNotFound { field: locator.field() }),
            MissingLists::Empty => {
                debug!("No '{}' on page, recording an empty list", locator.field());
                Ok(Vec::new())
            }
        }
    }
}

/// Director: the credit labelled "Director", else the first credit on the page.
fn director(root: ElementRef<'_>) -> Result<String> {
    let labeled = extract::labeled(
        root,
        &detail::METADATA_ITEM,
        &detail::METADATA_LABEL,
        &detail::METADATA_CONTENT,
        detail::DIRECTOR_LABELS,
    );

    match labeled {
        Some(element) => Ok(extract::element_text(element)),
        None => {
            debug!("No labelled director credit, using the first credit");
            extract::text(root, &detail::METADATA_CONTENT)
        }
    }
}

/// Runtime: the "Runtime" tech spec, else the positional hero list item.
fn runtime(root: ElementRef<'_>) -> Result<String> {
    let labeled = extract::labeled(
        root,
        &detail::METADATA_ITEM,
        &detail::METADATA_LABEL,
        &detail::METADATA_CONTENT,
        detail::RUNTIME_LABELS,
    );

    match labeled {
        Some(element) => Ok(extract::element_text(element)),
        None => {
            debug!("No labelled runtime, using hero list position");
            extract::text(root, &detail::RUNTIME_INLINE)
        }
    }
}

//! Structural locators for chart listing and title detail pages.
//!
//! Every locator used for parsing lives here. Update this file when the
//! page markup changes.
//!
//! **Update process**: when parsing fails, capture an HTML sample, update
//! the locators, and add a test fixture.

use crate::chart::extract::Locator;
use std::sync::LazyLock;

/// Locators for the ranked listing page.
pub mod listing {
    use super::*;

    /// The chart table holding one row per ranked title.
    pub static TABLE: LazyLock<Locator> =
        LazyLock::new(|| Locator::tag_class("chart", "table", &["chart", "full-width"]).unwrap());

    /// Table rows, header included.
    pub static ROW: LazyLock<Locator> = LazyLock::new(|| Locator::new("row", "tr").unwrap());

    /// Cell holding the title link and release year.
    pub static TITLE_CELL: LazyLock<Locator> =
        LazyLock::new(|| Locator::tag_class("title", "td", &["titleColumn"]).unwrap());

    /// Title link inside the title cell; its href addresses the detail page.
    pub static TITLE_LINK: LazyLock<Locator> =
        LazyLock::new(|| Locator::new("title", "a").unwrap());

    pub static DETAIL_REF: LazyLock<Locator> =
        LazyLock::new(|| Locator::new("detail_ref", "a[href]").unwrap());

    pub static DETAIL_REF_ATTR: &str = "href";

    /// Release year, rendered as "(1994)".
    pub static YEAR: LazyLock<Locator> = LazyLock::new(|| Locator::new("year", "span").unwrap());

    /// Rating value nested in the rating cell.
    pub static RATING: LazyLock<Locator> =
        LazyLock::new(|| Locator::new("rating", "td.imdbRating strong").unwrap());
}

/// Locators for per-title detail pages.
pub mod detail {
    use super::*;

    /// A labelled entry of the principal credits / tech specs lists.
    pub static METADATA_ITEM: LazyLock<Locator> =
        LazyLock::new(|| Locator::tag_class("metadata", "li", &["ipc-metadata-list__item"]).unwrap());

    /// The label of a metadata entry ("Director", "Runtime", ...).
    pub static METADATA_LABEL: LazyLock<Locator> =
        LazyLock::new(|| Locator::new("metadata_label", ".ipc-metadata-list-item__label").unwrap());

    /// A value inside a metadata entry. Without a label check this is the
    /// first credit on the page, which is the director on current layouts.
    pub static METADATA_CONTENT: LazyLock<Locator> = LazyLock::new(|| {
        Locator::new("director", ".ipc-metadata-list-item__list-content-item").unwrap()
    });

    pub static DIRECTOR_LABELS: &[&str] = &["Director", "Directors"];

    pub static RUNTIME_LABELS: &[&str] = &["Runtime"];

    /// Positional runtime fallback: the hero inline list reads
    /// year, certificate, runtime twice over, so runtime sits at index 5.
    pub static RUNTIME_INLINE: LazyLock<Locator> =
        LazyLock::new(|| Locator::new("runtime", ".ipc-inline-list__item").unwrap().nth(5));

    /// Genre chips.
    pub static GENRE_CHIP: LazyLock<Locator> =
        LazyLock::new(|| Locator::new("genres", ".ipc-chip.ipc-chip--on-baseAlt").unwrap());

    pub static GENRE_TEXT: LazyLock<Locator> =
        LazyLock::new(|| Locator::new("genre", ".ipc-chip__text").unwrap());

    /// Top cast grid; each child element is one cast member.
    pub static CAST_GRID: LazyLock<Locator> = LazyLock::new(|| {
        Locator::new("cast", ".ipc-sub-grid.ipc-sub-grid--page-span-2.ipc-shoveler__grid").unwrap()
    });

    /// Cast member name inside a grid child. Hashed class, rotates on redeploys.
    pub static CAST_NAME: LazyLock<Locator> =
        LazyLock::new(|| Locator::new("cast_name", ".sc-36c36dd0-1.QSQgP").unwrap());

    /// Aggregate vote count ("2.7M"). Hashed class, rotates on redeploys.
    pub static VOTES: LazyLock<Locator> =
        LazyLock::new(|| Locator::new("votes", ".sc-7ab21ed2-3.dPVcnq").unwrap());
}

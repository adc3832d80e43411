//! Field extraction primitives shared by the listing and detail parsers.
//!
//! A [`Locator`] names the semantic field it extracts, so a missing node
//! surfaces as `FieldNotFound { field }` without the caller repeating the
//! field name at every lookup.

use crate::error::{Result, ScrapeError};
use scraper::{ElementRef, Selector};

/// A structural locator: a compiled CSS selector (tag, classes, attribute
/// predicates) plus an optional positional index.
#[derive(Debug, Clone)]
pub struct Locator {
    field: &'static str,
    css: String,
    selector: Selector,
    nth: Option<usize>,
}

impl Locator {
    /// Compiles a locator for `field` from a CSS selector string.
    pub fn new(field: &'static str, css: &str) -> Result<Self> {
        let selector = Selector::parse(css)
            .map_err(|_| ScrapeError::InvalidSelector { field, css: css.to_string() })?;

        Ok(Self { field, css: css.to_string(), selector, nth: None })
    }

    /// Builds a locator from a tag name and a set of classes that must all be present.
    pub fn tag_class(field: &'static str, tag: &str, classes: &[&str]) -> Result<Self> {
        let mut css = tag.to_string();
        for class in classes {
            css.push('.');
            css.push_str(class);
        }
        Self::new(field, &css)
    }

    /// Selects the match at `index` (zero-based) instead of the first one.
    pub fn nth(mut self, index: usize) -> Self {
        self.nth = Some(index);
        self
    }

    /// Field name reported when this locator matches nothing.
    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn index(&self) -> Option<usize> {
        self.nth
    }
}

/// Returns the first matching element, or the positional one for `nth` locators.
pub fn first<'a>(scope: ElementRef<'a>, locator: &Locator) -> Result<ElementRef<'a>> {
    let mut matches = scope.select(locator.selector());
    let found = match locator.index() {
        Some(index) => matches.nth(index),
        None => matches.next(),
    };

    found.ok_or(ScrapeError::FieldNotFound { field: locator.field() })
}

/// Text content of the located element, whitespace-normalized.
pub fn text(scope: ElementRef<'_>, locator: &Locator) -> Result<String> {
    first(scope, locator).map(element_text)
}

/// Value of attribute `name` on the located element.
pub fn attr(scope: ElementRef<'_>, locator: &Locator, name: &str) -> Result<String> {
    first(scope, locator)?
        .value()
        .attr(name)
        .map(String::from)
        .ok_or(ScrapeError::FieldNotFound { field: locator.field() })
}

/// Every match in document order. Positional indices are ignored.
pub fn all<'a>(scope: ElementRef<'a>, locator: &Locator) -> Vec<ElementRef<'a>> {
    scope.select(locator.selector()).collect()
}

/// Text content of every match in document order.
pub fn texts(scope: ElementRef<'_>, locator: &Locator) -> Vec<String> {
    all(scope, locator).into_iter().map(element_text).collect()
}

/// Label-aware lookup.
///
/// Scans every `item`, and for the first whose `label` node reads as one of
/// `labels` (case-insensitive) returns the first `value` node inside it.
pub fn labeled<'a>(
    scope: ElementRef<'a>,
    item: &Locator,
    label: &Locator,
    value: &Locator,
    labels: &[&str],
) -> Option<ElementRef<'a>> {
    scope.select(item.selector()).find_map(|entry| {
        let label_text = entry.select(label.selector()).next().map(element_text)?;
        if labels.iter().any(|l| label_text.eq_ignore_ascii_case(l)) {
            entry.select(value.selector()).next()
        } else {
            None
        }
    })
}

/// Concatenated text of an element with runs of whitespace collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

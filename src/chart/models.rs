//! Raw records extracted from listing and detail documents.

use serde::{Deserialize, Serialize};

/// One ranked row of the listing page. All fields are raw text; rank is
/// implicit in sequence order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StubRecord {
    /// Title text
    pub title: String,
    /// Opaque reference to the detail document (href as found on the page)
    pub detail_ref: String,
    /// Release year, parentheses stripped ("1994")
    pub year: String,
    /// Rating text ("9.2")
    pub rating: String,
}

impl StubRecord {
    /// Join key pairing this stub with its detail record.
    pub fn key(&self) -> &str {
        &self.detail_ref
    }
}

/// Attributes taken from one detail document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub director: String,
    /// Runtime text ("2h 22m")
    pub runtime: String,
    /// Genres in document order
    pub genres: Vec<String>,
    /// Top cast in document order
    pub cast: Vec<String>,
    /// Vote count text ("2.7M")
    pub votes: String,
}

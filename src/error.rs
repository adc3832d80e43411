//! Error taxonomy for extraction, assembly and export.

use thiserror::Error;

/// Errors raised while turning chart documents into a table.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A required node is absent from a document.
    #[error("field '{field}' not found")]
    FieldNotFound { field: &'static str },

    /// A listing row is missing one of its fields.
    #[error("listing row {row}: field '{field}' not found")]
    RowParse { row: usize, field: &'static str },

    /// A detail document is missing one of its fields.
    #[error("detail document '{reference}': field '{field}' not found")]
    DetailParse { reference: String, field: &'static str },

    /// Raw text could not be normalized into a number.
    #[error("cannot convert {column} value '{value}'")]
    TypeConversion { column: &'static str, value: String },

    /// A locator literal is not a valid CSS selector.
    #[error("invalid selector for '{field}': {css}")]
    InvalidSelector { field: &'static str, css: String },

    /// Stub and detail sequences differ in length.
    #[error("{stubs} listing entries but {details} detail records")]
    LengthMismatch { stubs: usize, details: usize },

    /// A detail record was attached to a position holding another reference.
    #[error("detail for '{reference}' attached at position {index}, which holds '{expected}'")]
    ReferenceMismatch { index: usize, reference: String, expected: String },

    /// A position was neither filled with a detail record nor skipped.
    #[error("no detail record for '{reference}' (position {index})")]
    MissingDetail { index: usize, reference: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    /// Re-labels a `FieldNotFound` as a row error for the given listing row.
    pub fn in_row(self, row: usize) -> Self {
        match self {
            ScrapeError::FieldNotFound { field } => ScrapeError::RowParse { row, field },
            other => other,
        }
    }

    /// Re-labels a `FieldNotFound` as a detail error for the given reference.
    pub fn in_detail(self, reference: &str) -> Self {
        match self {
            ScrapeError::FieldNotFound { field } => {
                ScrapeError::DetailParse { reference: reference.to_string(), field }
            }
            other => other,
        }
    }
}

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_row_relabels_field_not_found() {
        let err = ScrapeError::FieldNotFound { field: "rating" }.in_row(3);
        assert!(matches!(err, ScrapeError::RowParse { row: 3, field: "rating" }));
        assert_eq!(err.to_string(), "listing row 3: field 'rating' not found");
    }

    #[test]
    fn test_in_detail_relabels_field_not_found() {
        let err = ScrapeError::FieldNotFound { field: "votes" }.in_detail("/title/tt0111161/");
        assert!(matches!(err, ScrapeError::DetailParse { field: "votes", .. }));
        assert!(err.to_string().contains("/title/tt0111161/"));
    }

    #[test]
    fn test_relabel_keeps_other_errors() {
        let err = ScrapeError::TypeConversion { column: "year", value: "19x4".to_string() };
        let err = err.in_row(1);
        assert!(matches!(err, ScrapeError::TypeConversion { column: "year", .. }));
    }
}

//! Listing page parser: one stub per ranked chart row.

use crate::chart::extract;
use crate::chart::models::StubRecord;
use crate::chart::selectors::listing;
use crate::error::Result;
use scraper::{ElementRef, Html};
use tracing::{debug, trace};

/// A parsed listing document.
///
/// Stubs are produced lazily by [`Listing::stubs`], which can be called any
/// number of times and always yields the same sequence.
pub struct Listing {
    document: Html,
}

impl Listing {
    /// Parses listing HTML. Fails with `FieldNotFound("chart")` when the page
    /// has no chart table.
    pub fn parse(html: &str) -> Result<Self> {
        let document = Html::parse_document(html);
        extract::first(document.root_element(), &listing::TABLE)?;

        let listing = Self { document };
        debug!("Listing holds {} data rows", listing.len());
        Ok(listing)
    }

    /// Iterates stubs in rank order, skipping the header row.
    ///
    /// A malformed row yields `RowParse { row, field }` where `row` is the
    /// row's index in the table (header is row 0); iteration continues with
    /// the next row so the caller picks skip or abort.
    pub fn stubs(&self) -> impl Iterator<Item = Result<StubRecord>> + '_ {
        self.rows().map(|(index, row)| parse_row(row).map_err(|e| e.in_row(index)))
    }

    /// Number of data rows, header excluded.
    pub fn len(&self) -> usize {
        self.rows().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn rows(&self) -> impl Iterator<Item = (usize, ElementRef<'_>)> + '_ {
        extract::first(self.document.root_element(), &listing::TABLE)
            .ok()
            .into_iter()
            .flat_map(|table| table.select(listing::ROW.selector()).enumerate().skip(1))
    }
}

fn parse_row(row: ElementRef<'_>) -> Result<StubRecord> {
    let cell = extract::first(row, &listing::TITLE_CELL)?;

    let title = extract::text(cell, &listing::TITLE_LINK)?;
    let detail_ref = extract::attr(cell, &listing::DETAIL_REF, listing::DETAIL_REF_ATTR)?;
    let year = strip_parens(&extract::text(cell, &listing::YEAR)?).to_string();
    let rating = extract::text(row, &listing::RATING)?;

    trace!("Parsed listing row: {} ({})", title, year);

    Ok(StubRecord { title, detail_ref, year, rating })
}

/// Strips one wrapping pair of parentheses: "(1994)" -> "1994".
fn strip_parens(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix('(').and_then(|t| t.strip_suffix(')')).unwrap_or(text).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;

    fn row(title: &str, href: &str, year: &str, rating: &str) -> String {
        format!(
            r#"<tr>
                <td class="posterColumn"><img src="poster.jpg"></td>
                <td class="titleColumn">
                    1. <a href="{href}" title="dir.">{title}</a>
                    <span class="secondaryInfo">({year})</span>
                </td>
                <td class="ratingColumn imdbRating"><strong title="based on votes">{rating}</strong></td>
            </tr>"#
        )
    }

    fn listing_html(rows: &[String]) -> String {
        format!(
            r#"<html><body><table class="chart full-width" data-caller-name="chart-top250movie">
                <thead><tr><th></th><th>Rank &amp; Title</th><th>IMDb Rating</th></tr></thead>
                <tbody class="lister-list">{}</tbody>
            </table></body></html>"#,
            rows.join("\n")
        )
    }

    #[test]
    fn test_parse_rows_in_order() {
        let html = listing_html(&[
            row("The Shawshank Redemption", "/title/tt0111161/", "1994", "9.2"),
            row("The Godfather", "/title/tt0068646/", "1972", "9.2"),
            row("The Dark Knight", "/title/tt0468569/", "2008", "9.0"),
        ]);

        let listing = Listing::parse(&html).unwrap();
        let stubs: Vec<_> = listing.stubs().collect::<Result<_>>().unwrap();

        assert_eq!(listing.len(), 3);
        assert_eq!(stubs.len(), 3);
        assert_eq!(stubs[0].title, "The Shawshank Redemption");
        assert_eq!(stubs[0].detail_ref, "/title/tt0111161/");
        assert_eq!(stubs[0].year, "1994");
        assert_eq!(stubs[0].rating, "9.2");
        assert_eq!(stubs[1].title, "The Godfather");
        assert_eq!(stubs[2].year, "2008");
    }

    #[test]
    fn test_stubs_restartable() {
        let html = listing_html(&[
            row("A", "/title/tt1/", "2001", "8.1"),
            row("B", "/title/tt2/", "2002", "8.2"),
        ]);
        let listing = Listing::parse(&html).unwrap();

        let first: Vec<_> = listing.stubs().collect::<Result<_>>().unwrap();
        let second: Vec<_> = listing.stubs().collect::<Result<_>>().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_header_only_listing_is_empty() {
        let listing = Listing::parse(&listing_html(&[])).unwrap();
        assert!(listing.is_empty());
        assert_eq!(listing.stubs().count(), 0);
    }

    #[test]
    fn test_missing_table() {
        let err = Listing::parse("<html><body><p>maintenance</p></body></html>").err().unwrap();
        assert!(matches!(err, ScrapeError::FieldNotFound { field: "chart" }));
    }

    #[test]
    fn test_row_missing_rating() {
        let broken = r#"<tr><td class="titleColumn"><a href="/title/tt3/">C</a>
            <span>(2003)</span></td><td class="imdbRating"></td></tr>"#
            .to_string();
        let html = listing_html(&[row("A", "/title/tt1/", "2001", "8.1"), broken]);

        let listing = Listing::parse(&html).unwrap();
        let results: Vec<_> = listing.stubs().collect();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(ScrapeError::RowParse { row: 2, field: "rating" })));
    }

    #[test]
    fn test_row_missing_title_cell() {
        let broken = r#"<tr><td class="imdbRating"><strong>8.0</strong></td></tr>"#.to_string();
        let listing = Listing::parse(&listing_html(&[broken])).unwrap();
        let err = listing.stubs().next().unwrap().unwrap_err();
        assert!(matches!(err, ScrapeError::RowParse { row: 1, field: "title" }));
    }

    #[test]
    fn test_row_missing_href() {
        let broken = r#"<tr><td class="titleColumn"><a>C</a><span>(2003)</span></td>
            <td class="imdbRating"><strong>8.0</strong></td></tr>"#
            .to_string();
        let listing = Listing::parse(&listing_html(&[broken])).unwrap();
        let err = listing.stubs().next().unwrap().unwrap_err();
        assert!(matches!(err, ScrapeError::RowParse { row: 1, field: "detail_ref" }));
    }

    #[test]
    fn test_strip_parens() {
        assert_eq!(strip_parens("(1994)"), "1994");
        assert_eq!(strip_parens(" (1994) "), "1994");
        assert_eq!(strip_parens("1994"), "1994");
        assert_eq!(strip_parens("(1994"), "(1994");
    }
}

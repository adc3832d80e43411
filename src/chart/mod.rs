//! Chart-specific modules for fetching, locating and parsing pages.

pub mod client;
pub mod detail;
pub mod extract;
pub mod listing;
pub mod models;
pub mod selectors;

pub use client::{ChartClient, ChartSource};
pub use detail::{DetailParser, MissingLists};
pub use extract::Locator;
pub use listing::Listing;
pub use models::{DetailRecord, StubRecord};

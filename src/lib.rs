//! chart-crawler - Top chart scraper with CSV export and grouped statistics
//!
//! Scrapes a ranked listing page and one detail page per entry, normalizes
//! both into a flat table and computes per-decade, genre, cast and director
//! statistics over it.

pub mod chart;
pub mod commands;
pub mod config;
pub mod dataset;
pub mod error;
pub mod format;
pub mod stats;

pub use chart::models::{DetailRecord, StubRecord};
pub use config::Config;
pub use dataset::{Row, Table};
pub use error::ScrapeError;
pub use stats::{Aggregator, Membership, StatEntry, StatsReport};

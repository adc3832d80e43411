//! CLI command implementations.

pub mod scrape;
pub mod stats;

pub use scrape::ScrapeCommand;
pub use stats::StatsCommand;

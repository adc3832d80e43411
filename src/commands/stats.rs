//! Stats command: grouped statistics over an exported table.

use crate::config::Config;
use crate::dataset::{export, Table};
use crate::format::Formatter;
use crate::stats::Aggregator;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Computes the statistics report for a previously exported CSV.
pub struct StatsCommand {
    config: Config,
}

impl StatsCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Loads `input` and returns the formatted report.
    pub fn execute(&self, input: &Path) -> Result<String> {
        let table = export::load(input)
            .with_context(|| format!("Failed to load table from {}", input.display()))?;
        info!("Loaded {} rows from {}", table.len(), input.display());

        Ok(self.execute_with_table(&table))
    }

    /// Formats the report for an in-memory table.
    pub fn execute_with_table(&self, table: &Table) -> String {
        let report = Aggregator::new(self.config.membership).report(table);
        Formatter::new(self.config.format).format_report(&report)
    }
}

//! Scrape command: listing -> details -> table -> CSV export.

use crate::chart::{ChartClient, ChartSource, DetailParser, Listing, StubRecord};
use crate::config::{Config, ErrorPolicy};
use crate::dataset::{export, Table, TableBuilder};
use crate::format::Formatter;
use crate::stats::Aggregator;
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

/// Runs the full extraction pipeline.
pub struct ScrapeCommand {
    config: Config,
}

impl ScrapeCommand {
    /// Creates a new scrape command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Scrapes, exports the CSV and returns formatted output, with the
    /// statistics report appended when `with_stats` is set.
    pub async fn execute(&self, with_stats: bool) -> Result<String> {
        let client = ChartClient::new(&self.config).await.context("Failed to create HTTP client")?;

        let table = self.execute_with_client(&client).await?;

        export::save(&table, &self.config.output).with_context(|| {
            format!("Failed to write export file: {}", self.config.output.display())
        })?;

        let formatter = Formatter::new(self.config.format);
        let mut output = formatter.format_table(&table);

        if with_stats {
            let report = Aggregator::new(self.config.membership).report(&table);
            output.push_str("\n\n");
            output.push_str(&formatter.format_report(&report));
        }

        Ok(output)
    }

    /// Builds the table with a provided source (for testing).
    pub async fn execute_with_client(&self, client: &impl ChartSource) -> Result<Table> {
        let html = client.listing().await.context("Failed to fetch listing")?;
        let stubs = self.collect_stubs(&html)?;
        info!("Listing yielded {} titles", stubs.len());

        let mut builder = TableBuilder::new(stubs);
        self.fetch_details(client, &mut builder).await?;

        let table = builder.build(self.config.error_policy())?;
        info!("Assembled {} rows", table.len());

        Ok(table)
    }

    fn collect_stubs(&self, html: &str) -> Result<Vec<StubRecord>> {
        let listing = Listing::parse(html).context("Failed to parse listing")?;
        let limit = self.config.max_items.unwrap_or(usize::MAX);

        let mut stubs = Vec::new();
        for result in listing.stubs() {
            if stubs.len() >= limit {
                debug!("Reached max_items ({})", limit);
                break;
            }

            match result {
                Ok(stub) => stubs.push(stub),
                Err(e) if self.config.error_policy() == ErrorPolicy::Skip => {
                    warn!("Skipping listing row: {}", e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(stubs)
    }

    /// Fetches and parses every detail page with at most `concurrency`
    /// requests in flight. Results come back in listing order, so detail `i`
    /// is always attached to stub `i`.
    async fn fetch_details(&self, client: &impl ChartSource, builder: &mut TableBuilder) -> Result<()> {
        let parser = DetailParser::new(self.config.missing_lists);
        let concurrency = self.config.concurrency.max(1);
        let references: Vec<String> = builder.stubs().iter().map(|s| s.key().to_string()).collect();
        let total = references.len();

        let mut details = stream::iter(references.iter().enumerate())
            .map(|(index, reference)| {
                let parser = &parser;
                async move {
                    debug!("Fetching detail {}/{}: {}", index + 1, total, reference);
                    let html = client
                        .detail(reference)
                        .await
                        .with_context(|| format!("Failed to fetch {}", reference))?;
                    let detail = parser.parse(&html, reference)?;
                    Ok::<_, anyhow::Error>(detail)
                }
            })
            .buffered(concurrency)
            .enumerate();

        while let Some((index, result)) = details.next().await {
            let reference = &references[index];
            match result {
                Ok(detail) => builder.attach(index, reference, detail)?,
                Err(e) if self.config.error_policy() == ErrorPolicy::Skip => {
                    warn!("Skipping {}: {:#}", reference, e);
                    builder.skip(index);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }
}

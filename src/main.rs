//! chart-crawler - Top chart scraper CLI
//!
//! Uses TLS fingerprint emulation for reliable fetching.

use anyhow::Result;
use chart_crawler::chart::MissingLists;
use chart_crawler::commands::{ScrapeCommand, StatsCommand};
use chart_crawler::config::{Config, ErrorPolicy, OutputFormat};
use chart_crawler::stats::Membership;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "chart-crawler",
    version,
    about = "Scrape a top chart into CSV and summarize it",
    long_about = "Fetches the ranked listing and every detail page, exports a flat CSV and reports per-decade, genre, cast and director statistics."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format: table, json, markdown, csv [default: table]
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Delay between requests in milliseconds
    #[arg(long, global = true, env = "CHART_DELAY")]
    delay: Option<u64>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "CHART_PROXY")]
    proxy: Option<String>,

    /// Site root to scrape (e.g., a local mirror)
    #[arg(long, global = true, env = "CHART_BASE_URL")]
    base_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the chart and export it as CSV
    #[command(alias = "s")]
    Scrape {
        /// CSV file to write
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only scrape the first N entries
        #[arg(short, long)]
        max: Option<usize>,

        /// Maximum detail requests in flight. Above 1, a failed entry is
        /// dropped instead of failing the run unless --fail-fast is given
        #[arg(long, env = "CHART_CONCURRENCY")]
        concurrency: Option<usize>,

        /// Drop malformed entries instead of failing the run
        #[arg(long, conflicts_with = "fail_fast")]
        skip_errors: bool,

        /// Fail the run on the first malformed entry, even when concurrent
        #[arg(long)]
        fail_fast: bool,

        /// Record pages without genres or cast as empty lists
        #[arg(long)]
        empty_lists: bool,

        /// Print statistics after the export
        #[arg(long)]
        stats: bool,
    },

    /// Show statistics for an exported CSV
    Stats {
        /// CSV file to read (defaults to the configured output)
        file: Option<PathBuf>,

        /// Group genres and cast by exact name instead of substring
        #[arg(long)]
        token_match: bool,
    },
}

impl Cli {
    /// Overrides config values with global flags that were actually given.
    fn apply_globals(&self, config: &mut Config) {
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(delay) = self.delay {
            config.delay_ms = delay;
        }
        if let Some(proxy) = &self.proxy {
            config.proxy = Some(proxy.clone());
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    cli.apply_globals(&mut config);

    match cli.command {
        Commands::Scrape { output, max, concurrency, skip_errors, fail_fast, empty_lists, stats } => {
            if let Some(output) = output {
                config.output = output;
            }
            if max.is_some() {
                config.max_items = max;
            }
            if let Some(concurrency) = concurrency {
                config.concurrency = concurrency;
            }
            if skip_errors {
                config.on_error = Some(ErrorPolicy::Skip);
            }
            if fail_fast {
                config.on_error = Some(ErrorPolicy::Abort);
            }
            if empty_lists {
                config.missing_lists = MissingLists::Empty;
            }

            let cmd = ScrapeCommand::new(config);
            let output = cmd.execute(stats).await?;
            println!("{}", output);
        }

        Commands::Stats { file, token_match } => {
            if token_match {
                config.membership = Membership::Token;
            }

            let input = file.unwrap_or_else(|| config.output.clone());
            let cmd = StatsCommand::new(config);
            let output = cmd.execute(&input)?;
            println!("{}", output);
        }
    }

    Ok(())
}

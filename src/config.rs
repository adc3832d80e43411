//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::chart::detail::MissingLists;
use crate::stats::Membership;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site root that listing and detail references resolve against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the listing page under `base_url`
    #[serde(default = "default_listing_path")]
    pub listing_path: String,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Base delay between requests in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default = "default_delay_jitter_ms")]
    pub delay_jitter_ms: u64,

    /// Maximum detail requests in flight; 1 fetches strictly in order
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Only scrape the first N listing entries
    #[serde(default)]
    pub max_items: Option<usize>,

    /// CSV export path
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Output format for summaries and statistics
    #[serde(default)]
    pub format: OutputFormat,

    /// What a malformed row, page or value does to the run. Unset means
    /// abort when fetching sequentially and skip when fetching concurrently;
    /// see [`Config::error_policy`].
    #[serde(default)]
    pub on_error: Option<ErrorPolicy>,

    /// What a page without genre chips or cast grid does
    #[serde(default)]
    pub missing_lists: MissingLists,

    /// Genre/cast grouping semantics
    #[serde(default)]
    pub membership: Membership,
}

fn default_base_url() -> String {
    "https://www.imdb.com".to_string()
}

fn default_listing_path() -> String {
    "/chart/top/".to_string()
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_delay_jitter_ms() -> u64 {
    1000
}

fn default_concurrency() -> usize {
    1
}

fn default_output() -> PathBuf {
    PathBuf::from("top_chart.csv")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            listing_path: default_listing_path(),
            proxy: None,
            delay_ms: default_delay_ms(),
            delay_jitter_ms: default_delay_jitter_ms(),
            concurrency: default_concurrency(),
            max_items: None,
            output: default_output(),
            format: OutputFormat::Table,
            on_error: None,
            missing_lists: MissingLists::Abort,
            membership: Membership::Contains,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("chart-crawler").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Effective failure policy. An explicit `on_error` always wins;
    /// otherwise a concurrent run (`concurrency > 1`) skips failed items so one
    /// bad page does not abort the batch.
    pub fn error_policy(&self) -> ErrorPolicy {
        match self.on_error {
            Some(policy) => policy,
            None if self.concurrency > 1 => ErrorPolicy::Skip,
            None => ErrorPolicy::Abort,
        }
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(base_url) = std::env::var("CHART_BASE_URL") {
            self.base_url = base_url;
        }

        if let Ok(proxy) = std::env::var("CHART_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("CHART_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        if let Ok(concurrency) = std::env::var("CHART_CONCURRENCY") {
            if let Ok(c) = concurrency.parse() {
                self.concurrency = c;
            }
        }

        self
    }
}

/// Failure handling shared by listing rows, detail pages and value conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Fail the whole run; nothing is exported.
    #[default]
    Abort,
    /// Log and drop the offending item, keep going.
    Skip,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, "https://www.imdb.com");
        assert_eq!(config.listing_path, "/chart/top/");
        assert_eq!(config.delay_ms, 1000);
        assert_eq!(config.delay_jitter_ms, 1000);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.output, PathBuf::from("top_chart.csv"));
        assert_eq!(config.format, OutputFormat::Table);
        assert!(config.on_error.is_none());
        assert_eq!(config.error_policy(), ErrorPolicy::Abort);
        assert_eq!(config.missing_lists, MissingLists::Abort);
        assert_eq!(config.membership, Membership::Contains);
        assert!(config.proxy.is_none());
        assert!(config.max_items.is_none());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);

        let err = "invalid".parse::<OutputFormat>().unwrap_err();
        assert!(err.contains("Unknown format"));
        assert!(err.contains("table, json, markdown, csv"));
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Markdown.to_string(), "markdown");
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            base_url = "http://localhost:8080"
            delay_ms = 0
            concurrency = 4
            on_error = "skip"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.delay_ms, 0);
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.on_error, Some(ErrorPolicy::Skip));
        assert_eq!(config.listing_path, "/chart/top/");
    }

    #[test]
    fn test_config_from_toml_all_fields() {
        let toml = r#"
            base_url = "https://mirror.example"
            listing_path = "/top250.html"
            proxy = "socks5://localhost:1080"
            delay_ms = 5000
            delay_jitter_ms = 2000
            concurrency = 3
            max_items = 50
            output = "out/top.csv"
            format = "json"
            on_error = "skip"
            missing_lists = "empty"
            membership = "token"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.base_url, "https://mirror.example");
        assert_eq!(config.listing_path, "/top250.html");
        assert_eq!(config.proxy, Some("socks5://localhost:1080".to_string()));
        assert_eq!(config.delay_ms, 5000);
        assert_eq!(config.delay_jitter_ms, 2000);
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.max_items, Some(50));
        assert_eq!(config.output, PathBuf::from("out/top.csv"));
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.on_error, Some(ErrorPolicy::Skip));
        assert_eq!(config.missing_lists, MissingLists::Empty);
        assert_eq!(config.membership, Membership::Token);
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            delay_ms = 4000
            max_items = 10
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.delay_ms, 4000);
        assert_eq!(config.max_items, Some(10));
    }

    #[test]
    fn test_config_from_file_not_found() {
        let err = Config::from_file("/nonexistent/path/config.toml").unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let err = Config::from_file(file.path()).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"concurrency = 2"#).unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.concurrency, 2);
    }

    #[test]
    fn test_config_with_env() {
        let orig_base = std::env::var("CHART_BASE_URL").ok();
        let orig_delay = std::env::var("CHART_DELAY").ok();
        let orig_concurrency = std::env::var("CHART_CONCURRENCY").ok();

        std::env::set_var("CHART_BASE_URL", "http://127.0.0.1:9000");
        std::env::set_var("CHART_DELAY", "250");
        std::env::set_var("CHART_CONCURRENCY", "not_a_number");

        let config = Config::new().with_env();
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.delay_ms, 250);
        // Invalid values are ignored
        assert_eq!(config.concurrency, 1);

        for (key, value) in [
            ("CHART_BASE_URL", orig_base),
            ("CHART_DELAY", orig_delay),
            ("CHART_CONCURRENCY", orig_concurrency),
        ] {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }

    #[test]
    fn test_error_policy_follows_concurrency() {
        let sequential = Config::default();
        assert_eq!(sequential.error_policy(), ErrorPolicy::Abort);

        let concurrent = Config { concurrency: 4, ..Config::default() };
        assert_eq!(concurrent.error_policy(), ErrorPolicy::Skip);

        let strict = Config { concurrency: 4, on_error: Some(ErrorPolicy::Abort), ..Config::default() };
        assert_eq!(strict.error_policy(), ErrorPolicy::Abort);

        let lenient = Config { on_error: Some(ErrorPolicy::Skip), ..Config::default() };
        assert_eq!(lenient.error_policy(), ErrorPolicy::Skip);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            concurrency: 8,
            on_error: Some(ErrorPolicy::Skip),
            membership: Membership::Token,
            ..Config::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.concurrency, 8);
        assert_eq!(parsed.on_error, Some(ErrorPolicy::Skip));
        assert_eq!(parsed.membership, Membership::Token);
        assert_eq!(parsed.base_url, config.base_url);
    }
}

//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::feed::FEED_ID_PLACEHOLDER;
use crate::models::patterns::LinkPattern;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where the listing page lives and how to request it
    #[serde(default)]
    pub source: SourceConfig,

    /// Markup recognition rules
    #[serde(default)]
    pub extract: ExtractConfig,

    /// Per-run retry budget
    #[serde(default)]
    pub retry: RetryConfig,

    /// Scheduled mode cadence
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Snapshot destination and size
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.source.page_url)?;
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        if !self.source.stream_url_template.contains(FEED_ID_PLACEHOLDER) {
            return Err(AppError::validation(format!(
                "source.stream_url_template must contain {FEED_ID_PLACEHOLDER}"
            )));
        }

        let extract = &self.extract;
        for selector in [
            &extract.table_selector,
            &extract.row_selector,
            &extract.cell_selector,
        ] {
            Selector::parse(selector)
                .map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
        }
        if extract.min_cells == 0 {
            return Err(AppError::validation("extract.min_cells must be > 0"));
        }
        if extract.listener_column >= extract.min_cells {
            return Err(AppError::validation(
                "extract.listener_column must be < extract.min_cells",
            ));
        }
        if extract.id_params.iter().all(|p| p.trim().is_empty()) {
            return Err(AppError::validation("extract.id_params is empty"));
        }
        for pattern in &extract.link_patterns {
            Regex::new(&pattern.href_pattern)?;
        }

        if self.retry.max_attempts == 0 {
            return Err(AppError::validation("retry.max_attempts must be > 0"));
        }
        if self.output.max_feeds == 0 {
            return Err(AppError::validation("output.max_feeds must be > 0"));
        }
        if self.output.path.as_os_str().is_empty() {
            return Err(AppError::validation("output.path is empty"));
        }
        Ok(())
    }
}

/// Listing page location and request settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// URL of the top feeds listing
    #[serde(default = "defaults::page_url")]
    pub page_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Stream URL with a `{feed_id}` placeholder
    #[serde(default = "defaults::stream_url_template")]
    pub stream_url_template: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            page_url: defaults::page_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            stream_url_template: defaults::stream_url_template(),
        }
    }
}

/// Feed row recognition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Selector for the preferred listing table; all rows are scanned when absent
    #[serde(default = "defaults::table_selector")]
    pub table_selector: String,

    /// Selector for each row
    #[serde(default = "defaults::row_selector")]
    pub row_selector: String,

    /// Selector for cells within a row
    #[serde(default = "defaults::cell_selector")]
    pub cell_selector: String,

    /// Rows with fewer cells are skipped
    #[serde(default = "defaults::min_cells")]
    pub min_cells: usize,

    /// Zero-based index of the listener count cell
    #[serde(default = "defaults::listener_column")]
    pub listener_column: usize,

    /// Feed link patterns, highest priority first
    #[serde(default = "defaults::link_patterns")]
    pub link_patterns: Vec<LinkPattern>,

    /// Query parameter names carrying the feed id, highest priority first
    #[serde(default = "defaults::id_params")]
    pub id_params: Vec<String>,

    /// Substrings accepted in an `href` when no pattern matched
    #[serde(default = "defaults::link_keywords")]
    pub link_keywords: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            table_selector: defaults::table_selector(),
            row_selector: defaults::row_selector(),
            cell_selector: defaults::cell_selector(),
            min_cells: defaults::min_cells(),
            listener_column: defaults::listener_column(),
            link_patterns: defaults::link_patterns(),
            id_params: defaults::id_params(),
            link_keywords: defaults::link_keywords(),
        }
    }
}

/// Retry budget for a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts per run, including the first
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Base delay; the wait after attempt `n` is `n * delay_secs`
    #[serde(default = "defaults::retry_delay")]
    pub delay_secs: u64,
}

impl RetryConfig {
    /// Delay to wait after the given (1-based) failed attempt.
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_secs(self.delay_secs.saturating_mul(u64::from(attempt)))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::max_attempts(),
            delay_secs: defaults::retry_delay(),
        }
    }
}

/// Scheduled mode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Wait between the end of one run and the next jitter wait
    #[serde(default = "defaults::interval_minutes")]
    pub interval_minutes: u64,

    /// Upper bound of the random delay added before every run
    #[serde(default = "defaults::max_jitter")]
    pub max_jitter_secs: u64,
}

impl ScheduleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_minutes: defaults::interval_minutes(),
            max_jitter_secs: defaults::max_jitter(),
        }
    }
}

/// Snapshot output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Snapshot file path
    #[serde(default = "defaults::output_path")]
    pub path: PathBuf,

    /// Number of feeds kept in the snapshot
    #[serde(default = "defaults::max_feeds")]
    pub max_feeds: usize,

    /// Optional file receiving the last fetched markup
    #[serde(default)]
    pub dump_html: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: defaults::output_path(),
            max_feeds: defaults::max_feeds(),
            dump_html: None,
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    use super::LinkPattern;

    // Source defaults
    pub fn page_url() -> String {
        "https://www.liveatc.net/topfeeds.php".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn stream_url_template() -> String {
        "http://d.liveatc.net/{feed_id}".into()
    }

    // Extract defaults
    pub fn table_selector() -> String {
        "table.topTable".into()
    }
    pub fn row_selector() -> String {
        "tr".into()
    }
    pub fn cell_selector() -> String {
        "td".into()
    }
    pub fn min_cells() -> usize {
        3
    }
    pub fn listener_column() -> usize {
        1
    }
    pub fn link_patterns() -> Vec<LinkPattern> {
        vec![
            LinkPattern::new("feedindex", r"feedindex\.php\?feed="),
            LinkPattern::new("play_mount", r"play\.php\?mount="),
            LinkPattern::new("icao", r"\?icao="),
        ]
    }
    pub fn id_params() -> Vec<String> {
        vec!["feed".into(), "mount".into(), "icao".into()]
    }
    pub fn link_keywords() -> Vec<String> {
        vec!["feed".into(), "mount".into()]
    }

    // Retry defaults
    pub fn max_attempts() -> u32 {
        3
    }
    pub fn retry_delay() -> u64 {
        10
    }

    // Schedule defaults
    pub fn interval_minutes() -> u64 {
        5
    }
    pub fn max_jitter() -> u64 {
        60
    }

    // Output defaults
    pub fn output_path() -> PathBuf {
        PathBuf::from("data/top_feeds.json")
    }
    pub fn max_feeds() -> usize {
        5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_template_without_placeholder() {
        let mut config = Config::default();
        config.source.stream_url_template = "http://d.liveatc.net/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_listener_column_outside_min_cells() {
        let mut config = Config::default();
        config.extract.listener_column = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_pattern_and_selector() {
        let mut config = Config::default();
        config.extract.link_patterns = vec![LinkPattern::new("broken", "feed=(")];
        assert!(matches!(config.validate(), Err(AppError::Pattern(_))));

        let mut config = Config::default();
        config.extract.row_selector = "[[invalid".to_string();
        assert!(matches!(config.validate(), Err(AppError::Selector { .. })));
    }

    #[test]
    fn validate_rejects_zero_attempts() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [schedule]
            interval_minutes = 30

            [output]
            path = "/tmp/feeds.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.schedule.interval_minutes, 30);
        assert_eq!(config.schedule.max_jitter_secs, 60);
        assert_eq!(config.output.path, PathBuf::from("/tmp/feeds.json"));
        assert_eq!(config.output.max_feeds, 5);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.extract.id_params, vec!["feed", "mount", "icao"]);
    }

    #[test]
    fn backoff_grows_linearly() {
        let retry = RetryConfig::default();
        assert_eq!(retry.backoff(1), Duration::from_secs(10));
        assert_eq!(retry.backoff(2), Duration::from_secs(20));
    }
}

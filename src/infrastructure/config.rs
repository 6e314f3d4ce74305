//! Configuration infrastructure
//!
//! Contains configuration loading for the storefront crawl.
//!
//! The built-in defaults are the contract: crawl `http://shirts4mike.com/shirts.php`,
//! write `data/<date>.csv`, log failures to `log/scraper-error.log`. An optional
//! JSON file in the working directory can override any subset of sections.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;
use url::Url;

use crate::infrastructure::http_client::HttpClientConfig;
use crate::infrastructure::parsing::SelectorSet;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub output: OutputConfig,
    pub crawling: CrawlingConfig,
    pub http: HttpClientConfig,
    pub selectors: SelectorSet,
    pub logging: LoggingConfig,
}

/// Storefront location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Origin every href and image path is resolved against
    pub base_url: String,

    /// Listing page path, relative to `base_url`
    pub listing_path: String,
}

impl SiteConfig {
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url).with_context(|| format!("Invalid base URL: {}", self.base_url))
    }

    pub fn listing_url(&self) -> Result<Url> {
        self.base_url()?
            .join(&self.listing_path)
            .with_context(|| format!("Invalid listing path: {}", self.listing_path))
    }
}

/// Artifact and failure log locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub data_dir: PathBuf,
    pub error_log_path: PathBuf,
}

/// When the artifact is rewritten during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPolicy {
    /// Rewrite after every successful record, and once more at the end
    AfterEachRecord,
    /// Write once, when every unit has resolved
    OnCompletion,
}

/// Crawling specific configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlingConfig {
    /// Maximum detail units in flight
    pub max_concurrent_details: usize,

    /// Drop repeated detail URLs, keeping the first occurrence
    pub dedupe_links: bool,

    pub export_policy: ExportPolicy,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable diagnostic file output
    pub file_output: bool,

    /// Directory for the diagnostic log file
    pub log_dir: PathBuf,

    /// Diagnostic log file name
    pub file_name: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::BASE_URL.to_string(),
            listing_path: defaults::LISTING_PATH.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(defaults::DATA_DIR),
            error_log_path: PathBuf::from(defaults::ERROR_LOG_PATH),
        }
    }
}

impl Default for CrawlingConfig {
    fn default() -> Self {
        Self {
            max_concurrent_details: defaults::MAX_CONCURRENT_DETAILS,
            dedupe_links: true,
            export_policy: ExportPolicy::AfterEachRecord,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: PathBuf::from(defaults::LOG_DIR),
            file_name: defaults::LOG_FILE_NAME.to_string(),
        }
    }
}

/// Configuration manager for loading settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Manager for the default config file in the working directory
    pub fn new() -> Self {
        Self::with_path(defaults::CONFIG_FILE_NAME)
    }

    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Whether a configuration file is present. An unreadable path is an error.
    pub async fn config_file_present(&self) -> Result<bool> {
        fs::try_exists(&self.config_path)
            .await
            .with_context(|| format!("Failed to check configuration file {:?}", self.config_path))
    }

    /// Load configuration from file, falling back to defaults when absent
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_file_present().await? {
            debug!("No configuration file at {:?}, using defaults", self.config_path);
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .with_context(|| format!("Failed to read configuration file {:?}", self.config_path))?;

        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file {:?}", self.config_path))?;

        config.validate()?;
        debug!("Loaded configuration from: {:?}", self.config_path);
        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    /// Reject settings that cannot drive a run
    pub fn validate(&self) -> Result<()> {
        self.site.listing_url()?;
        anyhow::ensure!(
            self.crawling.max_concurrent_details > 0,
            "crawling.max_concurrent_details must be greater than 0"
        );
        Ok(())
    }
}

/// Default configuration values
pub mod defaults {
    /// Storefront origin
    pub const BASE_URL: &str = "http://shirts4mike.com/";

    /// Listing page, relative to the origin
    pub const LISTING_PATH: &str = "shirts.php";

    /// Artifact directory
    pub const DATA_DIR: &str = "data";

    /// Append-only failure log
    pub const ERROR_LOG_PATH: &str = "log/scraper-error.log";

    /// Optional override file in the working directory
    pub const CONFIG_FILE_NAME: &str = "storefront-scraper.json";

    /// Default maximum concurrent detail fetches
    pub const MAX_CONCURRENT_DETAILS: usize = 4;

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    pub const USER_AGENT: &str = concat!("storefront-scraper/", env!("CARGO_PKG_VERSION"));

    // Log configuration defaults
    /// Default log level
    pub const LOG_LEVEL: &str = "info";

    /// Default JSON format setting
    pub const LOG_JSON_FORMAT: bool = false;

    /// Default console output setting
    pub const LOG_CONSOLE_OUTPUT: bool = true;

    /// Default file output setting
    pub const LOG_FILE_OUTPUT: bool = true;

    /// Diagnostic log directory (shared with the failure log)
    pub const LOG_DIR: &str = "log";

    /// Diagnostic log file name
    pub const LOG_FILE_NAME: &str = "scraper.log";
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_describe_the_fixed_contract() {
        let config = AppConfig::default();

        assert_eq!(config.site.listing_url().unwrap().as_str(), "http://shirts4mike.com/shirts.php");
        assert_eq!(config.output.data_dir, PathBuf::from("data"));
        assert_eq!(config.output.error_log_path, PathBuf::from("log/scraper-error.log"));
        assert_eq!(config.crawling.export_policy, ExportPolicy::AfterEachRecord);
        assert!(config.crawling.dedupe_links);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("absent.json"));

        let config = manager.load_config().await.unwrap();
        assert_eq!(config.site.base_url, defaults::BASE_URL);
    }

    #[tokio::test]
    async fn partial_file_overrides_only_given_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storefront-scraper.json");
        std::fs::write(
            &path,
            r#"{ "site": { "base_url": "http://localhost:8080/" }, "crawling": { "export_policy": "on_completion" } }"#,
        )
        .unwrap();

        let config = ConfigManager::with_path(&path).load_config().await.unwrap();
        assert_eq!(config.site.listing_url().unwrap().as_str(), "http://localhost:8080/shirts.php");
        assert_eq!(config.crawling.export_policy, ExportPolicy::OnCompletion);
        assert_eq!(config.crawling.max_concurrent_details, defaults::MAX_CONCURRENT_DETAILS);
    }

    #[tokio::test]
    async fn presence_check_reports_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storefront-scraper.json");
        let manager = ConfigManager::with_path(&path);

        assert!(!manager.config_file_present().await.unwrap());
        std::fs::write(&path, "{}").unwrap();
        assert!(manager.config_file_present().await.unwrap());
    }

    #[tokio::test]
    async fn uncheckable_path_is_an_error_not_defaults() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("config");
        std::fs::write(&blocker, "a file, not a directory").unwrap();

        let manager = ConfigManager::with_path(blocker.join("storefront-scraper.json"));
        assert!(manager.config_file_present().await.is_err());
        assert!(manager.load_config().await.is_err());
    }

    #[tokio::test]
    async fn zero_concurrency_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storefront-scraper.json");
        std::fs::write(&path, r#"{ "crawling": { "max_concurrent_details": 0 } }"#).unwrap();

        assert!(ConfigManager::with_path(&path).load_config().await.is_err());
    }
}

//! Infrastructure layer for network access, parsing, and file output
//!
//! This module provides the HTTP fetcher, HTML extraction, the CSV artifact
//! writer, the failure log, configuration, and diagnostic logging.

pub mod config; // Configuration loading and defaults
pub mod csv_export;
pub mod failure_log;
pub mod http_client;
pub mod logging; // Diagnostic tracing output
pub mod parsing;
pub mod scrape_error; // Classified pipeline errors

// Re-export commonly used items
pub use config::{AppConfig, ConfigManager, CrawlingConfig, ExportPolicy, LoggingConfig, OutputConfig, SiteConfig};
pub use csv_export::ExportWriter;
pub use failure_log::FailureLogger;
pub use http_client::{FetchedPage, HttpClient, HttpClientConfig, PageFetcher};
pub use logging::{init_logging_with_config, log_system_info};
pub use parsing::{DetailParser, ListingParser, SelectorSet};
pub use scrape_error::{
    CrawlFailure, ExportError, ExtractionError, LogError, ParsingError, RecordField, TransportError,
};

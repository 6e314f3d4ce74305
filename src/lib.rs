//! Storefront Scraper - crawls a product listing and exports a dated CSV
//!
//! One run fetches the storefront's listing page, visits every product detail
//! page it links to, and writes the extracted records to
//! `data/<YYYY-MM-DD>.csv`. Failures are appended to `log/scraper-error.log`.

// Module declarations
pub mod crawling;
pub mod domain;
pub mod infrastructure;

pub use crawling::{CrawlOrchestrator, RunOutcome, RunState, RunSummary};
pub use domain::Record;
pub use infrastructure::{AppConfig, ConfigManager, ExportPolicy};

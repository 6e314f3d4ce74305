//! Parsing context for HTML extraction

use chrono::{Local, NaiveTime};
use url::Url;

/// Context for parsing the listing page
#[derive(Debug, Clone)]
pub struct ListingParseContext {
    /// Listing URL, for diagnostics
    pub index_url: String,
}

impl ListingParseContext {
    pub fn new(index_url: impl Into<String>) -> Self {
        Self {
            index_url: index_url.into(),
        }
    }
}

/// Detail parsing context for product detail pages
#[derive(Debug, Clone)]
pub struct DetailParseContext {
    /// Detail page URL being parsed
    pub source_url: Url,

    /// Base origin for resolving relative resources
    pub base_url: Url,

    /// Time stamped on the resulting record
    pub extracted_at: NaiveTime,
}

impl DetailParseContext {
    /// Create new detail parse context stamped with the current local time
    pub fn new(source_url: Url, base_url: Url) -> Self {
        Self {
            source_url,
            base_url,
            extracted_at: Local::now().time(),
        }
    }

    /// Override the extraction time
    pub const fn with_extracted_at(mut self, extracted_at: NaiveTime) -> Self {
        self.extracted_at = extracted_at;
        self
    }
}

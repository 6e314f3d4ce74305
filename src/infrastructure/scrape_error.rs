//! Classified error types for the crawl-and-extract pipeline
//!
//! Every failure the pipeline can recover from is expressed here so the
//! failure log always receives the error value produced at the failure site.

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fetch failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Cannot connect to {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("HTTP request failed with status {status}: {url}")]
    HttpError { url: String, status: u16 },
}

impl TransportError {
    pub fn url(&self) -> &str {
        match self {
            Self::Unreachable { url, .. } | Self::HttpError { url, .. } => url,
        }
    }

    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::HttpError { status, .. } => Some(*status),
            Self::Unreachable { .. } => None,
        }
    }
}

/// Record fields that can fail extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordField {
    Image,
    Price,
    Title,
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Image => "image",
            Self::Price => "price",
            Self::Title => "title",
        };
        f.write_str(name)
    }
}

/// A detail page that could not be turned into a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Extraction failed for {source_url} (field: {field}): {reason}")]
pub struct ExtractionError {
    pub field: RecordField,
    pub source_url: String,
    pub reason: String,
}

impl ExtractionError {
    pub fn new(field: RecordField, source_url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field,
            source_url: source_url.into(),
            reason: reason.into(),
        }
    }
}

/// Artifact write failures
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] csv::Error),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to move {} into place: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The failure log itself could not be written. Not recoverable.
#[derive(Error, Debug)]
#[error("Failed to append to failure log {}: {source}", path.display())]
pub struct LogError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Selector set compilation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("Invalid CSS selector for {field}: '{selector}' - {reason}")]
    InvalidSelector {
        field: String,
        selector: String,
        reason: String,
    },

    #[error("No selectors configured for {field}")]
    EmptySelectorList { field: String },
}

pub type ParsingResult<T> = Result<T, ParsingError>;

/// A classified failure handed to the failure log
#[derive(Error, Debug)]
pub enum CrawlFailure {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Invalid product link '{href}': {reason}")]
    InvalidLink { href: String, reason: String },

    #[error("Detail task for {url} aborted: {reason}")]
    TaskAborted { url: String, reason: String },
}

impl CrawlFailure {
    /// Field tag for extraction failures
    pub const fn field(&self) -> Option<RecordField> {
        match self {
            Self::Extraction(e) => Some(e.field),
            _ => None,
        }
    }
}

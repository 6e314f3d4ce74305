//! HTML extraction for storefront listing and detail pages
//!
//! Extraction is driven by a configurable [`SelectorSet`] so the parsers are
//! independent of any single markup dialect. Every selector is an ordered
//! fallback list; the first selector that matches wins.

pub mod config;
pub mod context;
pub mod detail_parser;
pub mod listing_parser;

pub use config::{DetailSelectors, ListingSelectors, SelectorSet};
pub use context::{DetailParseContext, ListingParseContext};
pub use detail_parser::DetailParser;
pub use listing_parser::ListingParser;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::infrastructure::scrape_error::{ParsingError, ParsingResult};

/// Parser over an already-parsed document with contextual information
pub trait ContextualParser {
    type Output;
    type Context;
    type Error;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> Result<Self::Output, Self::Error>;
}

/// Compile a non-empty fallback list. Any invalid selector is an error.
pub(crate) fn compile_required(field: &str, selector_strings: &[String]) -> ParsingResult<Vec<Selector>> {
    if selector_strings.is_empty() {
        return Err(ParsingError::EmptySelectorList { field: field.to_string() });
    }
    compile_optional(field, selector_strings)
}

/// Compile a fallback list that may be empty
pub(crate) fn compile_optional(field: &str, selector_strings: &[String]) -> ParsingResult<Vec<Selector>> {
    let selectors = selector_strings
        .iter()
        .map(|selector_str| {
            Selector::parse(selector_str).map_err(|e| ParsingError::InvalidSelector {
                field: field.to_string(),
                selector: selector_str.clone(),
                reason: e.to_string(),
            })
        })
        .collect::<ParsingResult<Vec<_>>>()?;

    debug!("Compiled {} selector(s) for {}", selectors.len(), field);
    Ok(selectors)
}

/// First element under `scope` matched by the first selector that matches anything
pub(crate) fn select_first<'a>(scope: ElementRef<'a>, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|selector| scope.select(selector).next())
}

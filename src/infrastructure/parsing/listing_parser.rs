//! Listing page parser
//!
//! Turns the storefront's index page into the ordered sequence of detail
//! hrefs. Hrefs are returned verbatim; resolution and de-duplication are
//! left to the caller.

use std::convert::Infallible;

use scraper::{Html, Selector};
use tracing::{debug, warn};

use super::config::ListingSelectors;
use super::context::ListingParseContext;
use super::{ContextualParser, compile_required, select_first};
use crate::infrastructure::scrape_error::ParsingResult;

/// Parser for extracting detail links from the listing page
pub struct ListingParser {
    product_list_selectors: Vec<Selector>,
    entry_selectors: Vec<Selector>,
    link_selectors: Vec<Selector>,
}

impl ListingParser {
    /// Create a new listing parser with default selectors
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ListingSelectors::default())
    }

    /// Create parser with custom selector configuration
    pub fn with_config(selectors: &ListingSelectors) -> ParsingResult<Self> {
        Ok(Self {
            product_list_selectors: compile_required("listing.product_list", &selectors.product_list)?,
            entry_selectors: compile_required("listing.entry", &selectors.entry)?,
            link_selectors: compile_required("listing.link", &selectors.link)?,
        })
    }

    /// Extract detail hrefs from raw listing HTML, in document order
    pub fn extract_links(&self, index_html: &str, context: &ListingParseContext) -> Vec<String> {
        let html = Html::parse_document(index_html);
        let Ok(links) = self.parse_with_context(&html, context);
        links
    }
}

impl ContextualParser for ListingParser {
    type Output = Vec<String>;
    type Context = ListingParseContext;
    type Error = Infallible;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> Result<Self::Output, Self::Error> {
        let Some(container_selector) = self
            .product_list_selectors
            .iter()
            .find(|selector| html.select(selector).next().is_some())
        else {
            debug!("No product list container found on {}", context.index_url);
            return Ok(Vec::new());
        };

        let mut links = Vec::new();

        for container in html.select(container_selector) {
            let entries = self
                .entry_selectors
                .iter()
                .map(|selector| container.select(selector).collect::<Vec<_>>())
                .find(|entries| !entries.is_empty())
                .unwrap_or_default();

            for (index, entry) in entries.into_iter().enumerate() {
                match select_first(entry, &self.link_selectors).and_then(|a| a.value().attr("href")) {
                    Some(href) => links.push(href.to_string()),
                    None => warn!(
                        "Skipping list entry {} on {}: no anchor href",
                        index, context.index_url
                    ),
                }
            }
        }

        debug!("Extracted {} product link(s) from {}", links.len(), context.index_url);
        Ok(links)
    }
}

//! Selector configuration for HTML extraction
//!
//! Centralized CSS selectors binding the extractors to one storefront's markup.

use serde::{Deserialize, Serialize};

/// Complete selector set for listing and detail pages
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSet {
    pub listing: ListingSelectors,
    pub detail: DetailSelectors,
}

/// CSS selectors for the listing (index) page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSelectors {
    /// Product list container - multiple fallbacks
    pub product_list: Vec<String>,

    /// List entries, relative to the container
    pub entry: Vec<String>,

    /// Anchor carrying the detail href, relative to the entry
    pub link: Vec<String>,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            product_list: vec!["ul.products".to_string()],
            entry: vec!["li".to_string()],
            link: vec!["a[href]".to_string(), "a".to_string()],
        }
    }
}

/// CSS selectors for product detail pages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailSelectors {
    /// Product image inside the picture container
    pub image: Vec<String>,

    /// Price element inside the details container
    pub price: Vec<String>,

    /// Title heading
    pub title: Vec<String>,

    /// Annotation elements nested in the title (SKU codes etc.), excluded from the title text
    pub title_annotation: Vec<String>,

    /// Symbols of which exactly one is stripped from the front of the price text
    pub currency_symbols: Vec<char>,
}

impl Default for DetailSelectors {
    fn default() -> Self {
        Self {
            image: vec![".shirt-picture img".to_string()],
            price: vec![".shirt-details .price".to_string()],
            title: vec![".shirt-details h1".to_string()],
            title_annotation: vec!["span".to_string()],
            currency_symbols: vec!['$', '€', '£', '¥'],
        }
    }
}

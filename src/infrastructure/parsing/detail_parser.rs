//! Product detail parser
//!
//! Extracts one [`Record`] from a product detail page. Fields are checked in
//! the order image, price, title; the first failing field aborts extraction
//! for that page only and is reported as an [`ExtractionError`].

use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use super::config::DetailSelectors;
use super::context::DetailParseContext;
use super::{ContextualParser, compile_optional, compile_required, select_first};
use crate::domain::record::Record;
use crate::infrastructure::scrape_error::{ExtractionError, ParsingResult, RecordField};

/// Parser for extracting records from product detail pages
pub struct DetailParser {
    image_selectors: Vec<Selector>,
    price_selectors: Vec<Selector>,
    title_selectors: Vec<Selector>,
    title_annotation_selectors: Vec<Selector>,
    currency_symbols: Vec<char>,
}

impl DetailParser {
    /// Create a new detail parser with default configuration
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&DetailSelectors::default())
    }

    /// Create parser with custom selector configuration
    pub fn with_config(selectors: &DetailSelectors) -> ParsingResult<Self> {
        Ok(Self {
            image_selectors: compile_required("detail.image", &selectors.image)?,
            price_selectors: compile_required("detail.price", &selectors.price)?,
            title_selectors: compile_required("detail.title", &selectors.title)?,
            title_annotation_selectors: compile_optional("detail.title_annotation", &selectors.title_annotation)?,
            currency_symbols: selectors.currency_symbols.clone(),
        })
    }

    /// Parse raw detail HTML into a record
    pub fn extract_record(&self, detail_html: &str, context: &DetailParseContext) -> Result<Record, ExtractionError> {
        let html = Html::parse_document(detail_html);
        self.parse_with_context(&html, context)
    }
}

impl ContextualParser for DetailParser {
    type Output = Record;
    type Context = DetailParseContext;
    type Error = ExtractionError;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> Result<Self::Output, Self::Error> {
        debug!("Parsing product detail from: {}", context.source_url);
        let root = html.root_element();
        let fail = |field, reason: String| ExtractionError::new(field, context.source_url.as_str(), reason);

        let image_src = select_first(root, &self.image_selectors)
            .and_then(|img| img.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .ok_or_else(|| fail(RecordField::Image, "image element or src attribute not found".to_string()))?;

        let price_text = select_first(root, &self.price_selectors)
            .map(|el| el.text().collect::<String>())
            .ok_or_else(|| fail(RecordField::Price, "price element not found".to_string()))?;
        let price = parse_price(&price_text, &self.currency_symbols).map_err(|reason| fail(RecordField::Price, reason))?;

        let heading = select_first(root, &self.title_selectors)
            .ok_or_else(|| fail(RecordField::Title, "title heading not found".to_string()))?;
        let title = heading_text(heading, &self.title_annotation_selectors);
        if title.is_empty() {
            return Err(fail(RecordField::Title, "title is empty".to_string()));
        }

        let image_url = context
            .base_url
            .join(image_src)
            .map_err(|e| fail(RecordField::Image, format!("cannot resolve '{image_src}': {e}")))?;

        Ok(Record::new(
            title,
            price,
            image_url.as_str(),
            context.source_url.as_str(),
            context.extracted_at,
        ))
    }
}

/// Parse a currency-prefixed price, stripping at most one leading symbol
pub fn parse_price(raw: &str, currency_symbols: &[char]) -> Result<f64, String> {
    let text = raw.trim();
    let mut chars = text.chars();
    let amount = match chars.next() {
        Some(symbol) if currency_symbols.contains(&symbol) => chars.as_str().trim(),
        _ => text,
    };

    if amount.is_empty() {
        return Err(format!("no amount in price text '{text}'"));
    }
    if !is_plain_decimal(amount) {
        return Err(format!("'{amount}' is not a plain decimal amount"));
    }

    let value: f64 = amount
        .parse()
        .map_err(|e| format!("'{amount}' is not a number: {e}"))?;

    if !value.is_finite() {
        return Err(format!("price {value} is out of range"));
    }

    Ok(value)
}

/// Digits with at most one decimal point. No sign, no exponent.
fn is_plain_decimal(amount: &str) -> bool {
    let mut parts = amount.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next().unwrap_or_default();

    (!whole.is_empty() || !fraction.is_empty())
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.bytes().all(|b| b.is_ascii_digit())
}

/// Trimmed text of the heading, skipping text nested in annotation elements
fn heading_text(heading: ElementRef<'_>, annotations: &[Selector]) -> String {
    let excluded: Vec<_> = annotations
        .iter()
        .flat_map(|selector| heading.select(selector))
        .map(|el| el.id())
        .collect();

    heading
        .descendants()
        .filter(|node| !node.ancestors().any(|ancestor| excluded.contains(&ancestor.id())))
        .filter_map(|node| node.value().as_text().map(|text| &**text))
        .collect::<String>()
        .trim()
        .to_string()
}

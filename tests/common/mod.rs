//! Shared fixtures for integration tests: an in-memory page source and
//! storefront HTML builders.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use storefront_scraper::AppConfig;
use storefront_scraper::infrastructure::{FetchedPage, PageFetcher, TransportError};
use url::Url;

pub const BASE_URL: &str = "http://shop.test/";
pub const LISTING_URL: &str = "http://shop.test/shirts.php";

/// What the fake returns for a URL
#[derive(Debug, Clone)]
pub enum Response {
    Page(String),
    Status(u16),
    Unreachable,
    Panic,
}

/// In-memory `PageFetcher`. Unknown URLs answer 404.
#[derive(Default)]
pub struct StaticFetcher {
    responses: HashMap<String, Response>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.responses.insert(url.to_string(), Response::Page(body.into()));
        self
    }

    pub fn respond(mut self, url: &str, response: Response) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    /// URLs requested so far, in request order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, TransportError> {
        self.requests.lock().unwrap().push(url.to_string());

        match self.responses.get(url.as_str()).cloned().unwrap_or(Response::Status(404)) {
            Response::Page(body) => Ok(FetchedPage { status: 200, body }),
            Response::Status(status) => Err(TransportError::HttpError {
                url: url.to_string(),
                status,
            }),
            Response::Unreachable => Err(TransportError::Unreachable {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            }),
            Response::Panic => panic!("fetcher exploded on {url}"),
        }
    }
}

/// Default configuration pointed at the fake origin and a scratch directory
pub fn config_in(dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.site.base_url = BASE_URL.to_string();
    config.output.data_dir = dir.join("data");
    config.output.error_log_path = dir.join("log").join("scraper-error.log");
    config
}

pub fn run_moment() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 7)
        .unwrap()
        .and_hms_opt(9, 5, 3)
        .unwrap()
}

pub fn run_date() -> NaiveDate {
    run_moment().date()
}

/// Listing page with one product entry per href
pub fn listing_html(hrefs: &[&str]) -> String {
    let items: String = hrefs
        .iter()
        .map(|href| format!(r#"<li><a href="{href}"><img src="img/shirts/x.jpg" alt="Shirt"><p>View Details</p></a></li>"#))
        .collect();
    format!(
        r#"<!DOCTYPE html><html><head><title>Shirts</title></head><body>
        <div class="header"><ul class="nav"><li><a href="contact.php">Contact</a></li></ul></div>
        <div class="section shirts page"><div class="wrapper"><h1>Mike's Full Catalog of Shirts</h1>
        <ul class="products">{items}</ul></div></div></body></html>"#
    )
}

/// Detail page; `None` omits the corresponding element
pub fn detail_html(image: Option<&str>, price: Option<&str>, title: Option<&str>) -> String {
    let picture = image.map(|src| format!(r#"<span><img src="{src}" alt="shirt"></span>"#)).unwrap_or_default();
    let price = price.map(|p| format!(r#"<span class="price">{p}</span>"#)).unwrap_or_default();
    let heading = title.map(|t| format!("<h1>{price} {t}</h1>")).unwrap_or(price);
    format!(
        r#"<!DOCTYPE html><html><body><div class="section page"><div class="wrapper">
        <div class="breadcrumb"><a href="shirts.php">Shirts</a></div>
        <div class="shirt-picture">{picture}</div>
        <div class="shirt-details">{heading}<p class="note-designer">* All shirts are designed by Mike.</p></div>
        </div></div></body></html>"#
    )
}

pub fn shirt(id: u32, title: &str, price: &str) -> String {
    detail_html(Some(&format!("img/shirts/shirt-{id}.jpg")), Some(price), Some(title))
}

pub fn detail_url(id: u32) -> String {
    format!("{BASE_URL}shirt.php?id={id}")
}

pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .map(|content| content.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

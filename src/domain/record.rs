use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Column order of the exported artifact.
pub const EXPORT_COLUMNS: [&str; 5] = ["Title", "Price", "ImageURL", "URL", "Time"];

/// Normalized product record extracted from one detail page
///
/// Records are immutable once built: fields are private and only exposed
/// through getters. Serialization field names match [`EXPORT_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Price")]
    price: f64,
    #[serde(rename = "ImageURL")]
    image_url: String,
    #[serde(rename = "URL")]
    source_url: String,
    #[serde(rename = "Time", with = "time_of_day")]
    extracted_at: NaiveTime,
}

impl Record {
    /// Build a record. `extracted_at` is truncated to whole seconds.
    pub fn new(
        title: impl Into<String>,
        price: f64,
        image_url: impl Into<String>,
        source_url: impl Into<String>,
        extracted_at: NaiveTime,
    ) -> Self {
        Self {
            title: title.into(),
            price,
            image_url: image_url.into(),
            source_url: source_url.into(),
            extracted_at: extracted_at.with_nanosecond(0).unwrap_or(extracted_at),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub const fn price(&self) -> f64 {
        self.price
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub const fn extracted_at(&self) -> NaiveTime {
        self.extracted_at
    }
}

/// Format a time of day as zero-padded `HH:MM:SS`
pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format(time_of_day::FORMAT).to_string()
}

mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M:%S";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

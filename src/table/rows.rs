use super::{Cell, Row};
use crate::models::prediction::PriceBar;
use chrono::{DateTime, NaiveDate};

/// `{Metric, Value, Description?}` row shared by the raw, technical and
/// fundamental tables. `value` is already formatted for display.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub metric: String,
    pub value: String,
    pub description: Option<String>,
}

impl MetricRow {
    pub fn new(metric: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            value: value.into(),
            description: None,
        }
    }

    pub fn with_description(
        metric: impl Into<String>,
        value: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::new(metric, value)
        }
    }
}

impl Row for MetricRow {
    fn keys(&self) -> &'static [&'static str] {
        &["Metric", "Value", "Description"]
    }

    fn cell(&self, key: &str) -> Cell<'_> {
        match key {
            "Metric" => Cell::Text(&self.metric),
            "Value" => Cell::Text(&self.value),
            "Description" => self.description.as_deref().into(),
            _ => Cell::Missing,
        }
    }
}

/// Daily price bar with the date normalised to ISO so it sorts chronologically.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub date: Option<String>,
    pub close: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<f64>,
}

/// "Mon, 01 Apr 2024 00:00:00 GMT" | "2024-04-01T00:00:00" | "2024-04-01" → "2024-04-01".
/// Unrecognised strings pass through untouched.
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return dt.date_naive().to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive().to_string();
    }
    if let Some(prefix) = raw.get(..10) {
        if let Ok(d) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return d.to_string();
        }
    }
    raw.to_string()
}

impl From<&PriceBar> for HistoryRow {
    fn from(bar: &PriceBar) -> Self {
        Self {
            date: bar.date.as_deref().map(normalize_date),
            close: bar.close,
            high: bar.high,
            low: bar.low,
            volume: bar.volume,
        }
    }
}

impl Row for HistoryRow {
    fn keys(&self) -> &'static [&'static str] {
        &["Date", "Close", "High", "Low", "Volume"]
    }

    fn cell(&self, key: &str) -> Cell<'_> {
        match key {
            "Date" => self.date.as_deref().into(),
            "Close" => self.close.into(),
            "High" => self.high.into(),
            "Low" => self.low.into(),
            "Volume" => self.volume.into(),
            _ => Cell::Missing,
        }
    }
}

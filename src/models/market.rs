//! Market-trend tables. Both endpoints return a positional list of tables
//! scraped upstream; the column names are whatever the source page used.

use super::{lenient_string, maybe_f64};
use serde::Deserialize;

/// Row of an Indian exchange table (NSE/BSE most active, Nifty/Sensex movers).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct IndianMarketRow {
    #[serde(default, rename = "Company", deserialize_with = "lenient_string")]
    pub company: Option<String>,
    #[serde(default, rename = "Price", deserialize_with = "maybe_f64")]
    pub price: Option<f64>,
    #[serde(default, rename = "Change", deserialize_with = "maybe_f64")]
    pub change: Option<f64>,
    #[serde(default, rename = "Value  (Rs Cr.)", deserialize_with = "maybe_f64")]
    pub value_cr: Option<f64>,
    #[serde(default, rename = "%Gain", deserialize_with = "maybe_f64")]
    pub gain_pct: Option<f64>,
    #[serde(default, rename = "%Loss", deserialize_with = "maybe_f64")]
    pub loss_pct: Option<f64>,
}

/// Row of a US movers table.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct UsMarketRow {
    /// Display name; the upstream table leaves this column unnamed.
    #[serde(default, rename = "Unnamed: 1", deserialize_with = "lenient_string")]
    pub company: Option<String>,
    /// Ticker symbol.
    #[serde(default, rename = "Name", deserialize_with = "lenient_string")]
    pub symbol: Option<String>,
    #[serde(default, rename = "Price", deserialize_with = "maybe_f64")]
    pub price: Option<f64>,
    #[serde(default, rename = "Change", deserialize_with = "maybe_f64")]
    pub change: Option<f64>,
    #[serde(default, rename = "Change%", deserialize_with = "maybe_f64")]
    pub change_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsMarketData {
    pub gainers: Vec<UsMarketRow>,
    pub losers: Vec<UsMarketRow>,
}

impl UsMarketData {
    /// `[gainers, losers]`; missing tables are empty.
    pub fn from_tables(tables: Vec<Vec<UsMarketRow>>) -> Self {
        let mut it = tables.into_iter();
        Self {
            gainers: it.next().unwrap_or_default(),
            losers: it.next().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndianMarketData {
    pub most_active_nse: Vec<IndianMarketRow>,
    pub most_active_bse: Vec<IndianMarketRow>,
    pub gainers_nifty: Vec<IndianMarketRow>,
    pub gainers_sensex: Vec<IndianMarketRow>,
    pub losers_nifty: Vec<IndianMarketRow>,
    pub losers_sensex: Vec<IndianMarketRow>,
}

impl IndianMarketData {
    /// `[mostActiveNSE, mostActiveBSE, gainersNifty, gainersSensex, losersNifty, losersSensex]`.
    pub fn from_tables(tables: Vec<Vec<IndianMarketRow>>) -> Self {
        let mut it = tables.into_iter();
        let mut next = || it.next().unwrap_or_default();
        Self {
            most_active_nse: next(),
            most_active_bse: next(),
            gainers_nifty: next(),
            gainers_sensex: next(),
            losers_nifty: next(),
            losers_sensex: next(),
        }
    }
}

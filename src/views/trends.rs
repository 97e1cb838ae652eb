//! Market trends: Indian most-active and movers, US gainers and losers.

use crate::api::{ApiError, Backend};
use crate::models::market::{IndianMarketRow, UsMarketRow};
use crate::models::{IndianMarketData, UsMarketData};
use crate::table::{SortState, write_table};
use crate::utils::{fmt_signed, rule};
use clap::ValueEnum;
use std::fmt::{self, Write};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MostActiveIndex {
    #[default]
    Nse,
    Bse,
}

impl MostActiveIndex {
    pub fn label(&self) -> &'static str {
        match self {
            MostActiveIndex::Nse => "NSE",
            MostActiveIndex::Bse => "BSE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MoversIndex {
    #[default]
    Nifty,
    Sensex,
}

impl MoversIndex {
    pub fn label(&self) -> &'static str {
        match self {
            MoversIndex::Nifty => "Nifty",
            MoversIndex::Sensex => "Sensex",
        }
    }
}

fn num(v: Option<f64>) -> String {
    v.map(|x| format!("{:.2}", x)).unwrap_or_else(|| "N/A".into())
}

fn signed(v: Option<f64>) -> String {
    v.map(fmt_signed).unwrap_or_else(|| "N/A".into())
}

fn money(symbol: &str, v: Option<f64>) -> String {
    v.map(|x| format!("{}{:.2}", symbol, x)).unwrap_or_else(|| "N/A".into())
}

fn company(row: &IndianMarketRow) -> String {
    row.company.clone().unwrap_or_default()
}

#[derive(Debug, Default)]
pub struct TrendsPage {
    pub us: UsMarketData,
    pub india: IndianMarketData,
    pub most_active: MostActiveIndex,
    pub gainers: MoversIndex,
    pub losers: MoversIndex,
    pub error: Option<String>,
}

impl TrendsPage {
    /// US first, then India. A failure stops the sequence and keeps
    /// whatever was loaded before.
    pub async fn load<B: Backend + ?Sized>(&mut self, backend: &B) -> Result<(), ApiError> {
        self.error = None;

        let us = backend.market_us().await.inspect_err(|e| {
            error!("US market data: {}", e);
            self.error = Some("Failed to fetch US market data".into());
        })?;
        self.us = us;

        let india = backend.market_in().await.inspect_err(|e| {
            error!("Indian market data: {}", e);
            self.error = Some("Failed to fetch Indian market data".into());
        })?;
        self.india = india;

        info!(
            "Market data: {} US gainers, {} NSE most active",
            self.us.gainers.len(),
            self.india.most_active_nse.len()
        );
        Ok(())
    }

    pub fn most_active_rows(&self) -> &[IndianMarketRow] {
        match self.most_active {
            MostActiveIndex::Nse => &self.india.most_active_nse,
            MostActiveIndex::Bse => &self.india.most_active_bse,
        }
    }

    pub fn gainer_rows(&self) -> &[IndianMarketRow] {
        match self.gainers {
            MoversIndex::Nifty => &self.india.gainers_nifty,
            MoversIndex::Sensex => &self.india.gainers_sensex,
        }
    }

    pub fn loser_rows(&self) -> &[IndianMarketRow] {
        match self.losers {
            MoversIndex::Nifty => &self.india.losers_nifty,
            MoversIndex::Sensex => &self.india.losers_sensex,
        }
    }

    pub fn render(&self, out: &mut impl Write) -> fmt::Result {
        if let Some(err) = &self.error {
            writeln!(out, "! {}", err)?;
        }
        let unsorted = SortState::default();

        writeln!(out, "{}", rule())?;
        writeln!(out, "  Most Active Stocks ({})", self.most_active.label())?;
        let cells: Vec<Vec<String>> = self
            .most_active_rows()
            .iter()
            .map(|r| vec![company(r), money("₹", r.price), signed(r.change), money("₹", r.value_cr)])
            .collect();
        write_table(out, &["Company", "Price", "Change (₹)", "Value (Cr.)"], &unsorted, &cells)?;

        writeln!(out, "\n  Top Gainers ({})", self.gainers.label())?;
        let cells: Vec<Vec<String>> = self
            .gainer_rows()
            .iter()
            .map(|r| {
                vec![
                    company(r),
                    money("₹", r.price),
                    signed(r.change),
                    r.gain_pct.map(|g| format!("{}%", fmt_signed(g))).unwrap_or_else(|| "N/A".into()),
                ]
            })
            .collect();
        write_table(out, &["Company", "Price", "Change (₹)", "Gain (%)"], &unsorted, &cells)?;

        writeln!(out, "\n  Top Losers ({})", self.losers.label())?;
        let cells: Vec<Vec<String>> = self
            .loser_rows()
            .iter()
            .map(|r| {
                vec![
                    company(r),
                    money("₹", r.price),
                    num(r.change),
                    r.loss_pct.map(|l| format!("{:.2}%", l)).unwrap_or_else(|| "N/A".into()),
                ]
            })
            .collect();
        write_table(out, &["Company", "Price", "Change (₹)", "Loss (%)"], &unsorted, &cells)?;

        let us_cells = |rows: &[UsMarketRow], signed_cols: bool| -> Vec<Vec<String>> {
            rows.iter()
                .map(|r| {
                    let (change, pct) = if signed_cols {
                        (signed(r.change), r.change_pct.map(fmt_signed))
                    } else {
                        (num(r.change), r.change_pct.map(|p| format!("{:.2}", p)))
                    };
                    vec![
                        r.company.clone().unwrap_or_default(),
                        r.symbol.clone().unwrap_or_default(),
                        money("$", r.price),
                        change,
                        pct.map(|p| format!("{}%", p)).unwrap_or_else(|| "N/A".into()),
                    ]
                })
                .collect()
        };
        let us_headers = ["Company", "Symbol", "Price", "Change ($)", "Change (%)"];

        writeln!(out, "\n  US Top Gainers")?;
        write_table(out, &us_headers, &unsorted, &us_cells(&self.us.gainers, true))?;
        writeln!(out, "\n  US Top Losers")?;
        write_table(out, &us_headers, &unsorted, &us_cells(&self.us.losers, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockBackend;

    fn row(name: &str, change: f64) -> IndianMarketRow {
        IndianMarketRow {
            company: Some(name.into()),
            price: Some(100.0),
            change: Some(change),
            gain_pct: Some(change),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_index_selectors() {
        let backend = MockBackend::default();
        *backend.market_in.lock().unwrap() = IndianMarketData {
            most_active_nse: vec![row("Reliance", 1.0)],
            most_active_bse: vec![row("HDFC Bank", 2.0)],
            gainers_sensex: vec![row("TCS", 3.5)],
            ..Default::default()
        };

        let mut page = TrendsPage::default();
        page.load(&backend).await.unwrap();
        assert_eq!(backend.calls(), ["GET /market-data-us", "GET /market-data-in"]);
        assert_eq!(page.most_active_rows()[0].company.as_deref(), Some("Reliance"));

        page.most_active = MostActiveIndex::Bse;
        page.gainers = MoversIndex::Sensex;
        assert_eq!(page.most_active_rows()[0].company.as_deref(), Some("HDFC Bank"));
        assert_eq!(page.gainer_rows().len(), 1);
        assert!(page.loser_rows().is_empty());

        let mut out = String::new();
        page.render(&mut out).unwrap();
        assert!(out.contains("Most Active Stocks (BSE)"));
        assert!(out.contains("+3.50%"));
        assert!(out.contains("No data available"));
    }

    #[tokio::test]
    async fn test_us_failure_skips_india() {
        let backend = MockBackend::default();
        backend.fail_with(503);
        let mut page = TrendsPage::default();
        assert!(page.load(&backend).await.is_err());
        assert_eq!(page.error.as_deref(), Some("Failed to fetch US market data"));
        assert_eq!(backend.calls(), ["GET /market-data-us"]);
    }

    #[test]
    fn test_signed_rendering() {
        assert_eq!(signed(Some(1.5)), "+1.50");
        assert_eq!(signed(Some(-0.25)), "-0.25");
        assert_eq!(signed(None), "N/A");
    }
}

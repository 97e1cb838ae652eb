//! AI stock prediction page.

use crate::api::{ApiError, Backend};
use crate::models::PredictResponse;
use crate::table::{self, HistoryRow, MetricRow, Row, SortState};
use crate::utils::rule;
use std::fmt::{self, Write};
use tracing::{error, info};

pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

const NA: &str = "N/A";

// ── Formatters ───────────────────────────────────────────────────────────────

pub fn format_number(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", decimals, v),
        _ => NA.to_string(),
    }
}

/// Ratio → percent: 0.152 → "15.2%".
pub fn format_percentage(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}%", decimals, v * 100.0),
        _ => NA.to_string(),
    }
}

pub fn format_large_number(value: Option<f64>, currency_symbol: &str) -> String {
    match value {
        Some(v) if v.is_finite() && v >= 1e9 => format!("{}{:.2}B", currency_symbol, v / 1e9),
        Some(v) if v.is_finite() && v >= 1e6 => format!("{}{:.2}M", currency_symbol, v / 1e6),
        Some(v) if v.is_finite() => format!("{}{:.2}", currency_symbol, v),
        _ => NA.to_string(),
    }
}

fn or_fallback(text: &Option<String>, fallback: &str) -> String {
    match text.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => fallback.to_string(),
    }
}

// ── Verdict badge ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictBadge {
    Buy,
    Sell,
    HoldOrSkip,
    Unknown,
}

impl VerdictBadge {
    /// First match wins, so "Buy / Hold" is a buy.
    pub fn classify(verdict: Option<&str>) -> Self {
        let Some(v) = verdict.map(str::to_lowercase) else {
            return VerdictBadge::Unknown;
        };
        if v.contains("buy") {
            VerdictBadge::Buy
        } else if v.contains("sell") {
            VerdictBadge::Sell
        } else if v.contains("hold") || v.contains("skip") {
            VerdictBadge::HoldOrSkip
        } else {
            VerdictBadge::Unknown
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            VerdictBadge::Buy => "[+]",
            VerdictBadge::Sell => "[-]",
            VerdictBadge::HoldOrSkip => "[=]",
            VerdictBadge::Unknown => "[?]",
        }
    }
}

// ── Report ───────────────────────────────────────────────────────────────────

/// A `/predict` response with its display tables precomputed.
#[derive(Debug, Clone)]
pub struct StockReport {
    pub response: PredictResponse,
    pub currency_symbol: String,
    pub raw: Vec<MetricRow>,
    pub technical: Vec<MetricRow>,
    pub fundamental: Vec<MetricRow>,
    pub history: Vec<HistoryRow>,
}

impl StockReport {
    pub fn from_response(response: PredictResponse, history_rows: usize) -> Self {
        let sym = response
            .result
            .currency_symbol
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string());
        let raw_data = &response.raw_data;
        let overview = &response.result.fundamental_overview;

        let (raw, fundamental, history) = match &raw_data.stock_data {
            Some(d) => {
                let raw = vec![
                    MetricRow::new("Market Cap", format_large_number(d.market_cap, &sym)),
                    MetricRow::new("Revenue", format_large_number(d.revenue, &sym)),
                    MetricRow::new("P/E Ratio", format_number(d.pe_ratio, 2)),
                    MetricRow::new("EPS", format!("{}{}", sym, format_number(d.eps, 2))),
                    MetricRow::new("Dividend Yield", format!("{}%", format_number(d.div_yield, 2))),
                    MetricRow::new("Revenue Growth", format_percentage(d.revenue_growth, 1)),
                    MetricRow::new("Debt-to-Equity", format_number(d.de_ratio, 3)),
                    MetricRow::new("ROE", format_percentage(d.roe, 2)),
                ];
                let fundamental = vec![
                    MetricRow::with_description(
                        "P/E Ratio",
                        format_number(d.pe_ratio, 2),
                        or_fallback(&overview.valuation, "No valuation available"),
                    ),
                    MetricRow::with_description(
                        "EPS",
                        format!("{}{}", sym, format_number(d.eps, 2)),
                        or_fallback(&overview.summary, "No summary available"),
                    ),
                    MetricRow::with_description(
                        "Dividend Yield",
                        format!("{}%", format_number(d.div_yield, 2)),
                        or_fallback(&overview.dividends, "No dividend data available"),
                    ),
                    MetricRow::with_description(
                        "Revenue Growth",
                        format_percentage(d.revenue_growth, 1),
                        or_fallback(&overview.growth, "No growth data available"),
                    ),
                    MetricRow::with_description(
                        "Debt-to-Equity Ratio",
                        format_number(d.de_ratio, 3),
                        or_fallback(&overview.leverage, "No leverage data available"),
                    ),
                    MetricRow::with_description(
                        "ROE",
                        format_percentage(d.roe, 2),
                        or_fallback(&overview.roe_analysis, "No ROE analysis available"),
                    ),
                ];
                let history = d.history.iter().take(history_rows).map(HistoryRow::from).collect();
                (raw, fundamental, history)
            }
            None => (Vec::new(), Vec::new(), Vec::new()),
        };

        let technical = match &raw_data.technical_analysis {
            Some(t) => vec![
                MetricRow::new("Current Price", format!("{}{}", sym, format_number(t.current_price, 2))),
                MetricRow::new("RSI", format_number(t.rsi, 1)),
                MetricRow::new("MACD", format_number(t.macd, 2)),
                MetricRow::new("Momentum", format_number(t.momentum, 2)),
                MetricRow::new("5-Day SMA", format!("{}{}", sym, format_number(t.sma_5, 2))),
                MetricRow::new("10-Day SMA", format!("{}{}", sym, format_number(t.sma_10, 2))),
                MetricRow::new("Volatility", format_number(t.volatility, 2)),
                MetricRow::new("Price Trend", format_number(t.price_trend, 2)),
                MetricRow::new("Signal", format_number(t.signal, 2)),
                MetricRow::new("Volume Trend", t.volume_trend.clone().unwrap_or_else(|| NA.to_string())),
            ],
            None => Vec::new(),
        };

        Self {
            currency_symbol: sym,
            raw,
            technical,
            fundamental,
            history,
            response,
        }
    }

    pub fn verdict(&self) -> VerdictBadge {
        VerdictBadge::classify(self.response.result.investment_outlook.verdict.as_deref())
    }
}

// ── Page state ───────────────────────────────────────────────────────────────

/// One sort state drives every table on the page; each table has its own filter.
#[derive(Debug, Default)]
pub struct StockPage {
    pub sort: SortState,
    pub raw_filter: String,
    pub technical_filter: String,
    pub fundamental_filter: String,
    pub history_rows: usize,
    report: Option<StockReport>,
    pub error: Option<String>,
}

impl StockPage {
    pub fn new(history_rows: usize) -> Self {
        Self {
            history_rows,
            ..Self::default()
        }
    }

    /// The previous report is cleared before the request goes out, so a
    /// failure leaves the page empty with just the error.
    pub async fn load<B: Backend + ?Sized>(&mut self, backend: &B, company: &str) -> Result<(), ApiError> {
        let company = company.trim();
        if company.is_empty() {
            let err = ApiError::validation("Please enter a valid company name.");
            self.error = Some(err.to_string());
            return Err(err);
        }

        self.error = None;
        self.report = None;
        match backend.predict(company).await {
            Ok(resp) => {
                let report = StockReport::from_response(resp, self.history_rows);
                info!(
                    "Prediction for {}: {}",
                    company,
                    report.response.result.investment_outlook.verdict.as_deref().unwrap_or(NA)
                );
                self.report = Some(report);
                Ok(())
            }
            Err(e) => {
                error!("Error fetching prediction for {}: {}", company, e);
                self.error = Some("Failed to fetch stock info.".to_string());
                Err(e)
            }
        }
    }

    pub fn toggle_sort(&mut self, key: &str) {
        self.sort.toggle(key);
    }

    // ── Rendering ────────────────────────────────────────────────────────────

    fn metric_cells(&self, rows: &[MetricRow], query: &str, sym: &str, columns: usize) -> Vec<Vec<String>> {
        table::view(rows, &self.sort, query, sym)
            .into_iter()
            .map(|r| {
                r.keys()
                    .iter()
                    .take(columns)
                    .map(|k| r.cell(k).text().unwrap_or_default())
                    .collect()
            })
            .collect()
    }

    fn history_cells(&self, rows: &[HistoryRow], sym: &str) -> Vec<Vec<String>> {
        table::view(rows, &self.sort, "", sym)
            .into_iter()
            .map(|r| {
                vec![
                    r.date.clone().unwrap_or_else(|| NA.to_string()),
                    format!("{}{}", sym, format_number(r.close, 2)),
                    format!("{}{}", sym, format_number(r.high, 2)),
                    format!("{}{}", sym, format_number(r.low, 2)),
                    r.volume.map(|v| format!("{:.0}", v)).unwrap_or_else(|| NA.to_string()),
                ]
            })
            .collect()
    }

    pub fn render(&self, out: &mut impl Write) -> fmt::Result {
        if let Some(err) = &self.error {
            writeln!(out, "! {}", err)?;
        }
        let Some(report) = &self.report else {
            return Ok(());
        };
        let result = &report.response.result;
        let raw_data = &report.response.raw_data;
        let sym = report.currency_symbol.as_str();

        let name = result
            .stock_name
            .as_deref()
            .or(raw_data.stock_name.as_deref())
            .unwrap_or("Unknown stock");
        writeln!(out, "{}", rule())?;
        match result.currency.as_deref().or(raw_data.currency.as_deref()) {
            Some(currency) => writeln!(out, "  {} ({})", name, currency)?,
            None => writeln!(out, "  {}", name)?,
        }
        writeln!(
            out,
            "  Verdict: {} {}",
            report.verdict().marker(),
            result.investment_outlook.verdict.as_deref().unwrap_or("No verdict available")
        )?;
        writeln!(out, "{}", rule())?;

        writeln!(out, "\nRaw Data")?;
        table::write_table(out, &["Metric", "Value"], &self.sort, &self.metric_cells(&report.raw, &self.raw_filter, sym, 2))?;

        writeln!(out, "\nTechnical Analysis")?;
        table::write_table(
            out,
            &["Metric", "Value"],
            &self.sort,
            &self.metric_cells(&report.technical, &self.technical_filter, sym, 2),
        )?;
        let tech = &result.technical_overview;
        for (label, text, fallback) in [
            ("Summary", &tech.summary, "No summary available"),
            ("RSI Analysis", &tech.rsi_analysis, "No RSI analysis available"),
            ("MACD Analysis", &tech.macd_analysis, "No MACD analysis available"),
            ("Momentum Analysis", &tech.momentum_analysis, "No momentum analysis available"),
            ("SMA Analysis", &tech.sma_analysis, "No SMA analysis available"),
            ("Price/Volume Trend", &tech.price_volume_trend, "No price/volume trend available"),
            ("Volatility Analysis", &tech.volatility_analysis, "No volatility analysis available"),
        ] {
            writeln!(out, "  {}: {}", label, or_fallback(text, fallback))?;
        }
        let tech_verdict = raw_data.technical_analysis.as_ref().and_then(|t| t.verdict.as_deref());
        writeln!(out, "  Verdict: {} {}", VerdictBadge::classify(tech_verdict).marker(), tech_verdict.unwrap_or(NA))?;

        writeln!(out, "\nFundamental Analysis")?;
        table::write_table(
            out,
            &["Metric", "Value", "Description"],
            &self.sort,
            &self.metric_cells(&report.fundamental, &self.fundamental_filter, sym, 3),
        )?;
        writeln!(
            out,
            "  Summary: {}",
            or_fallback(&result.fundamental_overview.summary, "No summary available")
        )?;
        let fund_verdict = raw_data.fundamental_analysis.as_ref().and_then(|f| f.verdict.as_deref());
        writeln!(out, "  Verdict: {} {}", VerdictBadge::classify(fund_verdict).marker(), fund_verdict.unwrap_or(NA))?;

        let sentiment = &result.sentiment_analysis;
        writeln!(out, "\nSentiment Analysis")?;
        writeln!(out, "  {}", or_fallback(&sentiment.summary, "No sentiment summary available"))?;
        for (label, items, empty) in [
            ("Positive", &sentiment.positive_news, "No positive news available"),
            ("Neutral", &sentiment.neutral_news, "No neutral news available"),
            ("Negative", &sentiment.negative_news, "No negative news available"),
        ] {
            writeln!(out, "  {} news:", label)?;
            if items.is_empty() {
                writeln!(out, "    - {}", empty)?;
            }
            for item in items {
                writeln!(out, "    - {}", item)?;
            }
        }
        if !raw_data.news_headlines.is_empty() {
            writeln!(out, "  Headlines:")?;
            for headline in &raw_data.news_headlines {
                writeln!(out, "    - {}", headline)?;
            }
        }

        let outlook = &result.investment_outlook;
        writeln!(out, "\nInvestment Outlook")?;
        writeln!(out, "  Rationale : {}", or_fallback(&outlook.rationale, NA))?;
        writeln!(out, "  Short term: {}", or_fallback(&outlook.short_term, NA))?;
        writeln!(out, "  Long term : {}", or_fallback(&outlook.long_term, NA))?;

        let s = &result.suggestions;
        writeln!(out, "\nSuggestions")?;
        writeln!(out, "  Entry Points   : {}", or_fallback(&s.entry_points, NA))?;
        writeln!(out, "  Exit Points    : {}", or_fallback(&s.exit_points, NA))?;
        writeln!(out, "  Risk Management: {}", or_fallback(&s.risk_management, NA))?;
        writeln!(out, "  Monitoring     : {}", or_fallback(&s.monitoring, NA))?;
        writeln!(out, "  Diversification: {}", or_fallback(&s.diversification, NA))?;
        writeln!(out, "  Missing Data   : {}", or_fallback(&s.missing_data, "No missing data noted"))?;

        writeln!(out, "\nRecent Stock Price History")?;
        if report.history.is_empty() {
            writeln!(out, "  No stock price history available")?;
        } else {
            table::write_table(
                out,
                &["Date", "Close", "High", "Low", "Volume"],
                &self.sort,
                &self.history_cells(&report.history, sym),
            )?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

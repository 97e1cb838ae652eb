//! `/predict` response: the AI report (`result`) plus the raw inputs it was
//! built from (`raw_data`). Every field defaults so a partial report still
//! renders.

use super::{lenient_list, lenient_string, maybe_f64, or_default};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictRequest {
    pub company: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictResponse {
    #[serde(default, deserialize_with = "or_default")]
    pub result: PredictionReport,
    #[serde(default, deserialize_with = "or_default")]
    pub raw_data: RawData,
}

// ── AI report ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionReport {
    #[serde(default, deserialize_with = "lenient_string")]
    pub stock_name: Option<String>,
    #[serde(default, rename = "Currency", deserialize_with = "lenient_string")]
    pub currency: Option<String>,
    #[serde(default, rename = "CurrencySymbol", deserialize_with = "lenient_string")]
    pub currency_symbol: Option<String>,
    #[serde(default, deserialize_with = "or_default")]
    pub technical_overview: TechnicalOverview,
    #[serde(default, deserialize_with = "or_default")]
    pub fundamental_overview: FundamentalOverview,
    #[serde(default, deserialize_with = "or_default")]
    pub sentiment_analysis: SentimentAnalysis,
    #[serde(default, deserialize_with = "or_default")]
    pub investment_outlook: InvestmentOutlook,
    #[serde(default, rename = "Suggestions", deserialize_with = "or_default")]
    pub suggestions: Suggestions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TechnicalOverview {
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rsi_analysis: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub macd_analysis: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub momentum_analysis: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sma_analysis: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub volatility_analysis: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub price_volume_trend: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FundamentalOverview {
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub valuation: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub growth: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub leverage: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dividends: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub roe_analysis: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SentimentAnalysis {
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub positive_news: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub negative_news: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub neutral_news: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvestmentOutlook {
    #[serde(default, deserialize_with = "lenient_string")]
    pub verdict: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rationale: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub short_term: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub long_term: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Suggestions {
    #[serde(default, deserialize_with = "lenient_string")]
    pub entry_points: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub exit_points: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub risk_management: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub diversification: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub monitoring: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub missing_data: Option<String>,
}

// ── Raw inputs ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawData {
    #[serde(default, deserialize_with = "lenient_string")]
    pub stock_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "or_default")]
    pub stock_data: Option<StockData>,
    #[serde(default, deserialize_with = "or_default")]
    pub technical_analysis: Option<TechnicalAnalysis>,
    #[serde(default, deserialize_with = "or_default")]
    pub fundamental_analysis: Option<FundamentalAnalysis>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub news_headlines: Vec<String>,
}

/// Company fundamentals; the backend sends "N/A" for anything it lacks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockData {
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "maybe_f64")]
    pub market_cap: Option<f64>,
    #[serde(default, deserialize_with = "maybe_f64")]
    pub eps: Option<f64>,
    #[serde(default, deserialize_with = "maybe_f64")]
    pub revenue: Option<f64>,
    #[serde(default, deserialize_with = "maybe_f64")]
    pub revenue_growth: Option<f64>,
    #[serde(default, deserialize_with = "maybe_f64")]
    pub pe_ratio: Option<f64>,
    #[serde(default, deserialize_with = "maybe_f64")]
    pub de_ratio: Option<f64>,
    #[serde(default, deserialize_with = "maybe_f64")]
    pub roe: Option<f64>,
    #[serde(default, deserialize_with = "maybe_f64")]
    pub div_yield: Option<f64>,
    #[serde(default, deserialize_with = "or_default")]
    pub history: Vec<PriceBar>,
}

/// One row of the daily price history (pandas record orientation).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PriceBar {
    #[serde(default, rename = "Date", deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(default, rename = "Open", deserialize_with = "maybe_f64")]
    pub open: Option<f64>,
    #[serde(default, rename = "Close", deserialize_with = "maybe_f64")]
    pub close: Option<f64>,
    #[serde(default, rename = "High", deserialize_with = "maybe_f64")]
    pub high: Option<f64>,
    #[serde(default, rename = "Low", deserialize_with = "maybe_f64")]
    pub low: Option<f64>,
    #[serde(default, rename = "Volume", deserialize_with = "maybe_f64")]
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TechnicalAnalysis {
    #[serde(default, deserialize_with = "lenient_string")]
    pub verdict: Option<String>,
    #[serde(default, deserialize_with = "maybe_f64")]
    pub current_price: Option<f64>,
    #[serde(default, deserialize_with = "maybe_f64")]
    pub rsi: Option<f64>,
    #[serde(default, deserialize_with = "maybe_f64")]
    pub macd: Option<f64>,
    #[serde(default, deserialize_with = "maybe_f64")]
    pub signal: Option<f64>,
    #[serde(default, deserialize_with = "maybe_f64")]
    pub momentum: Option<f64>,
    #[serde(default, deserialize_with = "maybe_f64")]
    pub price_trend: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub volume_trend: Option<String>,
    #[serde(default, deserialize_with = "maybe_f64")]
    pub volatility: Option<f64>,
    #[serde(default, deserialize_with = "maybe_f64")]
    pub sma_5: Option<f64>,
    #[serde(default, deserialize_with = "maybe_f64")]
    pub sma_10: Option<f64>,
}

/// The backend repeats the stock-data ratios here; only its verdict is new.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FundamentalAnalysis {
    #[serde(default, deserialize_with = "lenient_string")]
    pub verdict: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_response_defaults() {
        let resp: PredictResponse = serde_json::from_value(json!({
            "result": { "investment_outlook": { "verdict": "Buy 70%" } }
        }))
        .unwrap();
        assert_eq!(resp.result.investment_outlook.verdict.as_deref(), Some("Buy 70%"));
        assert!(resp.result.currency_symbol.is_none());
        assert!(resp.raw_data.stock_data.is_none());
        assert!(resp.result.sentiment_analysis.positive_news.is_empty());
    }

    #[test]
    fn test_drifted_report_fields_still_decode() {
        let resp: PredictResponse = serde_json::from_value(json!({
            "result": {
                "stock_name": "Tata Consultancy Services",
                "technical_overview": "Momentum is flat",
                "sentiment_analysis": { "summary": 0.4, "positive_news": "Strong Q4 results" },
                "investment_outlook": { "verdict": ["Hold", "60%"], "rationale": null },
                "Suggestions": { "missing_data": ["ROE", "Dividend history"], "monitoring": true }
            },
            "raw_data": {
                "technical_analysis": { "verdict": 3 },
                "fundamental_analysis": { "verdict": ["Sell"], "pe_ratio": "24.5" },
                "currency": "INR",
                "news_headlines": ["TCS wins deal", 42, {"title": "ignored"}]
            }
        }))
        .unwrap();

        let r = &resp.result;
        assert_eq!(r.suggestions.missing_data.as_deref(), Some("ROE, Dividend history"));
        assert_eq!(r.suggestions.monitoring.as_deref(), Some("true"));
        assert!(r.technical_overview.summary.is_none());
        assert_eq!(r.sentiment_analysis.summary.as_deref(), Some("0.4"));
        assert_eq!(r.sentiment_analysis.positive_news, ["Strong Q4 results"]);
        assert_eq!(r.investment_outlook.verdict.as_deref(), Some("Hold, 60%"));

        let raw = &resp.raw_data;
        assert_eq!(raw.technical_analysis.as_ref().unwrap().verdict.as_deref(), Some("3"));
        let fa = raw.fundamental_analysis.as_ref().unwrap();
        assert_eq!(fa.verdict.as_deref(), Some("Sell"));
        assert_eq!(raw.currency.as_deref(), Some("INR"));
        assert_eq!(raw.news_headlines, ["TCS wins deal", "42"]);
    }

    #[test]
    fn test_na_values_become_none() {
        let data: StockData = serde_json::from_value(json!({
            "company_name": "Tata Consultancy Services Limited",
            "market_cap": 1.35e13,
            "eps": "N/A",
            "roe": null,
            "history": [
                {"Date": "Mon, 01 Apr 2024 00:00:00 GMT", "Close": 3890.5, "Volume": 1200300}
            ]
        }))
        .unwrap();
        assert_eq!(data.market_cap, Some(1.35e13));
        assert_eq!(data.eps, None);
        assert_eq!(data.roe, None);
        assert_eq!(data.history.len(), 1);
        assert_eq!(data.history[0].high, None);
        assert_eq!(data.history[0].volume, Some(1_200_300.0));
    }
}

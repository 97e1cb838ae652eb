//! `/analysis` request and the AI recommendation report it returns.

use super::{lenient_list, lenient_string, or_default};
use serde::{Deserialize, Serialize};

/// Body of `/analysis`. Field names follow the backend exactly.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalysisRequest {
    #[serde(rename = "Amount")]
    pub amount: String,
    pub term: String,
    pub risk: String,
    pub frequency: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationReport {
    #[serde(default, deserialize_with = "or_default")]
    pub investor_profile_summary: InvestorProfileSummary,
    #[serde(default, deserialize_with = "or_default")]
    pub recommendation_strategy: RecommendationStrategy,
    #[serde(default, deserialize_with = "or_default")]
    pub suggested_portfolio: Vec<SuggestedAsset>,
    #[serde(default, deserialize_with = "or_default")]
    pub portfolio_allocation_notes: AllocationNotes,
    #[serde(default, deserialize_with = "lenient_string")]
    pub disclaimer: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvestorProfileSummary {
    #[serde(default, deserialize_with = "lenient_string")]
    pub investable_amount: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub time_horizon: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub risk_tolerance: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub investment_frequency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendationStrategy {
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub focus: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub suitability: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedAsset {
    #[serde(default, deserialize_with = "lenient_string")]
    pub asset_identifier: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub asset_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub asset_class_or_sector: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rationale: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub risk_category: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub suggested_action: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AllocationNotes {
    #[serde(default, deserialize_with = "lenient_string")]
    pub suggestion: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub monitoring: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_field_names() {
        let report: RecommendationReport = serde_json::from_value(json!({
            "investorProfileSummary": {
                "InvestableAmount": "50000 INR",
                "TimeHorizon": "Long-term",
                "RiskTolerance": "High",
                "InvestmentFrequency": "Lump Sum"
            },
            "recommendationStrategy": {"description": "Growth tilt", "focus": ["Large cap", "IT"]},
            "suggestedPortfolio": [
                {"assetIdentifier": "INFY.NS", "assetName": "Infosys", "suggestedAction": "Buy"}
            ],
            "disclaimer": "Not advice."
        }))
        .unwrap();

        assert_eq!(report.investor_profile_summary.investable_amount.as_deref(), Some("50000 INR"));
        assert_eq!(report.recommendation_strategy.focus.len(), 2);
        assert_eq!(report.suggested_portfolio[0].asset_identifier.as_deref(), Some("INFY.NS"));
        assert!(report.portfolio_allocation_notes.suggestion.is_none());
    }

    #[test]
    fn test_drifted_report_fields_still_decode() {
        let report: RecommendationReport = serde_json::from_value(json!({
            "investorProfileSummary": { "InvestableAmount": 50000, "TimeHorizon": ["5", "years"] },
            "recommendationStrategy": { "description": "Income first", "focus": "Dividend stocks" },
            "suggestedPortfolio": [
                { "assetIdentifier": 500325, "assetName": "Reliance", "rationale": ["Scale", "Cash flow"] }
            ],
            "portfolioAllocationNotes": "Spread evenly",
            "disclaimer": ["Not advice.", "Do your own research."]
        }))
        .unwrap();

        let p = &report.investor_profile_summary;
        assert_eq!(p.investable_amount.as_deref(), Some("50000"));
        assert_eq!(p.time_horizon.as_deref(), Some("5, years"));
        assert_eq!(report.recommendation_strategy.focus, ["Dividend stocks"]);
        let a = &report.suggested_portfolio[0];
        assert_eq!(a.asset_identifier.as_deref(), Some("500325"));
        assert_eq!(a.rationale.as_deref(), Some("Scale, Cash flow"));
        assert!(report.portfolio_allocation_notes.suggestion.is_none());
        assert_eq!(report.disclaimer.as_deref(), Some("Not advice., Do your own research."));
    }

    #[test]
    fn test_request_uses_capitalised_amount() {
        let req = AnalysisRequest {
            amount: "50000".into(),
            term: "long-term".into(),
            risk: "high".into(),
            frequency: "lump sum".into(),
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["Amount"], "50000");
        assert_eq!(v["frequency"], "lump sum");
    }
}

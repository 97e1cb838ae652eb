//! AI investment-strategy page: a small form and the recommendation report.

use crate::api::{ApiError, Backend};
use crate::models::{AnalysisRequest, RecommendationReport};
use crate::utils::rule;
use clap::ValueEnum;
use std::fmt::{self, Write};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Term {
    ShortTerm,
    MediumTerm,
    #[default]
    LongTerm,
}

impl Term {
    pub fn as_str(&self) -> &'static str {
        match self {
            Term::ShortTerm => "short-term",
            Term::MediumTerm => "medium-term",
            Term::LongTerm => "long-term",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Risk {
    Low,
    Medium,
    #[default]
    High,
}

impl Risk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Risk::Low => "low",
            Risk::Medium => "medium",
            Risk::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Frequency {
    #[default]
    LumpSum,
    Monthly,
    Quarterly,
}

impl Frequency {
    /// Wire value; note the space in "lump sum".
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::LumpSum => "lump sum",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisForm {
    pub amount: String,
    pub term: Term,
    pub risk: Risk,
    pub frequency: Frequency,
}

impl AnalysisForm {
    pub fn validate(&self) -> Result<AnalysisRequest, ApiError> {
        let amount = self.amount.trim();
        if amount.is_empty() {
            return Err(ApiError::validation("Investment amount is required."));
        }
        match amount.parse::<f64>() {
            Ok(a) if a.is_finite() && a > 0.0 => {}
            _ => return Err(ApiError::validation("Investment amount must be a positive number.")),
        }
        Ok(AnalysisRequest {
            amount: amount.to_string(),
            term: self.term.as_str().to_string(),
            risk: self.risk.as_str().to_string(),
            frequency: self.frequency.as_str().to_string(),
        })
    }
}

#[derive(Debug, Default)]
pub struct AnalysisPage {
    report: Option<RecommendationReport>,
    pub error: Option<String>,
}

impl AnalysisPage {
    pub async fn submit<B: Backend + ?Sized>(&mut self, backend: &B, form: &AnalysisForm) -> Result<(), ApiError> {
        self.report = None;
        self.error = None;

        let req = form.validate().inspect_err(|e| self.error = Some(e.to_string()))?;
        match backend.analyze(&req).await {
            Ok(report) => {
                info!(
                    "Strategy for {} {} / {} risk: {} suggestions",
                    req.amount,
                    req.term,
                    req.risk,
                    report.suggested_portfolio.len()
                );
                self.report = Some(report);
                Ok(())
            }
            Err(e) => {
                error!("Analysis request failed: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn render(&self, out: &mut impl Write) -> fmt::Result {
        if let Some(err) = &self.error {
            writeln!(out, "! {}", err)?;
        }
        let Some(r) = &self.report else {
            return Ok(());
        };
        let text = |v: &Option<String>| v.clone().unwrap_or_default();

        let p = &r.investor_profile_summary;
        writeln!(out, "{}", rule())?;
        writeln!(out, "  Investor Profile Summary")?;
        writeln!(out, "{}", rule())?;
        writeln!(out, "  Amount         : {}", text(&p.investable_amount))?;
        writeln!(out, "  Frequency      : {}", text(&p.investment_frequency))?;
        writeln!(out, "  Risk Tolerance : {}", text(&p.risk_tolerance))?;
        writeln!(out, "  Time Horizon   : {}", text(&p.time_horizon))?;

        let s = &r.recommendation_strategy;
        writeln!(out, "\nRecommendation Strategy")?;
        writeln!(out, "  {}", text(&s.description))?;
        writeln!(out, "  Focus Areas:")?;
        for f in &s.focus {
            writeln!(out, "    - {}", f)?;
        }
        writeln!(out, "  {}", text(&s.suitability))?;

        let n = &r.portfolio_allocation_notes;
        writeln!(out, "\nPortfolio Allocation")?;
        writeln!(out, "  Suggestion: {}", text(&n.suggestion))?;
        writeln!(out, "  Monitoring: {}", text(&n.monitoring))?;

        writeln!(out, "\nSuggested Portfolio")?;
        for a in &r.suggested_portfolio {
            let id = text(&a.asset_identifier);
            writeln!(out, "  {} ({})", text(&a.asset_name), id)?;
            writeln!(out, "    Sector   : {}", text(&a.asset_class_or_sector))?;
            writeln!(out, "    Risk     : {}", text(&a.risk_category))?;
            writeln!(out, "    Action   : {}", text(&a.suggested_action))?;
            writeln!(out, "    Rationale: {}", text(&a.rationale))?;
            if !id.is_empty() {
                writeln!(out, "    Details  : tradenexus predict {}", id)?;
            }
        }

        writeln!(out, "\nDisclaimer: {}", text(&r.disclaimer))
    }
}

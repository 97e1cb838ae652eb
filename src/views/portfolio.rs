//! Portfolio dashboard: holdings table, summary card, allocation and the
//! add/edit/delete flows.
//!
//! The local holdings list is a cache of the server's. Mutations are applied
//! locally only after the server accepts them, and mark the cache stale so
//! the next `refresh_if_stale` reconciles with the authoritative copy.

use crate::api::{ApiError, Backend};
use crate::metrics::{self, HoldingFigures, PortfolioMetrics};
use crate::models::{AddStockRequest, EditStockRequest, Holding};
use crate::table;
use crate::utils::{fmt_amount, fmt_number, rule};
use std::fmt::{self, Write};
use tabled::settings::Alignment;
use tabled::settings::object::Columns;
use tracing::{error, info};

// ── Forms ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct AddStockForm {
    pub name: String,
    pub quantity: String,
    pub purchase_price: String,
    pub use_current_price: bool,
}

fn parse_quantity(raw: &str) -> Result<u64, ApiError> {
    match raw.trim().parse::<u64>() {
        Ok(q) if q > 0 => Ok(q),
        _ => Err(ApiError::validation("Quantity must be a whole number above zero.")),
    }
}

impl AddStockForm {
    pub fn validate(&self) -> Result<AddStockRequest, ApiError> {
        if self.name.trim().is_empty() || self.quantity.trim().is_empty() {
            return Err(ApiError::validation("Name and Quantity are required."));
        }
        let quantity = parse_quantity(&self.quantity)?;

        let price = self
            .purchase_price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p > 0.0);

        if price.is_none() && !self.use_current_price {
            return Err(ApiError::validation(
                "Either enter Purchase Price or check Current Price.",
            ));
        }

        Ok(AddStockRequest {
            name: self.name.trim().to_string(),
            quantity,
            purchase_price: if self.use_current_price { None } else { price },
            current_price: self.use_current_price,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct EditStockForm {
    pub quantity: String,
    pub purchase_price: String,
}

impl EditStockForm {
    /// Pre-filled from the row being edited.
    pub fn for_holding(h: &Holding) -> Self {
        Self {
            quantity: h.quantity.to_string(),
            purchase_price: h.purchase_price.to_string(),
        }
    }

    pub fn validate(&self) -> Result<EditStockRequest, ApiError> {
        let quantity = parse_quantity(&self.quantity)?;
        let purchase_price = match self.purchase_price.trim().parse::<f64>() {
            Ok(p) if p.is_finite() && p >= 0.0 => p,
            _ => return Err(ApiError::validation("Purchase price must be a number of at least 0.")),
        };
        Ok(EditStockRequest {
            quantity,
            purchase_price,
        })
    }
}

// ── Page state ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct PortfolioPage {
    holdings: Vec<Holding>,
    stale: bool,
    pub error: Option<String>,
    /// Server's confirmation of the last add.
    pub notice: Option<String>,
}

impl PortfolioPage {
    pub fn new() -> Self {
        Self {
            stale: true,
            ..Self::default()
        }
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn find(&self, id: i64) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.id == Some(id))
    }

    /// Fetch the list. On failure the previous list stays.
    pub async fn load<B: Backend + ?Sized>(&mut self, backend: &B) {
        match backend.list_holdings().await {
            Ok(holdings) => {
                info!("Loaded {} holdings", holdings.len());
                self.holdings = holdings;
                self.stale = false;
                self.error = None;
            }
            Err(e) => {
                error!("Error fetching stocks: {}", e);
                self.error = Some("Failed to fetch stocks".to_string());
            }
        }
    }

    pub async fn refresh_if_stale<B: Backend + ?Sized>(&mut self, backend: &B) {
        if self.is_stale() {
            self.load(backend).await;
        }
    }

    pub async fn add<B: Backend + ?Sized>(&mut self, backend: &B, form: &AddStockForm) -> Result<Holding, ApiError> {
        let req = form.validate()?;
        let resp = backend.add_stock(&req).await.inspect_err(|e| {
            error!("Error adding stock: {}", e);
            self.error = Some(format!("Failed to add stock: {}", e));
        })?;

        let holding = Holding::from_added(&resp.stock_info, req.quantity);
        info!("Added {} ({}) x{}", holding.name, holding.ticker, holding.quantity);
        self.holdings.push(holding.clone());
        self.stale = true;
        self.error = None;
        self.notice = resp.msg;
        Ok(holding)
    }

    pub async fn edit<B: Backend + ?Sized>(&mut self, backend: &B, id: i64, form: &EditStockForm) -> Result<(), ApiError> {
        let req = form.validate()?;
        if self.find(id).is_none() {
            return Err(ApiError::validation(format!("No stock with id {} in the portfolio.", id)));
        }

        backend.edit_stock(id, &req).await.inspect_err(|e| {
            error!("Error updating stock {}: {}", id, e);
            self.error = Some("Failed to update stock".to_string());
        })?;

        if let Some(h) = self.holdings.iter_mut().find(|h| h.id == Some(id)) {
            h.quantity = req.quantity;
            h.purchase_price = req.purchase_price;
        }
        self.stale = true;
        self.error = None;
        Ok(())
    }

    pub async fn delete<B: Backend + ?Sized>(&mut self, backend: &B, id: i64) -> Result<(), ApiError> {
        backend.delete_stock(id).await.inspect_err(|e| {
            error!("Error deleting stock {}: {}", id, e);
            self.error = Some("Failed to delete stock".to_string());
        })?;

        self.holdings.retain(|h| h.id != Some(id));
        self.stale = true;
        self.error = None;
        Ok(())
    }

    // ── Derived figures ──────────────────────────────────────────────────────

    pub fn metrics(&self) -> PortfolioMetrics {
        metrics::portfolio_metrics(&self.holdings)
    }

    pub fn rows(&self) -> Vec<(&Holding, HoldingFigures)> {
        self.holdings
            .iter()
            .map(|h| (h, metrics::holding_figures(h)))
            .collect()
    }

    // ── Rendering ────────────────────────────────────────────────────────────

    pub fn render(&self, out: &mut impl Write, currency: &str, slices: usize) -> fmt::Result {
        if let Some(err) = &self.error {
            writeln!(out, "! {}", err)?;
        }
        if let Some(notice) = &self.notice {
            writeln!(out, "  {}", notice)?;
        }

        let m = self.metrics();
        writeln!(out, "{}", rule())?;
        writeln!(out, "  Portfolio Summary")?;
        writeln!(out, "{}", rule())?;
        writeln!(out, "  Total Invested      : {}{}", currency, fmt_amount(m.total_invested))?;
        writeln!(out, "  Current Value       : {}{}", currency, fmt_amount(m.total_current_value))?;
        writeln!(out, "  Overall Performance : {:.2}% [{}]", m.performance_pct, m.trend())?;
        writeln!(out)?;

        if self.holdings.is_empty() {
            writeln!(out, "No stocks yet. Add one with `tradenexus add`.")?;
            return Ok(());
        }

        let headers = ["ID", "Name", "Ticker", "Qty", "Buy", "Current", "Invested", "Value", "Change", "Trend"];
        let cells: Vec<Vec<String>> = self
            .rows()
            .into_iter()
            .map(|(h, f)| {
                vec![
                    h.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
                    truncate(&h.name, 24),
                    h.ticker.clone(),
                    fmt_number(h.quantity as i64),
                    format!("{}{}", currency, fmt_amount(h.purchase_price)),
                    format!("{}{}", currency, fmt_amount(h.current_price)),
                    format!("{}{}", currency, fmt_amount(f.invested)),
                    format!("{}{}", currency, fmt_amount(f.current_value)),
                    format!("{:.2}%", f.change_pct),
                    f.trend.to_string(),
                ]
            })
            .collect();
        let mut holdings = table::text_table(&headers.map(String::from), &cells);
        holdings.modify(Columns::new(3..9), Alignment::right());
        table::write_indented(out, &holdings)?;

        writeln!(out)?;
        writeln!(out, "  Asset Distribution (Top {})", slices)?;
        let total = m.total_current_value;
        let cells: Vec<Vec<String>> = metrics::allocation(&self.holdings, slices)
            .into_iter()
            .map(|slice| {
                let share = if total > 0.0 { slice.value / total * 100.0 } else { 0.0 };
                vec![
                    slice.label,
                    format!("{}{}", currency, fmt_amount(slice.value)),
                    format!("{:.1}%", share),
                ]
            })
            .collect();
        let mut allocation = table::text_table(&["Asset", "Value", "Share"].map(String::from), &cells);
        allocation.modify(Columns::new(1..), Alignment::right());
        table::write_indented(out, &allocation)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
        t.push('…');
        t
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

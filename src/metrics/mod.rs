//! Portfolio figures derived from the holdings list on every render.
//!
//! All functions are pure. A zero cost basis never divides: both the summary
//! and the per-row change use 0 as the sentinel, so a holding bought for free
//! shows "0.00%" and classifies as neutral.

use crate::models::Holding;
use std::cmp::Ordering;
use std::fmt;

/// Above this change (in percent) a position counts as a gain.
pub const GAIN_THRESHOLD_PCT: f64 = 5.0;

// ── Classification ───────────────────────────────────────────────────────────

/// Display category driving colour/badge choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Loss,
    Neutral,
    Gain,
}

impl Trend {
    pub fn label(&self) -> &'static str {
        match self {
            Trend::Loss => "loss",
            Trend::Neutral => "neutral",
            Trend::Gain => "gain",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `c < 0` → loss, `c > 5` → gain, everything else (including 0 and 5) → neutral.
pub fn classify(change_pct: f64) -> Trend {
    if change_pct < 0.0 {
        Trend::Loss
    } else if change_pct > GAIN_THRESHOLD_PCT {
        Trend::Gain
    } else {
        Trend::Neutral
    }
}

/// `(current − invested) / invested × 100`, or 0 when nothing was invested.
pub fn percent_change(invested: f64, current: f64) -> f64 {
    if invested == 0.0 {
        return 0.0;
    }
    let pct = (current - invested) / invested * 100.0;
    if pct.is_finite() { pct } else { 0.0 }
}

// ── Per-row figures ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldingFigures {
    pub invested: f64,
    pub current_value: f64,
    pub change_pct: f64,
    pub trend: Trend,
}

pub fn invested_value(h: &Holding) -> f64 {
    h.quantity as f64 * h.purchase_price
}

pub fn current_value(h: &Holding) -> f64 {
    h.quantity as f64 * h.current_price
}

pub fn holding_figures(h: &Holding) -> HoldingFigures {
    let invested = invested_value(h);
    let current = current_value(h);
    let change_pct = percent_change(invested, current);
    HoldingFigures {
        invested,
        current_value: current,
        change_pct,
        trend: classify(change_pct),
    }
}

// ── Summary ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PortfolioMetrics {
    pub total_invested: f64,
    pub total_current_value: f64,
    pub performance_pct: f64,
}

impl PortfolioMetrics {
    pub fn trend(&self) -> Trend {
        classify(self.performance_pct)
    }
}

pub fn portfolio_metrics(holdings: &[Holding]) -> PortfolioMetrics {
    let (total_invested, total_current_value) = holdings
        .iter()
        .fold((0.0, 0.0), |(inv, cur), h| (inv + invested_value(h), cur + current_value(h)));

    PortfolioMetrics {
        total_invested,
        total_current_value,
        performance_pct: percent_change(total_invested, total_current_value),
    }
}

// ── Allocation ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationSlice {
    pub label: String,
    pub value: f64,
}

/// Current value per ticker, largest first. Holdings past `top_n` are folded
/// into one "Other" slice, which is only emitted when it is worth something.
pub fn allocation(holdings: &[Holding], top_n: usize) -> Vec<AllocationSlice> {
    let mut slices: Vec<AllocationSlice> = holdings
        .iter()
        .map(|h| AllocationSlice {
            label: h.ticker.clone(),
            value: current_value(h),
        })
        .collect();
    slices.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));

    let rest = if slices.len() > top_n {
        slices.split_off(top_n)
    } else {
        Vec::new()
    };
    let other: f64 = rest.iter().map(|s| s.value).sum();
    if other > 0.0 {
        slices.push(AllocationSlice {
            label: "Other".to_string(),
            value: other,
        });
    }
    slices
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn holding(ticker: &str, qty: u64, buy: f64, cur: f64) -> Holding {
        Holding {
            id: Some(1),
            name: ticker.to_string(),
            ticker: ticker.to_string(),
            quantity: qty,
            purchase_price: buy,
            current_price: cur,
        }
    }

    #[test]
    fn test_single_holding_gain() {
        let hs = vec![holding("INFY", 10, 100.0, 150.0)];
        let m = portfolio_metrics(&hs);
        assert_eq!(m.total_invested, 1000.0);
        assert_eq!(m.total_current_value, 1500.0);
        assert_eq!(format!("{:.2}", m.performance_pct), "50.00");

        let row = holding_figures(&hs[0]);
        assert_eq!(row.trend, Trend::Gain);
        assert_eq!(row.change_pct, 50.0);
    }

    #[test]
    fn test_totals_equal_row_sums() {
        let hs = vec![
            holding("A", 3, 10.0, 12.0),
            holding("B", 7, 250.5, 240.0),
            holding("C", 1, 0.0, 99.0),
        ];
        let m = portfolio_metrics(&hs);
        let inv: f64 = hs.iter().map(|h| holding_figures(h).invested).sum();
        let cur: f64 = hs.iter().map(|h| holding_figures(h).current_value).sum();
        assert_eq!(m.total_invested, inv);
        assert_eq!(m.total_current_value, cur);
        assert!(m.total_invested >= 0.0 && m.total_current_value >= 0.0);
    }

    #[test]
    fn test_zero_invested_is_zero_not_nan() {
        assert_eq!(portfolio_metrics(&[]).performance_pct, 0.0);

        let free = holding("GIFT", 5, 0.0, 40.0);
        let row = holding_figures(&free);
        assert_eq!(row.change_pct, 0.0);
        assert_eq!(row.trend, Trend::Neutral);
        assert_eq!(portfolio_metrics(&[free]).performance_pct, 0.0);
    }

    #[test]
    fn test_classification_boundaries() {
        assert_eq!(classify(-0.0001), Trend::Loss);
        assert_eq!(classify(0.0), Trend::Neutral);
        assert_eq!(classify(5.0), Trend::Neutral);
        assert_eq!(classify(5.0001), Trend::Gain);
        assert_eq!(classify(-30.0), Trend::Loss);
    }

    #[test]
    fn test_loss_row() {
        let row = holding_figures(&holding("X", 2, 100.0, 90.0));
        assert_eq!(row.change_pct, -10.0);
        assert_eq!(row.trend, Trend::Loss);
        assert_eq!(row.trend.to_string(), "loss");
    }

    #[test]
    fn test_allocation_top_n_and_other() {
        let hs: Vec<Holding> = (1..=12)
            .map(|i| holding(&format!("T{}", i), 1, 1.0, i as f64))
            .collect();
        let slices = allocation(&hs, 10);
        assert_eq!(slices.len(), 11);
        assert_eq!(slices[0].label, "T12");
        assert_eq!(slices[9].label, "T3");
        assert_eq!(slices[10], AllocationSlice { label: "Other".into(), value: 3.0 });
    }

    #[test]
    fn test_allocation_no_other_when_small() {
        let hs = vec![holding("A", 1, 1.0, 5.0), holding("B", 2, 1.0, 1.0)];
        let slices = allocation(&hs, 10);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].label, "A");
    }
}

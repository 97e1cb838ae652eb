//! Sortable, filterable tables over any row shape.
//!
//! Sorting and filtering are independent pieces of view state: the rendered
//! rows are always `filter(sort(source))`, recomputed from the unsorted source
//! each time, so flipping direction back and forth never drifts.

pub mod rows;

use std::cmp::Ordering;
use std::fmt;
use tabled::Table;
use tabled::builder::Builder;
use tabled::settings::Style;

pub use rows::{HistoryRow, MetricRow};

/// Column whose display strings are parsed back into numbers for sorting.
pub const VALUE_KEY: &str = "Value";

const CURRENCY_SYMBOLS: [char; 5] = ['₹', '$', '€', '£', '¥'];

// ── Cells & rows ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Missing,
}

impl Cell<'_> {
    /// String form used for filtering and non-numeric comparison.
    pub fn text(&self) -> Option<String> {
        match self {
            Cell::Text(s) => Some(s.to_string()),
            Cell::Number(n) => Some(n.to_string()),
            Cell::Missing => None,
        }
    }
}

impl<'a> From<Option<&'a str>> for Cell<'a> {
    fn from(v: Option<&'a str>) -> Self {
        v.map(Cell::Text).unwrap_or(Cell::Missing)
    }
}

impl From<Option<f64>> for Cell<'_> {
    fn from(v: Option<f64>) -> Self {
        v.map(Cell::Number).unwrap_or(Cell::Missing)
    }
}

/// A row addressable by column key.
pub trait Row {
    /// Column keys in display order.
    fn keys(&self) -> &'static [&'static str];

    /// Unknown keys yield `Cell::Missing`.
    fn cell(&self, key: &str) -> Cell<'_>;

    fn cells(&self) -> Vec<Cell<'_>> {
        self.keys().iter().map(|k| self.cell(k)).collect()
    }
}

// ── Sort state ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Asc => "↑",
            SortDirection::Desc => "↓",
        }
    }
}

/// Which column is sorted, if any. Shared by every table on a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    /// Same key flips asc↔desc; a new key starts ascending.
    pub fn toggle(&mut self, key: &str) {
        self.direction = match &self.key {
            Some(k) if k == key => self.direction.flipped(),
            _ => SortDirection::Asc,
        };
        self.key = Some(key.to_string());
    }

    /// Header suffix: "↑", "↓" or "" for unsorted columns.
    pub fn indicator(&self, key: &str) -> &'static str {
        match &self.key {
            Some(k) if k == key => self.direction.arrow(),
            _ => "",
        }
    }
}

// ── Comparison ───────────────────────────────────────────────────────────────

/// Leading numeric prefix, like "2.50abc" → 2.5.
fn leading_number(s: &str) -> Option<f64> {
    let end = s
        .char_indices()
        .take_while(|(i, c)| c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+')))
        .map(|(i, c)| i + c.len_utf8())
        .last()?;
    s[..end].parse().ok()
}

/// Parse a formatted display value back into a number.
/// "₹1.20B" → 1.2e9 | "12.5%" → 12.5 | "$3.4M" → 3.4e6 | "N/A" → 0
pub fn normalize_value(raw: &str, currency_symbol: &str) -> f64 {
    let mut s = raw.trim().to_string();
    if !currency_symbol.is_empty() {
        s = s.replace(currency_symbol, "");
    }
    let s: String = s
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != '%' && *c != ',' && !c.is_whitespace())
        .collect();

    let (digits, multiplier) = match s.chars().last() {
        Some('B') | Some('b') => (&s[..s.len() - 1], 1e9),
        Some('M') | Some('m') => (&s[..s.len() - 1], 1e6),
        Some('K') | Some('k') => (&s[..s.len() - 1], 1e3),
        _ => (s.as_str(), 1.0),
    };

    leading_number(digits)
        .map(|n| n * multiplier)
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Locale-style ordering: case-insensitive first, lowercase before uppercase on ties.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

fn compare_cells(a: Cell<'_>, b: Cell<'_>, key: &str, currency_symbol: &str) -> Ordering {
    if key == VALUE_KEY {
        let num = |c: Cell<'_>| match c {
            Cell::Text(s) => normalize_value(s, currency_symbol),
            Cell::Number(n) => n,
            Cell::Missing => 0.0,
        };
        return num(a).total_cmp(&num(b));
    }

    match (a, b) {
        (Cell::Number(x), Cell::Number(y)) => x.total_cmp(&y),
        _ => locale_cmp(&a.text().unwrap_or_default(), &b.text().unwrap_or_default()),
    }
}

// ── Operations ───────────────────────────────────────────────────────────────

/// Stable sort by `key`. Ties keep their source order in both directions.
pub fn sort<'r, R: Row>(
    rows: impl IntoIterator<Item = &'r R>,
    key: &str,
    direction: SortDirection,
    currency_symbol: &str,
) -> Vec<&'r R> {
    let mut out: Vec<&R> = rows.into_iter().collect();
    out.sort_by(|a, b| {
        let ord = compare_cells(a.cell(key), b.cell(key), key, currency_symbol);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
    out
}

/// Rows with any field containing `query`, case-insensitively. Empty query
/// keeps everything; missing fields never match.
pub fn filter<'r, R: Row>(rows: impl IntoIterator<Item = &'r R>, query: &str) -> Vec<&'r R> {
    let needle = query.to_lowercase();
    rows.into_iter()
        .filter(|row| {
            needle.is_empty()
                || row
                    .cells()
                    .iter()
                    .filter_map(Cell::text)
                    .any(|t| t.to_lowercase().contains(&needle))
        })
        .collect()
}

/// What a table renders: the source sorted per `sort_state`, then filtered.
pub fn view<'r, R: Row>(rows: &'r [R], sort_state: &SortState, query: &str, currency_symbol: &str) -> Vec<&'r R> {
    let sorted = match &sort_state.key {
        Some(key) => sort(rows, key, sort_state.direction, currency_symbol),
        None => rows.iter().collect(),
    };
    filter(sorted, query)
}

// ── Text rendering ───────────────────────────────────────────────────────────

/// Build a psql-style table from a header row and string cells.
pub fn text_table(headers: &[String], cells: &[Vec<String>]) -> Table {
    let mut builder = Builder::default();
    builder.push_record(headers.iter().cloned());
    for row in cells {
        builder.push_record(row.iter().cloned());
    }
    let mut table = builder.build();
    table.with(Style::psql());
    table
}

/// Write a table indented by two spaces.
pub fn write_indented(out: &mut impl fmt::Write, table: &Table) -> fmt::Result {
    for line in table.to_string().lines() {
        writeln!(out, "  {}", line)?;
    }
    Ok(())
}

/// Write `cells` as a text table. Headers carry the sort arrow of
/// `sort_state`; an empty body prints "No data available".
pub fn write_table(
    out: &mut impl fmt::Write,
    headers: &[&str],
    sort_state: &SortState,
    cells: &[Vec<String>],
) -> fmt::Result {
    let heads: Vec<String> = headers
        .iter()
        .map(|h| format!("{}{}", h, sort_state.indicator(h)))
        .collect();

    write_indented(out, &text_table(&heads, cells))?;
    if cells.is_empty() {
        writeln!(out, "  No data available")?;
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(m: &str, v: &str) -> MetricRow {
        MetricRow::new(m, v)
    }

    fn names(rows: &[&MetricRow]) -> Vec<String> {
        rows.iter().map(|r| r.metric.clone()).collect()
    }

    #[test]
    fn test_normalize_value() {
        assert_eq!(normalize_value("₹2.50", "₹"), 2.5);
        assert_eq!(normalize_value("₹1.20B", "₹"), 1.2e9);
        assert_eq!(normalize_value("$3.4M", "$"), 3.4e6);
        assert_eq!(normalize_value("12.5%", "₹"), 12.5);
        assert_eq!(normalize_value("-0.8%", "₹"), -0.8);
        assert_eq!(normalize_value("45K", "₹"), 45_000.0);
        assert_eq!(normalize_value("1,234.5", "₹"), 1234.5);
        assert_eq!(normalize_value("N/A", "₹"), 0.0);
        assert_eq!(normalize_value("₹N/A", "₹"), 0.0);
        assert_eq!(normalize_value("", "₹"), 0.0);
        assert_eq!(normalize_value("Rs.10", "Rs."), 10.0);
    }

    #[test]
    fn test_value_sort_expands_magnitudes() {
        let rows = vec![metric("Revenue", "₹1.20B"), metric("EPS", "₹2.50")];
        let sorted = sort(&rows, VALUE_KEY, SortDirection::Asc, "₹");
        assert_eq!(names(&sorted), ["EPS", "Revenue"]);

        let sorted = sort(&rows, VALUE_KEY, SortDirection::Desc, "₹");
        assert_eq!(names(&sorted), ["Revenue", "EPS"]);
    }

    #[test]
    fn test_text_sort_is_case_insensitive() {
        let rows = vec![metric("rsi", "1"), metric("EPS", "2"), metric("Momentum", "3")];
        let sorted = sort(&rows, "Metric", SortDirection::Asc, "₹");
        assert_eq!(names(&sorted), ["EPS", "Momentum", "rsi"]);
    }

    #[test]
    fn test_sort_is_stable_and_idempotent() {
        let rows = vec![
            metric("A", "N/A"),
            metric("B", "5"),
            metric("C", "N/A"),
            metric("D", "5"),
        ];
        let once = sort(&rows, VALUE_KEY, SortDirection::Asc, "₹");
        assert_eq!(names(&once), ["A", "C", "B", "D"]);

        let twice = sort(once.iter().copied(), VALUE_KEY, SortDirection::Asc, "₹");
        assert_eq!(names(&twice), names(&once));

        // descending keeps tie order too
        let desc = sort(&rows, VALUE_KEY, SortDirection::Desc, "₹");
        assert_eq!(names(&desc), ["B", "D", "A", "C"]);
    }

    #[test]
    fn test_toggle_twice_restores_order() {
        let rows = vec![metric("P/E Ratio", "22.1"), metric("EPS", "₹2.50"), metric("ROE", "18.2%")];
        let mut state = SortState::default();

        state.toggle(VALUE_KEY);
        let first = names(&view(&rows, &state, "", "₹"));
        state.toggle(VALUE_KEY);
        assert_eq!(state.direction, SortDirection::Desc);
        state.toggle(VALUE_KEY);
        assert_eq!(state.direction, SortDirection::Asc);
        assert_eq!(names(&view(&rows, &state, "", "₹")), first);
    }

    #[test]
    fn test_toggle_new_key_resets_to_asc() {
        let mut state = SortState::default();
        state.toggle("Metric");
        state.toggle("Metric");
        assert_eq!(state.direction, SortDirection::Desc);
        state.toggle(VALUE_KEY);
        assert_eq!(state.key.as_deref(), Some(VALUE_KEY));
        assert_eq!(state.direction, SortDirection::Asc);
        assert_eq!(state.indicator(VALUE_KEY), "↑");
        assert_eq!(state.indicator("Metric"), "");
    }

    #[test]
    fn test_filter() {
        let rows = vec![
            metric("Market Cap", "₹1.35T"),
            metric("EPS", "₹2.50"),
            MetricRow::with_description("ROE", "18.2%", "Strong RETURN on equity"),
        ];
        assert_eq!(filter(&rows, "").len(), 3);
        assert_eq!(names(&filter(&rows, "eps")), ["EPS"]);
        assert_eq!(names(&filter(&rows, "return")), ["ROE"]);
        assert_eq!(names(&filter(&rows, "₹")), ["Market Cap", "EPS"]);
        assert!(filter(&rows, "dividend").is_empty());
    }

    #[test]
    fn test_empty_filter_keeps_sorted_order() {
        let rows = vec![metric("Revenue", "₹1.20B"), metric("EPS", "₹2.50")];
        let state = SortState {
            key: Some(VALUE_KEY.into()),
            direction: SortDirection::Asc,
        };
        assert_eq!(names(&view(&rows, &state, "", "₹")), ["EPS", "Revenue"]);
    }

    #[test]
    fn test_missing_fields_do_not_fault() {
        let rows = vec![
            HistoryRow { date: None, close: Some(10.0), high: None, low: None, volume: None },
            HistoryRow { date: Some("2024-04-02".into()), close: None, high: Some(11.0), low: Some(9.0), volume: Some(500.0) },
        ];
        assert_eq!(filter(&rows, "2024").len(), 1);
        assert_eq!(filter(&rows, "500").len(), 1);

        let by_close = sort(&rows, "Close", SortDirection::Asc, "₹");
        // Missing sorts as empty text, ahead of numbers rendered as text
        assert_eq!(by_close.len(), 2);
        let by_unknown = sort(&rows, "Nope", SortDirection::Asc, "₹");
        assert_eq!(by_unknown.len(), 2);
    }

    #[test]
    fn test_numeric_columns_sort_numerically() {
        let rows = vec![
            HistoryRow { date: Some("2024-04-01".into()), close: Some(100.0), high: None, low: None, volume: Some(9.0) },
            HistoryRow { date: Some("2024-04-02".into()), close: Some(20.0), high: None, low: None, volume: Some(10.0) },
        ];
        let sorted = sort(&rows, "Volume", SortDirection::Desc, "₹");
        assert_eq!(sorted[0].volume, Some(10.0));
        let sorted = sort(&rows, "Close", SortDirection::Asc, "₹");
        assert_eq!(sorted[0].close, Some(20.0));
    }

    #[test]
    fn test_write_table() {
        let mut state = SortState::default();
        state.toggle(VALUE_KEY);
        let mut out = String::new();
        let cells = vec![vec!["EPS".to_string(), "₹2.50".to_string()]];
        write_table(&mut out, &["Metric", "Value"], &state, &cells).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        let cells = |line: &str| line.split('|').map(|c| c.trim().to_string()).collect::<Vec<_>>();
        assert_eq!(cells(lines[0]), ["Metric", "Value↑"]);
        assert!(lines[1].trim().starts_with("---"));
        assert_eq!(cells(lines[2]), ["EPS", "₹2.50"]);
        assert!(lines.iter().all(|l| l.starts_with("  ")));

        let mut out = String::new();
        write_table(&mut out, &["Metric"], &SortState::default(), &[]).unwrap();
        assert!(out.ends_with("No data available\n"));
    }
}

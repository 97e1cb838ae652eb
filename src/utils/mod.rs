use std::time::{Duration, Instant};
use tracing::info;

/// A simple wall-clock timer for logging how long a command took.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        info!("⏱  Starting: {}", label);
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!(
            "⏱  Finished: {} (took {:.2?})",
            self.label,
            self.elapsed()
        );
    }
}

/// Group the integer part of an already formatted number with commas.
/// "1234567.50" → "1,234,567.50" | "-42000" → "-42,000"
fn group_thousands(formatted: &str) -> String {
    let (sign, rest) = match formatted.strip_prefix('-') {
        Some(r) => ("-", r),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let int_grouped: String = grouped.chars().rev().collect();

    match frac_part {
        Some(f) => format!("{sign}{int_grouped}.{f}"),
        None => format!("{sign}{int_grouped}"),
    }
}

/// Format a large integer with thousands separators.
pub fn fmt_number(n: i64) -> String {
    group_thousands(&n.to_string())
}

/// Format a money amount with two decimals and thousands separators.
/// Non-finite values render as "N/A".
pub fn fmt_amount(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    group_thousands(&format!("{:.2}", value))
}

/// Prefix a change with an explicit sign: "+1.50" / "-0.25".
pub fn fmt_signed(value: f64) -> String {
    if value >= 0.0 {
        format!("+{:.2}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Horizontal rule used between rendered sections.
pub fn rule() -> &'static str {
    "─────────────────────────────────────────────────────────────"
}

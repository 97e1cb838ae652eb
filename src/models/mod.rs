pub mod analysis;
pub mod market;
pub mod prediction;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

pub use analysis::{AnalysisRequest, RecommendationReport};
pub use market::{IndianMarketData, UsMarketData};
pub use prediction::PredictResponse;

// ── Lenient numeric fields ────────────────────────────────────────────────────
//
// Backend payloads are loosely typed: numbers may arrive as strings, "N/A", or
// null. Holdings coerce anything unusable to 0 so the dashboard always renders;
// analysis payloads keep the distinction as `None` so the view can print "N/A".

fn coerce_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
    .filter(|f: &f64| f.is_finite())
}

/// Number or numeric string → f64; anything else (or a negative) → 0.
pub fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let raw = Value::deserialize(d)?;
    match coerce_f64(&raw) {
        Some(f) if f >= 0.0 => Ok(f),
        _ => {
            warn!("Coercing malformed amount {} to 0", raw);
            Ok(0.0)
        }
    }
}

/// Number or numeric string → whole units (fraction truncated); otherwise 0.
pub fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let raw = Value::deserialize(d)?;
    match coerce_f64(&raw) {
        Some(f) if f >= 0.0 => Ok(f.trunc() as u64),
        _ => {
            warn!("Coercing malformed quantity {} to 0", raw);
            Ok(0)
        }
    }
}

/// Number or numeric string → `Some`; "N/A", null and friends → `None`.
pub fn maybe_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let raw = Value::deserialize(d)?;
    Ok(coerce_f64(&raw))
}

fn coerce_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(coerce_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    }
}

/// Text field that tolerates numbers, bools, arrays (joined) and null.
/// Objects and anything else unusable become `None`.
pub fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let raw = Value::deserialize(d)?;
    Ok(coerce_text(&raw))
}

/// List of text. A lone scalar becomes a one-item list; entries that are
/// not text-like are skipped.
pub fn lenient_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let raw = Value::deserialize(d)?;
    Ok(match raw {
        Value::Array(items) => items.iter().filter_map(coerce_text).collect(),
        other => coerce_text(&other).into_iter().collect(),
    })
}

/// Nested report section: anything that does not decode as `T` falls back to
/// `T::default()` instead of failing the whole payload.
pub fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Value::deserialize(d)?;
    Ok(serde_json::from_value(raw).unwrap_or_else(|e| {
        warn!("Dropping malformed report section: {}", e);
        T::default()
    }))
}

// ── Holding ──────────────────────────────────────────────────────────────────

/// One owned position as returned by `/get-stocks`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    /// Assigned by the server; `None` for a row added locally and not yet reloaded.
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub quantity: u64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub purchase_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub current_price: f64,
}

impl Holding {
    /// Row for a freshly added stock. The server prices it, so purchase and
    /// current price are both the returned quote.
    pub fn from_added(info: &StockInfo, quantity: u64) -> Self {
        Self {
            id: None,
            name: info.name.clone(),
            ticker: info.symbol.clone(),
            quantity,
            purchase_price: info.price,
            current_price: info.price,
        }
    }
}

// ── Auth ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
}

/// `/protected` payload (claims of the session token).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Error/status body: `{msg}` or `{error, details}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerMessage {
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl ServerMessage {
    pub fn text(&self) -> Option<String> {
        match (&self.msg, &self.error, &self.details) {
            (Some(m), _, _) => Some(m.clone()),
            (None, Some(e), Some(d)) => Some(format!("{}: {}", e, d)),
            (None, Some(e), None) => Some(e.clone()),
            _ => None,
        }
    }
}

// ── Portfolio mutations ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddStockRequest {
    pub name: String,
    pub quantity: u64,
    /// `None` (JSON null) when the server should use the live quote.
    pub purchase_price: Option<f64>,
    /// "Use current price" checkbox.
    pub current_price: bool,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct StockInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: f64,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddStockResponse {
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub stock_info: StockInfo,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditStockRequest {
    pub quantity: u64,
    pub purchase_price: f64,
}

// ── Chat ─────────────────────────────────────────────────────────────────────

/// One transcript entry. Serialises as `{user, timestamp}` or
/// `{bot, timestamp}`; a message can never carry both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ChatMessage {
    User {
        user: String,
        timestamp: DateTime<Utc>,
    },
    Bot {
        bot: String,
        timestamp: DateTime<Utc>,
    },
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        ChatMessage::User {
            user: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        ChatMessage::Bot {
            bot: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ChatMessage::User { user, .. } => user,
            ChatMessage::Bot { bot, .. } => bot,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, ChatMessage::User { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BotRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BotReply {
    #[serde(default)]
    pub response: Option<String>,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_holding_from_backend_json() {
        let h: Holding = serde_json::from_value(json!({
            "id": 7, "name": "Infosys", "ticker": "INFY.NS",
            "quantity": 10, "purchasePrice": 1450.5, "currentPrice": 1512.25
        }))
        .unwrap();
        assert_eq!(h.id, Some(7));
        assert_eq!(h.quantity, 10);
        assert_eq!(h.purchase_price, 1450.5);
        assert_eq!(h.current_price, 1512.25);
    }

    #[test]
    fn test_holding_lenient_numbers() {
        let h: Holding = serde_json::from_value(json!({
            "id": 1, "name": "X", "ticker": "X",
            "quantity": "12", "purchasePrice": "abc", "currentPrice": null
        }))
        .unwrap();
        assert_eq!(h.quantity, 12);
        assert_eq!(h.purchase_price, 0.0);
        assert_eq!(h.current_price, 0.0);

        let h: Holding = serde_json::from_value(json!({"name": "Y", "quantity": -3})).unwrap();
        assert_eq!(h.quantity, 0);
        assert_eq!(h.id, None);
    }

    #[test]
    fn test_chat_message_wire_shape() {
        let m = ChatMessage::user("hello");
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["user"], "hello");
        assert!(v.get("bot").is_none());
        assert!(v.get("timestamp").is_some());

        let back: ChatMessage =
            serde_json::from_value(json!({"bot": "hi", "timestamp": "2024-05-01T10:00:00Z"})).unwrap();
        assert!(!back.is_user());
        assert_eq!(back.text(), "hi");
    }

    #[test]
    fn test_add_stock_request_shape() {
        let req = AddStockRequest {
            name: "TCS".into(),
            quantity: 5,
            purchase_price: None,
            current_price: true,
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v, json!({"name": "TCS", "quantity": 5, "purchasePrice": null, "currentPrice": true}));
    }

    #[derive(Debug, Deserialize)]
    struct Loose {
        #[serde(default, deserialize_with = "lenient_string")]
        text: Option<String>,
        #[serde(default, deserialize_with = "lenient_list")]
        items: Vec<String>,
    }

    #[test]
    fn test_lenient_text_and_lists() {
        let l: Loose = serde_json::from_value(json!({"text": ["ROE", 12, "Dividend history"], "items": "only one"})).unwrap();
        assert_eq!(l.text.as_deref(), Some("ROE, 12, Dividend history"));
        assert_eq!(l.items, ["only one"]);

        let l: Loose = serde_json::from_value(json!({"text": {"nested": true}, "items": ["a", null, {"x": 1}, 2]})).unwrap();
        assert_eq!(l.text, None);
        assert_eq!(l.items, ["a", "2"]);

        let l: Loose = serde_json::from_value(json!({"text": 50000, "items": null})).unwrap();
        assert_eq!(l.text.as_deref(), Some("50000"));
        assert!(l.items.is_empty());
    }

    #[test]
    fn test_server_message_text() {
        let m: ServerMessage = serde_json::from_value(json!({"msg": "Stock not found"})).unwrap();
        assert_eq!(m.text().as_deref(), Some("Stock not found"));

        let m: ServerMessage =
            serde_json::from_value(json!({"error": "Failed to analyze stock", "details": "timeout"})).unwrap();
        assert_eq!(m.text().as_deref(), Some("Failed to analyze stock: timeout"));

        assert_eq!(ServerMessage::default().text(), None);
    }
}

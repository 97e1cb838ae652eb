// In-memory backend for view and chat tests.

use super::{ApiError, Backend};
use crate::models::{
    AddStockRequest, AddStockResponse, AnalysisRequest, ChatMessage, EditStockRequest, Holding,
    IndianMarketData, LoginRequest, PredictResponse, RecommendationReport, RegisterRequest,
    StockInfo, UsMarketData, UserProfile,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Default)]
pub struct MockBackend {
    pub holdings: Mutex<Vec<Holding>>,
    pub quote: Mutex<Option<StockInfo>>,
    pub profile: Mutex<Option<UserProfile>>,
    pub report: Mutex<Option<RecommendationReport>>,
    pub prediction: Mutex<Option<PredictResponse>>,
    pub market_us: Mutex<UsMarketData>,
    pub market_in: Mutex<IndianMarketData>,
    pub chat_replies: Mutex<VecDeque<Result<Option<String>, ApiError>>>,
    /// When set, every call fails with this HTTP status.
    pub fail_status: Mutex<Option<u16>>,
    /// Endpoint log: "POST /add-stock", ...
    pub calls: Mutex<Vec<String>>,
    pub sent_add: Mutex<Vec<AddStockRequest>>,
    pub sent_chat: Mutex<Vec<Vec<ChatMessage>>>,
    next_id: Mutex<i64>,
}

impl MockBackend {
    pub fn with_holdings(holdings: Vec<Holding>) -> Self {
        let next = holdings.iter().filter_map(|h| h.id).max().unwrap_or(0) + 1;
        let mock = Self::default();
        *mock.holdings.lock().unwrap() = holdings;
        *mock.next_id.lock().unwrap() = next;
        mock
    }

    pub fn fail_with(&self, status: u16) {
        *self.fail_status.lock().unwrap() = Some(status);
    }

    pub fn recover(&self) {
        *self.fail_status.lock().unwrap() = None;
    }

    pub fn push_chat_reply(&self, reply: Result<Option<String>, ApiError>) {
        self.chat_replies.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call.into());
        match *self.fail_status.lock().unwrap() {
            Some(status) => Err(ApiError::Http {
                status,
                message: "mock failure".into(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn login(&self, _req: &LoginRequest) -> Result<(), ApiError> {
        self.record("POST /login")
    }

    async fn register(&self, req: &RegisterRequest) -> Result<Option<String>, ApiError> {
        self.record("POST /register")?;
        Ok(Some(format!("User {} registered successfully", req.full_name)))
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.record("POST /logout")
    }

    async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.record("GET /protected")?;
        self.profile.lock().unwrap().clone().ok_or(ApiError::Http {
            status: 401,
            message: "Missing cookie \"access_token\"".into(),
        })
    }

    async fn list_holdings(&self) -> Result<Vec<Holding>, ApiError> {
        self.record("GET /get-stocks")?;
        Ok(self.holdings.lock().unwrap().clone())
    }

    async fn add_stock(&self, req: &AddStockRequest) -> Result<AddStockResponse, ApiError> {
        self.record("POST /add-stock")?;
        self.sent_add.lock().unwrap().push(req.clone());

        let quote = self.quote.lock().unwrap().clone().unwrap_or(StockInfo {
            name: req.name.clone(),
            symbol: req.name.to_uppercase(),
            price: req.purchase_price.unwrap_or(100.0),
            currency: Some("INR".into()),
        });
        let price = match (req.current_price, req.purchase_price) {
            (false, Some(p)) => p,
            _ => quote.price,
        };

        let mut id = self.next_id.lock().unwrap();
        self.holdings.lock().unwrap().push(Holding {
            id: Some(*id),
            name: quote.name.clone(),
            ticker: quote.symbol.clone(),
            quantity: req.quantity,
            purchase_price: price,
            current_price: quote.price,
        });
        *id += 1;

        Ok(AddStockResponse {
            msg: Some(format!("Stock {} ({}) added successfully", quote.name, quote.symbol)),
            stock_info: StockInfo { price, ..quote },
        })
    }

    async fn edit_stock(&self, id: i64, req: &EditStockRequest) -> Result<(), ApiError> {
        self.record(format!("PUT /edit-stock/{}", id))?;
        let mut holdings = self.holdings.lock().unwrap();
        let h = holdings
            .iter_mut()
            .find(|h| h.id == Some(id))
            .ok_or(ApiError::Http { status: 404, message: "Stock not found".into() })?;
        h.quantity = req.quantity;
        h.purchase_price = req.purchase_price;
        Ok(())
    }

    async fn delete_stock(&self, id: i64) -> Result<(), ApiError> {
        self.record(format!("DELETE /delete-stock/{}", id))?;
        let mut holdings = self.holdings.lock().unwrap();
        let before = holdings.len();
        holdings.retain(|h| h.id != Some(id));
        if holdings.len() == before {
            return Err(ApiError::Http { status: 404, message: "Stock not found".into() });
        }
        Ok(())
    }

    async fn analyze(&self, _req: &AnalysisRequest) -> Result<RecommendationReport, ApiError> {
        self.record("POST /analysis")?;
        Ok(self.report.lock().unwrap().clone().unwrap_or_default())
    }

    async fn predict(&self, _company: &str) -> Result<PredictResponse, ApiError> {
        self.record("POST /predict")?;
        Ok(self.prediction.lock().unwrap().clone().unwrap_or_default())
    }

    async fn market_us(&self) -> Result<UsMarketData, ApiError> {
        self.record("GET /market-data-us")?;
        Ok(self.market_us.lock().unwrap().clone())
    }

    async fn market_in(&self) -> Result<IndianMarketData, ApiError> {
        self.record("GET /market-data-in")?;
        Ok(self.market_in.lock().unwrap().clone())
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<Option<String>, ApiError> {
        self.record("POST /bot")?;
        self.sent_chat.lock().unwrap().push(messages.to_vec());
        self.chat_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Some("ok".to_string())))
    }
}

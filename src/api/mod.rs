pub mod error;
pub mod http_client;
pub mod session;

#[cfg(test)]
pub mod mock;

use crate::config::ApiConfig;
use crate::models::market::{IndianMarketRow, UsMarketRow};
use crate::models::prediction::PredictRequest;
use crate::models::{
    AddStockRequest, AddStockResponse, AnalysisRequest, BotReply, BotRequest, ChatMessage,
    EditStockRequest, Holding, IndianMarketData, LoginRequest, PredictResponse,
    RecommendationReport, RegisterRequest, ServerMessage, UsMarketData, UserProfile,
};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, info, warn};

pub use self::error::ApiError;
use self::http_client::HttpClient;
use self::session::SessionStore;

// ── Backend trait ─────────────────────────────────────────────────────────────

/// The TradeNexus backend as the views see it. One method per endpoint.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn login(&self, req: &LoginRequest) -> Result<(), ApiError>;
    async fn register(&self, req: &RegisterRequest) -> Result<Option<String>, ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
    async fn profile(&self) -> Result<UserProfile, ApiError>;

    async fn list_holdings(&self) -> Result<Vec<Holding>, ApiError>;
    async fn add_stock(&self, req: &AddStockRequest) -> Result<AddStockResponse, ApiError>;
    async fn edit_stock(&self, id: i64, req: &EditStockRequest) -> Result<(), ApiError>;
    async fn delete_stock(&self, id: i64) -> Result<(), ApiError>;

    async fn analyze(&self, req: &AnalysisRequest) -> Result<RecommendationReport, ApiError>;
    async fn predict(&self, company: &str) -> Result<PredictResponse, ApiError>;
    async fn market_us(&self) -> Result<UsMarketData, ApiError>;
    async fn market_in(&self) -> Result<IndianMarketData, ApiError>;

    /// Send the capped transcript; `Ok(None)` when the bot had nothing to say.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Option<String>, ApiError>;
}

// ── HTTP implementation ──────────────────────────────────────────────────────

pub struct ApiClient {
    http: HttpClient,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = HttpClient::new(config)?;
        debug!("Backend at {}", http.base_url());
        let session = SessionStore::new(&config.session_file);

        match session.load() {
            Ok(Some(cookie)) => {
                http.restore_session(&cookie);
                debug!("Restored session from {:?}", session.path());
            }
            Ok(None) => debug!("No stored session"),
            Err(e) => warn!("Could not read session file {:?}: {}", session.path(), e),
        }

        Ok(Self { http, session })
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn login(&self, req: &LoginRequest) -> Result<(), ApiError> {
        let _: ServerMessage = self.http.send_json(Method::POST, "/login", req).await?;

        match self.http.session_cookie() {
            Some(cookie) => self.session.save(&cookie)?,
            None => warn!("Login succeeded but no session cookie was set"),
        }
        info!("Logged in as {}", req.username);
        Ok(())
    }

    async fn register(&self, req: &RegisterRequest) -> Result<Option<String>, ApiError> {
        let msg: ServerMessage = self.http.send_json(Method::POST, "/register", req).await?;
        Ok(msg.text())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let result = self.http.send_unit::<()>(Method::POST, "/logout", None).await;
        // the local session goes either way
        self.session.clear()?;
        result
    }

    async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.http.get_json("/protected").await
    }

    async fn list_holdings(&self) -> Result<Vec<Holding>, ApiError> {
        match self.http.get_json::<Vec<Holding>>("/get-stocks").await {
            Ok(holdings) => Ok(holdings),
            // the backend answers 404 {msg: "No stocks found"} for an empty portfolio
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    async fn add_stock(&self, req: &AddStockRequest) -> Result<AddStockResponse, ApiError> {
        self.http.send_json(Method::POST, "/add-stock", req).await
    }

    async fn edit_stock(&self, id: i64, req: &EditStockRequest) -> Result<(), ApiError> {
        self.http
            .send_unit(Method::PUT, &format!("/edit-stock/{}", id), Some(req))
            .await
    }

    async fn delete_stock(&self, id: i64) -> Result<(), ApiError> {
        self.http
            .send_unit::<()>(Method::DELETE, &format!("/delete-stock/{}", id), None)
            .await
    }

    async fn analyze(&self, req: &AnalysisRequest) -> Result<RecommendationReport, ApiError> {
        self.http.send_json(Method::POST, "/analysis", req).await
    }

    async fn predict(&self, company: &str) -> Result<PredictResponse, ApiError> {
        let req = PredictRequest {
            company: company.to_string(),
        };
        self.http.send_json(Method::POST, "/predict", &req).await
    }

    async fn market_us(&self) -> Result<UsMarketData, ApiError> {
        let tables: Vec<Vec<UsMarketRow>> = self.http.get_json("/market-data-us").await?;
        Ok(UsMarketData::from_tables(tables))
    }

    async fn market_in(&self) -> Result<IndianMarketData, ApiError> {
        let tables: Vec<Vec<IndianMarketRow>> = self.http.get_json("/market-data-in").await?;
        Ok(IndianMarketData::from_tables(tables))
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<Option<String>, ApiError> {
        let req = BotRequest {
            messages: messages.to_vec(),
        };
        let reply: BotReply = self.http.send_json(Method::POST, "/bot", &req).await?;
        Ok(reply.response.filter(|r| !r.trim().is_empty()))
    }
}

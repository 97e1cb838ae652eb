use crate::api::error::ApiError;
use crate::config::ApiConfig;
use crate::models::ServerMessage;
use anyhow::{Context, Result};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// JSON-over-HTTP transport with a shared cookie jar. Every request carries
/// the session cookie and is bounded by the configured timeout. Nothing is
/// retried.
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: Url,
    jar: Arc<Jar>,
}

impl HttpClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .cookie_provider(Arc::clone(&jar))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            inner,
            base_url: parse_base_url(&config.base_url)?,
            jar,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path against the base URL.
    /// "http://host:5000" + "/edit-stock/3" → "http://host:5000/edit-stock/3"
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Cookie header the jar would send to the backend, if any.
    pub fn session_cookie(&self) -> Option<String> {
        self.jar
            .cookies(&self.base_url)
            .and_then(|h| h.to_str().ok().map(str::to_string))
    }

    /// Seed the jar from a stored `name=value; name2=value2` header.
    pub fn restore_session(&self, header: &str) {
        for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            self.jar.add_cookie_str(pair, &self.base_url);
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.send::<()>(Method::GET, path, None).await?;
        Ok(resp.json::<T>().await?)
    }

    pub async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send(method, path, Some(body)).await?;
        Ok(resp.json::<T>().await?)
    }

    /// Send and only check the status; the body is discarded.
    pub async fn send_unit<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.send(method, path, body).await.map(drop)
    }

    async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        debug!("{} {}", method, url);

        let mut req = self.inner.request(method.clone(), url);
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ServerMessage>(&text)
            .ok()
            .and_then(|m| m.text())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

        warn!("{} {} → {}: {}", method, path, status, message);
        Err(ApiError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

/// Base URL with a trailing slash so relative joins keep any path prefix.
fn parse_base_url(raw: &str) -> Result<Url> {
    let normalised = format!("{}/", raw.trim().trim_end_matches('/'));
    Url::parse(&normalised).with_context(|| format!("Invalid API base URL {:?}", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpClient {
        HttpClient::new(&ApiConfig {
            base_url: base.to_string(),
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_join() {
        let c = client("http://localhost:5000");
        assert_eq!(c.endpoint("/get-stocks").unwrap().as_str(), "http://localhost:5000/get-stocks");
        assert_eq!(c.endpoint("edit-stock/3").unwrap().as_str(), "http://localhost:5000/edit-stock/3");

        let c = client("https://example.com/api/");
        assert_eq!(c.endpoint("/predict").unwrap().as_str(), "https://example.com/api/predict");
    }

    #[test]
    fn test_restore_session_round_trip() {
        let c = client("http://localhost:5000");
        assert!(c.session_cookie().is_none());

        c.restore_session("access_token=abc.def.ghi");
        assert_eq!(c.session_cookie().as_deref(), Some("access_token=abc.def.ghi"));
    }

    #[test]
    fn test_bad_base_url() {
        let err = HttpClient::new(&ApiConfig {
            base_url: "not a url".into(),
            ..ApiConfig::default()
        });
        assert!(err.is_err());
    }
}

//! Login / register forms and the session check behind the header.

use crate::api::{ApiError, Backend};
use crate::models::{LoginRequest, RegisterRequest, UserProfile};
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginRequest, ApiError> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(ApiError::validation("Username and password are required."));
        }
        Ok(LoginRequest {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
        })
    }

    pub async fn submit<B: Backend + ?Sized>(&self, backend: &B) -> Result<(), ApiError> {
        let req = self.validate()?;
        backend.login(&req).await
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<RegisterRequest, ApiError> {
        let required = [&self.full_name, &self.email, &self.username, &self.password];
        if required.iter().any(|f| f.trim().is_empty()) {
            return Err(ApiError::validation("All fields are required."));
        }
        if self.password != self.confirm_password {
            return Err(ApiError::validation("Passwords do not match."));
        }
        Ok(RegisterRequest {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
        })
    }

    /// Returns the server's confirmation message, if it sent one.
    pub async fn submit<B: Backend + ?Sized>(&self, backend: &B) -> Result<Option<String>, ApiError> {
        let req = self.validate()?;
        let msg = backend.register(&req).await?;
        info!("Registered {}", req.username);
        Ok(msg)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthStatus {
    SignedIn(UserProfile),
    SignedOut,
}

impl AuthStatus {
    pub fn display_name(&self) -> Option<&str> {
        match self {
            AuthStatus::SignedIn(p) => p.full_name.as_deref().or(p.username.as_deref()),
            AuthStatus::SignedOut => None,
        }
    }
}

/// Any failure means "send the user to login"; only non-auth failures are logged.
pub async fn check_session<B: Backend + ?Sized>(backend: &B) -> AuthStatus {
    match backend.profile().await {
        Ok(profile) => AuthStatus::SignedIn(profile),
        Err(e) if e.is_unauthorized() => AuthStatus::SignedOut,
        Err(e) => {
            warn!("Auth check failed: {}", e);
            AuthStatus::SignedOut
        }
    }
}

//! Клиент сервиса аккаунтов: обмен email/пароля на bearer-токен платформы.

use contracts::system::auth::{AuthResponse, LoginRequest, SignupRequest};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::time::Duration;

use super::config;
use super::voice_platform::client::extract_error_message;
use super::voice_platform::PlatformError;

/// Один пул соединений на все запросы login/signup
static ACCOUNT_HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    let timeout = Duration::from_secs(config::get().account_service.timeout_secs);
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::error!("Failed to build account HTTP client: {}", e);
            reqwest::Client::new()
        })
});

pub struct AccountClient {
    client: &'static reqwest::Client,
    base_url: String,
}

impl AccountClient {
    pub fn from_config() -> Self {
        Self::new(config::get().account_service.base_url.clone())
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: &ACCOUNT_HTTP_CLIENT,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, PlatformError> {
        request.validate().map_err(PlatformError::Validation)?;
        self.post("/auth/login", request).await
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, PlatformError> {
        request.validate().map_err(PlatformError::Validation)?;
        self.post("/auth/signup", request).await
    }

    async fn post<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<AuthResponse, PlatformError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = extract_error_message(status.as_u16(), &text);
            return Err(if status == reqwest::StatusCode::UNAUTHORIZED {
                PlatformError::Unauthorized(message)
            } else {
                PlatformError::Api {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        let auth: AuthResponse =
            serde_json::from_str(&text).map_err(|e| PlatformError::Decode(e.to_string()))?;
        if auth.token.trim().is_empty() {
            return Err(PlatformError::Decode("Account service returned an empty token".into()));
        }
        Ok(auth)
    }
}

//! reqwest-backed portal client
//!
//! Keeps the session cookie in its own cookie store, so after `login` every
//! page request carries `auth_token` the way a browser would.

use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use serde_json::{json, Value};
use tokio::time::Duration;

use super::models::UseCasePage;
use super::source::{FetchError, Navigator, PageSource};

pub struct PortalClient {
    http_client: Client,
    base_url: String,
    bearer: Option<String>,
}

impl PortalClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http_client = Client::builder()
            .cookie_store(true)
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer: None,
        })
    }

    /// Send `Authorization: Bearer <token>` on page requests
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchange the token for a session cookie
    pub async fn login(&self, token: &str) -> Result<(), FetchError> {
        let response = self
            .http_client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "token": token }))
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if response.status().is_success() {
            tracing::info!("Logged in to {}", self.base_url);
            return Ok(());
        }

        Err(error_from_response(response, "Authentication failed").await)
    }

    pub async fn logout(&self) -> Result<(), FetchError> {
        let response = self
            .http_client
            .post(self.url("/api/auth/logout"))
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(error_from_response(response, "Logout failed").await)
    }

    /// Log out, then go to the login surface even if logout failed
    pub async fn logout_and_redirect(&self, navigator: &dyn Navigator) -> Result<(), FetchError> {
        let result = self.logout().await;
        if let Err(e) = &result {
            tracing::error!("Logout error: {}", e);
        }
        navigator.navigate_to_login();
        result
    }
}

/// Turn a non-2xx response into [`FetchError::Http`], using the portal's
/// `{"error": ...}` body when present
async fn error_from_response(response: Response, fallback: &str) -> FetchError {
    let status = response.status();
    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| fallback.to_string());

    FetchError::Http {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl PageSource for PortalClient {
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<UseCasePage, FetchError> {
        let mut request = self
            .http_client
            .get(self.url("/api/use-cases"))
            .header(header::ACCEPT, "application/json")
            .query(&[("page", page), ("page_size", page_size)]);

        if let Some(token) = &self.bearer {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        // A rejected session sends the user back to login
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(FetchError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(error_from_response(response, "Failed to fetch data").await);
        }

        response
            .json::<UseCasePage>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

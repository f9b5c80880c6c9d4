// Upstream client implementation
// Thin wrapper over the use case API

use reqwest::{header, Client};
use serde_json::Value;
use tokio::time::Duration;

use crate::proxy::config::UpstreamConfig;
use crate::proxy::error::PortalError;

const USE_CASES_PATH: &str = "use-cases";
const USER_AGENT: &str = concat!("usecase-portal/", env!("CARGO_PKG_VERSION"));

pub struct UpstreamClient {
    http_client: Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, String> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(Duration::from_secs(config.request_timeout.max(1)))
            .user_agent(USER_AGENT);

        let proxy = &config.proxy;
        if proxy.enabled && !proxy.url.is_empty() {
            let upstream_proxy = reqwest::Proxy::all(&proxy.url)
                .map_err(|e| format!("Invalid upstream proxy {}: {}", proxy.url, e))?;
            builder = builder.proxy(upstream_proxy);
            tracing::info!("UpstreamClient enabled proxy: {}", proxy.url);
        } else {
            builder = builder.no_proxy();
        }

        let http_client = builder
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
        })
    }

    /// Build the listing URL
    fn build_url(base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), USE_CASES_PATH)
    }

    /// Fetch one page of use cases.
    ///
    /// `page` and `page_size` are sent as given. A non-2xx status becomes
    /// [`PortalError::UpstreamError`]; transport, timeout and decode failures
    /// become [`PortalError::InternalError`].
    pub async fn fetch_use_cases(&self, page: &str, page_size: &str) -> Result<Value, PortalError> {
        let url = Self::build_url(&self.base_url);

        let response = self
            .http_client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .query(&[("page", page), ("page_size", page_size)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PortalError::InternalError(format!("Upstream request timed out at {}: {}", url, e))
                } else {
                    PortalError::InternalError(format!("HTTP request failed at {}: {}", url, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Upstream {} returned {} (page={}, page_size={})", url, status, page, page_size);
            return Err(PortalError::UpstreamError {
                status: status.as_u16(),
            });
        }

        tracing::debug!("Upstream request succeeded | page={} page_size={}", page, page_size);

        response
            .json::<Value>()
            .await
            .map_err(|e| PortalError::InternalError(format!("Parse json failed: {}", e)))
    }
}

//! HTTP implementation of the remote API client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client as HttpClient, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::{ApiClient, ApiRequest};
use crate::config::{ApiConfig, DEFAULT_API_BASE_URL};
use crate::error::{Error, Result};

/// Header carrying the session identifier
pub const SESSION_HEADER: &str = "X-Session-Id";

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Backend client over HTTPS
#[derive(Clone)]
pub struct HttpApiClient {
    http_client: HttpClient,
    base_url: String,
}

impl std::fmt::Debug for HttpApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Builder for creating an HttpApiClient
#[derive(Default)]
pub struct HttpApiClientBuilder {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl HttpApiClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL (defaults to the public API)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn build(self) -> Result<HttpApiClient> {
        let timeout = Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .user_agent(concat!("courier/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::NetworkError)?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(HttpApiClient {
            http_client,
            base_url,
        })
    }
}

impl HttpApiClient {
    pub fn builder() -> HttpApiClientBuilder {
        HttpApiClientBuilder::new()
    }

    /// Client configured from the `[api]` config section
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::builder()
            .base_url(config.resolved_base_url())
            .timeout_secs(config.timeout_secs)
            .build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn request(&self, request: ApiRequest) -> Result<Option<Value>> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!(method = %request.method, %url, "Sending API request");

        let mut builder = self
            .http_client
            .request(request.method, &url)
            .header(ACCEPT, "application/json");
        if let Some(session_id) = &request.session_id {
            builder = builder.header(SESSION_HEADER, session_id);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!(%url, "API returned 404");
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: error_message(&body, status),
            });
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

/// Best human-readable message from an error response body
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(message) = value.get(key).and_then(Value::as_str) {
                return message.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

//! HTTP transport to the local model service
//!
//! The transport only moves bytes: it reports the status and raw body of a
//! response and leaves interpretation to the model client and health prober.

use async_trait::async_trait;
use inboxsweep_core::ModelServiceError;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Default address of a locally running Ollama
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound calls to the model service
///
/// Errors are transport-level only: a response with any status is `Ok`.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    /// `GET /api/tags`
    async fn get_tags(&self, timeout: Duration) -> Result<RawResponse, ModelServiceError>;

    /// `POST /api/chat` with a JSON body
    async fn post_chat(
        &self,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<RawResponse, ModelServiceError>;
}

/// Transport backed by a shared `reqwest` client
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the service at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self, ModelServiceError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ModelServiceError::transport(e.to_string()))?;

        Ok(Self::with_client(client, base_url))
    }

    /// Create a transport reusing an existing client
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: normalize_base_url(&base_url.into()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read(response: reqwest::Response) -> Result<RawResponse, ModelServiceError> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;
        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl ModelTransport for HttpTransport {
    async fn get_tags(&self, timeout: Duration) -> Result<RawResponse, ModelServiceError> {
        let url = format!("{}/api/tags", self.base_url);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        Self::read(response).await
    }

    async fn post_chat(
        &self,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<RawResponse, ModelServiceError> {
        let url = format!("{}/api/chat", self.base_url);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        Self::read(response).await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ModelServiceError {
    if err.is_timeout() {
        ModelServiceError::Timeout
    } else {
        ModelServiceError::transport(err.to_string())
    }
}

/// Strip trailing slashes so paths can be appended directly
fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Serialize a request body for [`ModelTransport::post_chat`]
pub fn to_body<T: Serialize>(value: &T) -> Result<serde_json::Value, ModelServiceError> {
    serde_json::to_value(value).map_err(|e| ModelServiceError::transport(e.to_string()))
}

//! Availability probe for the local model service

use crate::transport::ModelTransport;
use async_trait::async_trait;
use inboxsweep_core::HealthStatus;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default bound on a health probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Source of [`HealthStatus`]
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Query the service; every failure collapses to unavailable
    async fn probe(&self) -> HealthStatus;
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Option<Vec<ModelTag>>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    #[serde(default)]
    name: String,
}

/// Probe backed by `GET /api/tags`
pub struct OllamaHealthProber {
    transport: Arc<dyn ModelTransport>,
    timeout: Duration,
}

impl OllamaHealthProber {
    pub fn new(transport: Arc<dyn ModelTransport>) -> Self {
        Self::with_timeout(transport, DEFAULT_PROBE_TIMEOUT)
    }

    pub fn with_timeout(transport: Arc<dyn ModelTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }
}

#[async_trait]
impl HealthProbe for OllamaHealthProber {
    async fn probe(&self) -> HealthStatus {
        let response = match self.transport.get_tags(self.timeout).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Model service unreachable: {}", e);
                return HealthStatus::unavailable();
            }
        };

        if !response.is_success() {
            warn!("Model service health check returned {}", response.status);
            return HealthStatus::unavailable();
        }

        match serde_json::from_str::<TagsResponse>(&response.body) {
            Ok(tags) => {
                let models: Vec<String> = tags
                    .models
                    .unwrap_or_default()
                    .into_iter()
                    .map(|m| m.name)
                    .filter(|name| !name.is_empty())
                    .collect();
                debug!("Model service available with {} models", models.len());
                HealthStatus::available(models)
            }
            Err(e) => {
                warn!("Unreadable model listing: {}", e);
                HealthStatus::unavailable()
            }
        }
    }
}

//! Scan endpoint logic
//!
//! One scan is a request-scoped state machine: validate the request, probe
//! the model service, resolve the model to run, classify in batches, and
//! shape the response. Nothing is kept between scans.

use crate::config::ServerConfig;
use inboxsweep_classifier::{
    BatchClassifier, EmailClassifier, HealthProbe, HttpTransport, ModelTransport, OllamaClassifier,
    OllamaHealthProber,
};
use inboxsweep_core::{Email, HealthStatus, ScanError, ScanRequest, ScanResponse};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};

/// Message for a missing or empty email list
pub const NO_EMAILS: &str = "No emails provided";

/// Classification endpoint shared by the HTTP routes and the CLI
pub struct ScanService {
    prober: Arc<dyn HealthProbe>,
    batch: BatchClassifier,
    default_model: String,
}

impl ScanService {
    pub fn new(
        prober: Arc<dyn HealthProbe>,
        classifier: Arc<dyn EmailClassifier>,
        batch_size: usize,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            prober,
            batch: BatchClassifier::new(classifier, batch_size),
            default_model: default_model.into(),
        }
    }

    /// Wire the service to the Ollama instance named in `config`
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let transport: Arc<dyn ModelTransport> = Arc::new(HttpTransport::new(&config.ollama_url)?);
        let prober = Arc::new(OllamaHealthProber::with_timeout(
            transport.clone(),
            config.health_timeout(),
        ));
        let classifier = Arc::new(OllamaClassifier::new(transport, config.chat_settings()));

        Ok(Self::new(
            prober,
            classifier,
            config.batch_size,
            config.default_model.clone(),
        ))
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Current availability of the model service
    pub async fn health(&self) -> HealthStatus {
        self.prober.probe().await
    }

    /// Run a scan from a raw JSON request body
    pub async fn scan_body(&self, body: &[u8]) -> Result<ScanResponse, ScanError> {
        let request = parse_request(body)?;
        self.scan(request).await
    }

    /// Run a scan
    pub async fn scan(&self, request: ScanRequest) -> Result<ScanResponse, ScanError> {
        let scan_id = uuid::Uuid::new_v4();
        let span = info_span!("scan", %scan_id, emails = request.emails.len());

        async move {
            let start = Instant::now();
            let outcome = self.run(request).await;

            let status = match &outcome {
                Ok(_) => "ok",
                Err(ScanError::InvalidRequest(_)) => "invalid_request",
                Err(ScanError::ServiceUnavailable) => "service_unavailable",
                Err(ScanError::NoModelInstalled { .. }) => "no_model",
                Err(ScanError::Internal(_)) => "internal_error",
            };
            metrics::counter!("inboxsweep_scans_total", "status" => status).increment(1);
            metrics::histogram!("inboxsweep_scan_latency_ms")
                .record(start.elapsed().as_millis() as f64);

            outcome
        }
        .instrument(span)
        .await
    }

    async fn run(&self, request: ScanRequest) -> Result<ScanResponse, ScanError> {
        validate_emails(&request.emails)?;

        let health = self.prober.probe().await;
        if !health.available {
            warn!("Model service unavailable, rejecting scan");
            return Err(ScanError::ServiceUnavailable);
        }

        let requested = request
            .model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.default_model.clone());

        let model = resolve_model(&requested, &health.models).ok_or_else(|| {
            ScanError::NoModelInstalled {
                default_model: self.default_model.clone(),
            }
        })?;

        if model != requested {
            info!("Model {} not installed, falling back to {}", requested, model);
        }

        // Classification runs on its own task so a fault inside it surfaces
        // here as an error instead of unwinding through the caller
        let batch = self.batch.clone();
        let emails = request.emails;
        let task_model = model.clone();
        let results = tokio::spawn(
            async move { batch.classify_all(&emails, &task_model).await }.in_current_span(),
        )
        .await
        .map_err(|e| ScanError::internal(e.to_string()))?;

        info!("Scan complete: {} emails with {}", results.len(), model);

        Ok(ScanResponse {
            total_processed: results.len(),
            results,
            model,
        })
    }
}

/// Parse and validate a raw scan request body
///
/// A missing, non-array, or empty `emails` field is reported as
/// [`NO_EMAILS`]; any other shape problem carries the decoder's message.
pub fn parse_request(body: &[u8]) -> Result<ScanRequest, ScanError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ScanError::invalid_request(format!("Invalid request body: {}", e)))?;

    let emails = match value.get("emails") {
        Some(Value::Array(items)) if !items.is_empty() => items.clone(),
        _ => return Err(ScanError::invalid_request(NO_EMAILS)),
    };

    let emails: Vec<Email> = serde_json::from_value(Value::Array(emails))
        .map_err(|e| ScanError::invalid_request(format!("Invalid email payload: {}", e)))?;

    let model = value
        .get("model")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string);

    Ok(ScanRequest { emails, model })
}

/// Reject empty lists and duplicate identifiers
pub fn validate_emails(emails: &[Email]) -> Result<(), ScanError> {
    if emails.is_empty() {
        return Err(ScanError::invalid_request(NO_EMAILS));
    }

    let mut seen = HashSet::with_capacity(emails.len());
    for email in emails {
        if !seen.insert(email.id.as_str()) {
            return Err(ScanError::invalid_request(format!(
                "Duplicate email id: {}",
                email.id
            )));
        }
    }

    Ok(())
}

/// Pick the model to run
///
/// The requested name is kept when it prefixes any installed model (so
/// `mistral` matches `mistral:latest`); otherwise the first installed model
/// is used. `None` when nothing is installed.
pub fn resolve_model(requested: &str, installed: &[String]) -> Option<String> {
    if installed.iter().any(|m| m.starts_with(requested)) {
        return Some(requested.to_string());
    }
    installed.first().cloned()
}

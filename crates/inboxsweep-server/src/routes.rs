//! HTTP routes and handlers

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use inboxsweep_core::{Email, HealthStatus, ScanError, ScanResponse};
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::fixture;

pub async fn health() -> &'static str {
    "OK"
}

pub async fn metrics(State(state): State<AppState>) -> String {
    state
        .metrics_handle
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

/// `POST /scan`
pub async fn scan(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ScanResponse>, AppError> {
    info!("Received scan request ({} bytes)", body.len());
    let response = state.service.scan_body(&body).await?;
    Ok(Json(response))
}

/// `GET /scan` - pre-flight availability check
pub async fn scan_health(State(state): State<AppState>) -> Json<HealthStatus> {
    let status = state.service.health().await;
    debug!("Health pre-flight: available={}", status.available);
    Json(status)
}

/// `GET /emails` - the built-in sample inbox
pub async fn sample_emails() -> Result<Json<Vec<Email>>, AppError> {
    let emails = fixture::sample_emails().map_err(|e| ScanError::internal(e.to_string()))?;
    Ok(Json(emails))
}

pub async fn fallback() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

/// Boundary error rendered as a JSON body
#[derive(Debug)]
pub struct AppError(pub ScanError);

impl From<ScanError> for AppError {
    fn from(err: ScanError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.0.to_string();

        let (status, body) = match self.0 {
            ScanError::InvalidRequest(_) => {
                debug!("Rejected scan request: {}", message);
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            ScanError::ServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "error": message, "ollamaAvailable": false }),
            ),
            ScanError::NoModelInstalled { .. } => {
                warn!("{}", message);
                (
                    StatusCode::NOT_FOUND,
                    json!({
                        "error": message,
                        "ollamaAvailable": true,
                        "availableModels": [],
                    }),
                )
            }
            ScanError::Internal(_) => {
                error!("Scan API error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
            }
        };

        (status, Json(body)).into_response()
    }
}

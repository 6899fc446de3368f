use crate::config::ServerConfig;
use crate::routes;
use crate::scan::ScanService;
use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use inboxsweep_core::ScanError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Classification endpoint
    pub service: Arc<ScanService>,

    /// Prometheus handle for rendering, absent when no recorder is installed
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(service: ScanService, metrics_handle: Option<PrometheusHandle>) -> Self {
        Self {
            service: Arc::new(service),
            metrics_handle,
        }
    }
}

/// Build the Axum application
pub fn build_app(state: AppState, cors_allow_any: bool) -> Router {
    // CORS defaults to the local web client; override only for explicit use.
    let cors_layer = if cors_allow_any {
        CorsLayer::new()
            .allow_origin(cors::Any)
            .allow_methods(cors::Any)
            .allow_headers(cors::Any)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list([
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
            ]))
            .allow_methods(cors::Any)
            .allow_headers(cors::Any)
    };

    Router::new()
        .route("/health", get(routes::health))
        .route("/metrics", get(routes::metrics))
        .route("/scan", get(routes::scan_health).post(routes::scan))
        .route("/emails", get(routes::sample_emails))
        .fallback(routes::fallback)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Render a handler panic as the scan endpoint's 500 body
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown error".to_string()
    };

    let message = ScanError::internal(detail).to_string();
    error!("Scan API error: {}", message);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

/// Run the server until a shutdown signal arrives
pub async fn run_server(
    config: ServerConfig,
    metrics_handle: Option<PrometheusHandle>,
) -> anyhow::Result<()> {
    let service = ScanService::from_config(&config)?;
    let app = build_app(AppState::new(service, metrics_handle), config.cors_allow_any);

    let addr: SocketAddr = format!("{}:{}", config.listen, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("InboxSweep listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}

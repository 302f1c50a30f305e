//! HTTP surface for the evaluator.
//!
//! `POST /evaluate` scores a batch, `GET /health` reports liveness.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use common::{Error, Tolerances, TradeOutcome};
use serde::Deserialize;
use serde_json::{json, Value};
use suitability::TradeEvaluator;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

use crate::config::ServerConfig;

const SERVICE_NAME: &str = "trade-scorer";

#[derive(Clone)]
pub struct AppState {
    evaluator: Arc<TradeEvaluator>,
}

impl AppState {
    pub fn new(evaluator: TradeEvaluator) -> Self {
        Self {
            evaluator: Arc::new(evaluator),
        }
    }
}

/// Request body for `POST /evaluate`.
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    #[serde(default)]
    pub tolerances: Option<Tolerances>,
    /// Kept raw so a malformed trade only fails its own slot.
    #[serde(default)]
    pub trades: Option<Vec<Value>>,
}

// ── Errors ────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::EmptyInput => Self::bad_request(Error::EmptyInput.to_string()),
            other => {
                error!("Evaluation failed: {}", other);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Internal server error".into(),
                }
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn evaluate(
    State(state): State<AppState>,
    payload: Result<Json<EvaluateRequest>, JsonRejection>,
) -> Result<Json<Vec<TradeOutcome>>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected evaluate request: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;

    let tolerances = request.tolerances.unwrap_or_default();
    let trades = request.trades.unwrap_or_default();
    let outcomes = state.evaluator.evaluate_json(&tolerances, &trades)?;

    let rejected = outcomes.iter().filter(|o| o.is_rejected()).count();
    info!(
        "📊 Evaluated {} trades ({} rejected)",
        outcomes.len(),
        rejected
    );
    Ok(Json(outcomes))
}

// ── Router ────────────────────────────────────────────────────────────

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    if server.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = server
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/evaluate", post(evaluate))
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .layer(cors_layer(server))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Received shutdown signal, stopping server...");
}

/// Bind and serve until Ctrl-C.
pub async fn serve(server: &ServerConfig, evaluator: TradeEvaluator) -> Result<(), Error> {
    let addr: SocketAddr = format!("{}:{}", server.host, server.port)
        .parse()
        .map_err(|e| Error::Config(format!("Invalid bind address: {}", e)))?;

    let listener = TcpListener::bind(addr).await?;
    info!("🌐 Listening on http://{}", addr);

    let app = build_router(AppState::new(evaluator), server);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("✅ Server stopped gracefully");
    Ok(())
}

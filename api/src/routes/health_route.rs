//! GET /health: Ollama readiness for the generation and embedding profiles.

use std::sync::Arc;

use ai_llm_service::health_service::HealthStatus;
use axum::{extract::State, http::StatusCode, response::Response};
use serde::Serialize;

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub backends: Vec<HealthStatus>,
}

/// `200` when every profile is healthy, `503` otherwise (same body).
pub async fn health_route(State(state): State<Arc<AppState>>) -> Response {
    let backends = state.llm.health_all().await;
    let ok = backends.iter().all(|b| b.ok);
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    ApiResponse::success(HealthResponse { ok, backends }).into_response_with_status(status)
}

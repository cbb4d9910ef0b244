//! GET /status: connectivity and offline cache counters.

use std::sync::Arc;

use axum::{extract::State, response::Response};
use serde::Serialize;

use crate::core::{app_state::AppState, http::response_envelope::ok};

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Whether online retrieval is currently possible.
    pub online: bool,
    pub cached_documents: usize,
    pub vectors: usize,
    pub dim: usize,
}

pub async fn status_route(State(state): State<Arc<AppState>>) -> Response {
    let online = state.contextor.router().is_online().await;
    let stats = state.store.stats().await;
    ok(StatusResponse {
        online,
        cached_documents: stats.documents,
        vectors: stats.vectors,
        dim: stats.dim,
    })
}

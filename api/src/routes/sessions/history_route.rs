//! GET/DELETE /sessions/{id}/history

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Response,
};
use contextor::Exchange;
use serde::Serialize;

use crate::{
    core::{app_state::AppState, http::response_envelope::ok},
    error_handler::{AppError, AppResult},
};

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub session_id: String,
    /// Newest first.
    pub exchanges: Vec<Exchange>,
}

#[derive(Debug, Serialize)]
pub struct ClearedResponse {
    pub session_id: String,
    pub cleared: usize,
}

pub async fn get_history_route(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let session = state
        .existing_session(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("session '{id}'")))?;
    let exchanges = session.lock().await.history().cloned().collect();
    Ok(ok(HistoryResponse {
        session_id: id,
        exchanges,
    }))
}

/// Clears the history and forgets the session id.
pub async fn clear_history_route(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let session = state
        .remove_session(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("session '{id}'")))?;
    let mut session = session.lock().await;
    let cleared = session.len();
    session.clear();
    Ok(ok(ClearedResponse {
        session_id: id,
        cleared,
    }))
}

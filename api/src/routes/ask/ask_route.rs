//! POST /ask: hybrid retrieval + grounded answer.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::Response,
};
use tracing::debug;

use crate::{
    core::{app_state::AppState, http::response_envelope::ok},
    error_handler::AppResult,
    routes::ask::ask_request::{AskRequest, AskResponse},
};

/// Handler: POST /ask
///
/// Non-Ok retrievals still answer `200` with guidance text in `answer`.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/ask \
///   -H 'content-type: application/json' \
///   -d '{"question":"What is the capital of France?","mode":"online"}'
/// ```
pub async fn ask_route(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(body) = payload?;

    let session_id = body
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| state.new_session_id());
    let mode = body.mode.unwrap_or_default();
    debug!(session_id = %session_id, ?mode, "ask_route: start");

    let session = state.session(&session_id).await;
    let mut session = session.lock().await;
    let qa = state.contextor.ask(&mut session, &body.question, mode).await?;

    Ok(ok(AskResponse { session_id, qa }))
}

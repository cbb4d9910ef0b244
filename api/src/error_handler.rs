use ai_llm_service::AiLlmError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use contextor::{ContextorError, GenerationError};
use rag_store::RagError;
use thiserror::Error;
use web_search::SearchError;

use crate::core::http::response_envelope::ApiResponse;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Llm(#[from] AiLlmError),

    #[error(transparent)]
    Rag(#[from] RagError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("invalid API_ADDRESS '{0}'")]
    Address(String),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            // 4xx
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,

            // custom mapped
            AppError::Http { status, .. } => *status,

            // startup-only / 5xx
            AppError::Llm(_)
            | AppError::Rag(_)
            | AppError::Search(_)
            | AppError::Address(_)
            | AppError::Bind(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Llm(_) => "LLM_CONFIG_ERROR",
            AppError::Rag(_) => "CACHE_ERROR",
            AppError::Search(_) => "SEARCH_CONFIG_ERROR",
            AppError::Address(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Http { code, .. } => code,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        ApiResponse::<()>::error(self.error_code(), self.to_string(), Vec::new())
            .into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

/// Maps core failures to HTTP: generation problems are upstream (502/504),
/// embedding problems are 503, a blank question is 400.
impl From<ContextorError> for AppError {
    fn from(err: ContextorError) -> Self {
        match err {
            ContextorError::EmptyQuestion => AppError::BadRequest(err.to_string()),
            ContextorError::Generation(g) => {
                let (status, code) = match &g {
                    GenerationError::BackendNotFound(_) => {
                        (StatusCode::BAD_GATEWAY, "BACKEND_NOT_FOUND")
                    }
                    GenerationError::BackendError(_) => (StatusCode::BAD_GATEWAY, "BACKEND_ERROR"),
                    GenerationError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "BACKEND_TIMEOUT"),
                };
                AppError::Http {
                    status,
                    code,
                    message: g.to_string(),
                }
            }
            ContextorError::Rag(RagError::EmbeddingUnavailable(msg)) => AppError::Http {
                status: StatusCode::SERVICE_UNAVAILABLE,
                code: "EMBEDDING_UNAVAILABLE",
                message: format!("embedding unavailable: {msg}"),
            },
            other => AppError::Http {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "INTERNAL_ERROR",
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_errors_map_to_gateway_statuses() {
        let e = AppError::from(ContextorError::Generation(GenerationError::BackendNotFound(
            "connection refused".into(),
        )));
        assert_eq!(e.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(e.error_code(), "BACKEND_NOT_FOUND");

        let e = AppError::from(ContextorError::Generation(GenerationError::Timeout("600s".into())));
        assert_eq!(e.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(e.error_code(), "BACKEND_TIMEOUT");
    }

    #[test]
    fn empty_question_is_bad_request() {
        let e = AppError::from(ContextorError::EmptyQuestion);
        assert_eq!(e.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn embedding_outage_is_service_unavailable() {
        let e = AppError::from(ContextorError::Rag(RagError::EmbeddingUnavailable("down".into())));
        assert_eq!(e.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(e.error_code(), "EMBEDDING_UNAVAILABLE");
    }
}

//! Generation boundary: prompt in, text out, with typed failures.

use std::{future::Future, pin::Pin};

use ai_llm_service::service_profiles::LlmServiceProfiles;
use ai_llm_service::{AiLlmError, OllamaError};
use thiserror::Error;
use tracing::warn;

/// Observable generation failures.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// Server unreachable or model not installed.
    #[error("Ollama not found: {0}")]
    BackendNotFound(String),

    /// Backend ran but failed.
    #[error("Ollama Error: {0}")]
    BackendError(String),

    /// No answer within the configured timeout.
    #[error("generation timed out: {0}")]
    Timeout(String),
}

/// Boxed future returned by [`GenerationClient::generate`].
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>>;

/// Text generation capability.
pub trait GenerationClient: Send + Sync {
    /// Single attempt; implementations must not retry.
    fn generate<'a>(&'a self, prompt: &'a str) -> GenerateFuture<'a>;
}

impl GenerationClient for LlmServiceProfiles {
    fn generate<'a>(&'a self, prompt: &'a str) -> GenerateFuture<'a> {
        Box::pin(async move {
            LlmServiceProfiles::generate(self, prompt).await.map_err(|e| {
                let mapped = classify(e);
                warn!(error = %mapped, "generation failed");
                mapped
            })
        })
    }
}

fn classify(e: AiLlmError) -> GenerationError {
    match e {
        AiLlmError::Ollama(o) if o.is_backend_missing() => {
            GenerationError::BackendNotFound(o.to_string())
        }
        AiLlmError::Ollama(o @ OllamaError::Timeout { .. }) => GenerationError::Timeout(o.to_string()),
        e @ AiLlmError::Timeout(_) => GenerationError::Timeout(e.to_string()),
        other => GenerationError::BackendError(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::time::Duration;

    #[test]
    fn unreachable_server_is_backend_not_found() {
        let e = AiLlmError::Ollama(OllamaError::Unreachable {
            url: "http://localhost:11434/api/generate".into(),
            reason: "connection refused".into(),
        });
        assert!(matches!(classify(e), GenerationError::BackendNotFound(_)));
    }

    #[test]
    fn missing_model_is_backend_not_found() {
        let e = AiLlmError::Ollama(OllamaError::HttpStatus {
            status: StatusCode::NOT_FOUND,
            url: "http://localhost:11434/api/generate".into(),
            snippet: "model 'phi3:mini' not found".into(),
        });
        assert!(matches!(classify(e), GenerationError::BackendNotFound(_)));
    }

    #[test]
    fn timeouts_are_distinct() {
        let e = AiLlmError::Ollama(OllamaError::Timeout {
            url: "http://localhost:11434/api/generate".into(),
            after: Duration::from_secs(600),
        });
        assert!(matches!(classify(e), GenerationError::Timeout(_)));
        assert!(matches!(
            classify(AiLlmError::Timeout(Duration::from_secs(1))),
            GenerationError::Timeout(_)
        ));
    }

    #[test]
    fn other_failures_are_backend_errors() {
        let e = AiLlmError::Ollama(OllamaError::HttpStatus {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            url: "http://localhost:11434/api/generate".into(),
            snippet: "out of memory".into(),
        });
        match classify(e) {
            GenerationError::BackendError(msg) => assert!(msg.contains("out of memory")),
            other => panic!("unexpected {other:?}"),
        }
    }
}

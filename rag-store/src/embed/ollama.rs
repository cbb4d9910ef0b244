//! Ollama embedding provider implementation.

use std::sync::Arc;

use ai_llm_service::service_profiles::LlmServiceProfiles;
use tracing::warn;

use crate::embed::{EmbedFuture, EmbeddingsProvider};
use crate::errors::RagError;

/// Configuration for the Ollama embedding backend.
#[derive(Clone)]
pub struct OllamaConfig {
    pub svc: Arc<LlmServiceProfiles>,
    /// Expected embedding dimension size.
    pub dim: usize,
}

/// Ollama embedding provider (async).
#[derive(Clone)]
pub struct OllamaEmbedder {
    svc: Arc<LlmServiceProfiles>,
    dim: usize,
}

impl OllamaEmbedder {
    /// Construct a new embedder from configuration.
    pub fn new(cfg: OllamaConfig) -> Self {
        Self {
            svc: cfg.svc,
            dim: cfg.dim,
        }
    }
}

impl EmbeddingsProvider for OllamaEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed<'a>(&'a self, text: &'a str) -> EmbedFuture<'a> {
        Box::pin(async move {
            let resp = self.svc.embed(text).await.map_err(|e| {
                warn!(error = %e, "embedding request failed");
                RagError::EmbeddingUnavailable(e.to_string())
            })?;

            if resp.len() != self.dim {
                return Err(RagError::VectorSizeMismatch {
                    got: resp.len(),
                    want: self.dim,
                });
            }

            Ok(resp)
        })
    }
}

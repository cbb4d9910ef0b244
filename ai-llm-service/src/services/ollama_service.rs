//! Lightweight Ollama service for text generation and embeddings.
//!
//! This module implements a thin client for the local Ollama API:
//! - `POST {endpoint}/api/generate`   — synchronous text generation (`stream=false`)
//! - `POST {endpoint}/api/embeddings` — embeddings retrieval
//!
//! # Examples
//!
//! ```no_run
//! use ai_llm_service::{LlmModelConfig, LlmProvider, OllamaService};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = LlmModelConfig {
//!     provider: LlmProvider::Ollama,
//!     model: "phi3:mini".into(),
//!     endpoint: "http://localhost:11434".into(),
//!     max_tokens: Some(256),
//!     temperature: Some(0.2),
//!     top_p: None,
//!     timeout_secs: Some(120),
//! };
//!
//! let svc = OllamaService::new(cfg)?;
//! let text = svc.generate("What is the capital of France?").await?;
//! println!("Generated:\n{}", text);
//! # Ok(()) }
//! ```

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::llm_model_config::LlmModelConfig;
use crate::error_handler::make_snippet;

/// Errors produced by [`OllamaService`].
#[derive(Debug, Error)]
pub enum OllamaError {
    /// Invalid endpoint (empty or missing http/https).
    #[error("[LLM] invalid Ollama endpoint: {0}")]
    InvalidEndpoint(String),

    /// The server could not be reached (connection refused, DNS, reset).
    #[error("[LLM] Ollama is not reachable at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    /// The request did not complete within the configured timeout.
    #[error("[LLM] Ollama request to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    /// Transport/HTTP client error not covered by the variants above.
    #[error("[LLM] transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-successful HTTP status from upstream.
    #[error("[LLM] unexpected HTTP status {status} from {url}: {snippet}")]
    HttpStatus {
        status: StatusCode,
        url: String,
        snippet: String,
    },

    /// Unexpected/invalid JSON response.
    #[error("[LLM] failed to decode response: {0}")]
    Decode(String),
}

impl OllamaError {
    /// `true` when the backend itself is missing: unreachable server or unknown model.
    pub fn is_backend_missing(&self) -> bool {
        match self {
            OllamaError::Unreachable { .. } => true,
            OllamaError::HttpStatus { status, .. } => *status == StatusCode::NOT_FOUND,
            _ => false,
        }
    }
}

/// Result alias for Ollama operations.
pub type Result<T> = std::result::Result<T, OllamaError>;

/// Thin client for Ollama.
///
/// Reuses one HTTP client with a configurable timeout. Provides:
/// - [`OllamaService::generate`]   — synchronous text generation
/// - [`OllamaService::embeddings`] — embeddings retrieval
pub struct OllamaService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    timeout: Duration,
    url_generate: String,
    url_embeddings: String,
}

impl OllamaService {
    /// Creates a new [`OllamaService`] from the given config.
    ///
    /// # Errors
    /// - [`OllamaError::InvalidEndpoint`] if `cfg.endpoint` is invalid
    /// - [`OllamaError::Transport`] if HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self> {
        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(OllamaError::InvalidEndpoint(cfg.endpoint));
        }

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()?;

        let base = endpoint.trim_end_matches('/').to_string();
        let url_generate = format!("{}/api/generate", base);
        let url_embeddings = format!("{}/api/embeddings", base);

        Ok(Self {
            client,
            cfg,
            timeout,
            url_generate,
            url_embeddings,
        })
    }

    /// Model config this client was built from.
    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }

    /// Performs a **non-streaming** generation request via `/api/generate`.
    ///
    /// # Errors
    /// - [`OllamaError::Unreachable`] / [`OllamaError::Timeout`] for transport failures
    /// - [`OllamaError::HttpStatus`] for non-2xx responses (404 = model not pulled)
    /// - [`OllamaError::Decode`] if response cannot be parsed
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest::from_cfg(&self.cfg, prompt);

        debug!("POST {}", self.url_generate);
        let resp = self
            .client
            .post(&self.url_generate)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(&self.url_generate, e))?;

        let resp = self.ensure_success(&self.url_generate, resp).await?;

        let out: GenerateResponse = resp.json().await.map_err(|e| {
            OllamaError::Decode(format!("serde error: {e}; ensure `stream=false` is used"))
        })?;

        Ok(out.response.trim().to_string())
    }

    /// Retrieves embeddings via `/api/embeddings`.
    ///
    /// # Errors
    /// Same classes as [`OllamaService::generate`].
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>> {
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            prompt: input,
        };

        debug!("POST {}", self.url_embeddings);
        let resp = self
            .client
            .post(&self.url_embeddings)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(&self.url_embeddings, e))?;

        let resp = self.ensure_success(&self.url_embeddings, resp).await?;

        let out: EmbeddingsResponse = resp.json().await.map_err(|e| {
            OllamaError::Decode(format!(
                "serde error: {e}; expected `{{ embedding: number[] }}`"
            ))
        })?;

        Ok(out.embedding)
    }

    async fn ensure_success(&self, url: &str, resp: reqwest::Response) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        Err(OllamaError::HttpStatus {
            status,
            url: url.to_string(),
            snippet: make_snippet(&text),
        })
    }

    fn classify(&self, url: &str, err: reqwest::Error) -> OllamaError {
        if err.is_timeout() {
            OllamaError::Timeout {
                url: url.to_string(),
                after: self.timeout,
            }
        } else if err.is_connect() {
            OllamaError::Unreachable {
                url: url.to_string(),
                reason: err.to_string(),
            }
        } else {
            OllamaError::Transport(err)
        }
    }
}

/* ==========================
HTTP payloads & options
========================== */

/// Request body for `/api/generate` (non-streaming).
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

impl<'a> GenerateRequest<'a> {
    fn from_cfg(cfg: &'a LlmModelConfig, prompt: &'a str) -> Self {
        let options = GenerateOptions {
            temperature: cfg.temperature,
            top_p: cfg.top_p,
            num_predict: cfg.max_tokens,
        };

        Self {
            model: &cfg.model,
            prompt,
            stream: false,
            options: Some(options),
        }
    }
}

/// Subset of Ollama `options`.
#[derive(Debug, Default, Serialize)]
struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Response body for `/api/generate`.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Request body for `/api/embeddings`.
#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Response body for `/api/embeddings`.
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

//! Default Ollama configs loaded from environment variables.
//!
//! Two roles are used by the hybrid RAG service:
//!
//! - **Generation** → answers questions from the grounding prompt
//! - **Embedding**  → turns evidence and queries into vectors
//!
//! # Environment variables
//!
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (default `http://localhost:11434`)
//! - `OLLAMA_MODEL`                = generation model (default `phi3:mini`)
//! - `EMBEDDING_MODEL`             = embedding model (default `all-minilm`)
//! - `LLM_MAX_TOKENS`              = optional max tokens (u32)
//! - `LLM_TIMEOUT_SECS`            = generation timeout (default 600)
//! - `EMBEDDING_TIMEOUT_SECS`      = embedding timeout (default 30)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt_u32, env_opt_u64, env_or, validate_http_endpoint,
    },
};

/// Default generation model, small enough to run on a laptop.
pub const DEFAULT_GENERATION_MODEL: &str = "phi3:mini";
/// Default embedding model; produces 384-dimensional vectors.
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";
/// Default local Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Resolves the Ollama endpoint from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
/// 3. [`DEFAULT_OLLAMA_URL`]
///
/// # Errors
///
/// - [`ConfigError::InvalidNumber`] if `OLLAMA_PORT` is invalid
/// - [`ConfigError::InvalidFormat`] if `OLLAMA_URL` has no http(s) scheme
fn ollama_endpoint() -> Result<String, AiLlmError> {
    resolve_endpoint(
        std::env::var("OLLAMA_URL").ok().as_deref(),
        std::env::var("OLLAMA_PORT").ok().as_deref(),
    )
}

fn resolve_endpoint(url: Option<&str>, port: Option<&str>) -> Result<String, AiLlmError> {
    if let Some(url) = url.map(str::trim).filter(|s| !s.is_empty()) {
        validate_http_endpoint("OLLAMA_URL", url)?;
        return Ok(url.to_string());
    }
    if let Some(port) = port.map(str::trim).filter(|s| !s.is_empty()) {
        port.parse::<u16>().map_err(|_| ConfigError::InvalidNumber {
            var: "OLLAMA_PORT",
            reason: "expected u16 (1..=65535)",
        })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Ok(DEFAULT_OLLAMA_URL.to_string())
}

/// Constructs the config for the **generation** model.
///
/// # Defaults
/// - `temperature = Some(0.2)`
/// - `timeout_secs = Some(600)` unless `LLM_TIMEOUT_SECS` is set
pub fn config_ollama_generation() -> Result<LlmModelConfig, AiLlmError> {
    let endpoint = ollama_endpoint()?;
    let model = env_or("OLLAMA_MODEL", DEFAULT_GENERATION_MODEL);
    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?;
    let timeout_secs = env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(600);

    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model,
        endpoint,
        max_tokens,
        temperature: Some(0.2),
        top_p: None,
        timeout_secs: Some(timeout_secs),
    })
}

/// Constructs the config for the **embedding** model.
///
/// # Defaults
/// - `temperature = Some(0.0)` (deterministic)
/// - `timeout_secs = Some(30)` unless `EMBEDDING_TIMEOUT_SECS` is set
pub fn config_ollama_embedding() -> Result<LlmModelConfig, AiLlmError> {
    let endpoint = ollama_endpoint()?;
    let model = env_or("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL);
    let timeout_secs = env_opt_u64("EMBEDDING_TIMEOUT_SECS")?.unwrap_or(30);

    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model,
        endpoint,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(timeout_secs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_precedence() {
        assert_eq!(
            resolve_endpoint(Some("http://gpu-box:11434"), Some("9999")).unwrap(),
            "http://gpu-box:11434"
        );
        assert_eq!(
            resolve_endpoint(Some("  "), Some("11500")).unwrap(),
            "http://localhost:11500"
        );
        assert_eq!(resolve_endpoint(None, None).unwrap(), DEFAULT_OLLAMA_URL);
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = resolve_endpoint(None, Some("not-a-port")).unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::InvalidNumber { var: "OLLAMA_PORT", .. })
        ));
    }
}

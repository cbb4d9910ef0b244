//! Health probe for the Ollama backend.
//!
//! Probe: `GET {endpoint}/api/tags`, then a best-effort check that the
//! configured model is installed. The returned [`HealthStatus`] is
//! JSON-serializable and backs the `/health` route.
//! [`HealthService::check`] never fails (errors are mapped to `ok=false`).

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::llm_model_config::LlmModelConfig;
use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{AiLlmError, HealthError, HttpError, make_snippet};

/// A serializable health snapshot for a single model config.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Backend/provider (e.g., "Ollama").
    pub provider: String,
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Model identifier relevant to the probe.
    pub model: Option<String>,
    /// Overall health flag.
    pub ok: bool,
    /// Measured HTTP latency in milliseconds for the main probe.
    pub latency_ms: u128,
    /// Short human-readable message with details.
    pub message: String,
}

impl HealthStatus {
    fn new(
        cfg: &LlmModelConfig,
        ok: bool,
        latency_ms: u128,
        message: impl Into<String>,
    ) -> Self {
        Self {
            provider: format!("{:?}", cfg.provider),
            endpoint: cfg.endpoint.clone(),
            model: Some(cfg.model.clone()),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// Health checker that reuses a single HTTP client.
pub struct HealthService {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl HealthService {
    /// Creates a new health service with an optional client timeout (seconds).
    ///
    /// # Errors
    /// Returns [`AiLlmError::HttpTransport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        info!(
            default_timeout_secs = timeout.as_secs(),
            "HealthService initialized"
        );

        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// Checks health for a single config. Never returns an error.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            warn!(endpoint = %cfg.endpoint, "invalid endpoint (empty or missing http/https)");
            return HealthStatus::new(
                cfg,
                false,
                0,
                HealthError::InvalidEndpoint(cfg.endpoint.clone()).to_string(),
            );
        }

        let start = Instant::now();
        let result = match cfg.provider {
            LlmProvider::Ollama => self.try_probe_ollama(cfg).await,
        };

        match result {
            Ok(status) => {
                info!(
                    model = %cfg.model,
                    ok = status.ok,
                    latency_ms = status.latency_ms,
                    "health probe completed"
                );
                status
            }
            Err(err) => {
                let status = HealthStatus::new(cfg, false, start.elapsed().as_millis(), err.to_string());
                warn!(
                    model = %cfg.model,
                    latency_ms = status.latency_ms,
                    message = %status.message,
                    "health probe failed"
                );
                status
            }
        }
    }

    /// Checks health for multiple configs, one after another.
    pub async fn check_many(&self, configs: &[LlmModelConfig]) -> Vec<HealthStatus> {
        debug!(count = configs.len(), "running batch health probes");
        let mut out = Vec::with_capacity(configs.len());
        for cfg in configs {
            out.push(self.check(cfg).await);
        }
        out
    }

    async fn try_probe_ollama(&self, cfg: &LlmModelConfig) -> Result<HealthStatus, AiLlmError> {
        let url = format!("{}/api/tags", cfg.endpoint.trim_end_matches('/'));
        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout)
            .min(self.default_timeout);

        let start = Instant::now();
        debug!(model = %cfg.model, "GET {}", url);

        let resp = self.client.get(&url).timeout(timeout).send().await?;
        let latency = start.elapsed().as_millis();

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(HealthError::HttpStatus(HttpError {
                status,
                url,
                snippet: make_snippet(&text),
            })
            .into());
        }

        match resp.json::<Tags>().await {
            Ok(tags) => Ok(status_from_tags(cfg, tags, latency)),
            Err(e) => {
                warn!(model = %cfg.model, error = %e, "failed to decode /api/tags; treating server as reachable");
                Ok(HealthStatus::new(
                    cfg,
                    true,
                    latency,
                    format!("Ollama is reachable; failed to decode /api/tags: {e}"),
                ))
            }
        }
    }
}

/// Expected minimal JSON: `{ "models": [ { "name": "<model>" }, ... ] }`
#[derive(Debug, serde::Deserialize)]
struct Tags {
    models: Option<Vec<Tag>>,
}

#[derive(Debug, serde::Deserialize)]
struct Tag {
    name: String,
}

/// Ollama reports tags with an implicit `:latest`, so `all-minilm` matches `all-minilm:latest`.
fn status_from_tags(cfg: &LlmModelConfig, tags: Tags, latency: u128) -> HealthStatus {
    let Some(models) = tags.models else {
        return HealthStatus::new(
            cfg,
            true,
            latency,
            "Ollama is healthy; tags response without `models` field",
        );
    };
    let wanted = cfg.model.as_str();
    let exists = models.iter().any(|m| {
        m.name == wanted || m.name.strip_suffix(":latest").is_some_and(|base| base == wanted)
    });
    if exists {
        HealthStatus::new(cfg, true, latency, "Ollama is healthy; model is available")
    } else {
        HealthStatus::new(
            cfg,
            false,
            latency,
            "Ollama is up, but model not found in /api/tags",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(model: &str, endpoint: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: model.into(),
            endpoint: endpoint.into(),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(1),
        }
    }

    #[test]
    fn latest_tag_matches_bare_model_name() {
        let tags: Tags = serde_json::from_str(
            r#"{"models":[{"name":"all-minilm:latest"},{"name":"phi3:mini"}]}"#,
        )
        .unwrap();
        let st = status_from_tags(&cfg("all-minilm", "http://x"), tags, 3);
        assert!(st.ok);
        assert_eq!(st.latency_ms, 3);
    }

    #[test]
    fn missing_model_is_unhealthy() {
        let tags: Tags = serde_json::from_str(r#"{"models":[{"name":"llama3:8b"}]}"#).unwrap();
        let st = status_from_tags(&cfg("phi3:mini", "http://x"), tags, 1);
        assert!(!st.ok);
        assert!(st.message.contains("model not found"));
    }

    #[tokio::test]
    async fn invalid_endpoint_never_errors() {
        let svc = HealthService::new(Some(1)).unwrap();
        let st = svc.check(&cfg("phi3:mini", "localhost:11434")).await;
        assert!(!st.ok);
        assert_eq!(st.latency_ms, 0);
    }
}

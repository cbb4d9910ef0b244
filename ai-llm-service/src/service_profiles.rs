//! Shared LLM service with two profiles: `generation` and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Caches underlying HTTP clients per config (endpoint+model+timeout).
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::config::default_config::{config_ollama_embedding, config_ollama_generation};
//! use ai_llm_service::service_profiles::LlmServiceProfiles;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = Arc::new(LlmServiceProfiles::new(
//!     config_ollama_generation()?,
//!     config_ollama_embedding()?,
//!     Some(5),
//! )?);
//!
//! let txt = svc.generate("Hello world").await?;
//! let emb = svc.embed("Ferris").await?;
//! println!("{txt} / dim = {}", emb.len());
//! # Ok(()) }
//! ```

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::AiLlmError,
    health_service::{HealthService, HealthStatus},
    services::ollama_service::OllamaService,
};

/// Shared service managing the **generation** and **embedding** profiles.
pub struct LlmServiceProfiles {
    generation: LlmModelConfig,
    embedding: LlmModelConfig,

    ollama: RwLock<HashMap<ClientKey, Arc<OllamaService>>>,

    health: HealthService,
}

impl LlmServiceProfiles {
    /// Creates a new service.
    ///
    /// - `generation`: model that answers grounded prompts.
    /// - `embedding`: model that produces vectors for the offline cache.
    /// - `health_timeout_secs`: optional timeout for the health checker.
    pub fn new(
        generation: LlmModelConfig,
        embedding: LlmModelConfig,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, AiLlmError> {
        Ok(Self {
            generation,
            embedding,
            ollama: RwLock::new(HashMap::new()),
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Generates text using the **generation** profile. Single attempt, no retry.
    ///
    /// # Errors
    /// Returns [`AiLlmError::Ollama`] if the backend fails.
    pub async fn generate(&self, prompt: &str) -> Result<String, AiLlmError> {
        match self.generation.provider {
            LlmProvider::Ollama => {
                let cli = self.get_or_init_ollama(&self.generation).await?;
                cli.generate(prompt).await.map_err(AiLlmError::from)
            }
        }
    }

    /// Computes embeddings using the **embedding** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError::Ollama`] if embedding fails.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        match self.embedding.provider {
            LlmProvider::Ollama => {
                let cli = self.get_or_init_ollama(&self.embedding).await?;
                cli.embeddings(input).await.map_err(AiLlmError::from)
            }
        }
    }

    /// Returns a health snapshot for all distinct profiles.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = Vec::<LlmModelConfig>::with_capacity(2);
        list.push(self.generation.clone());
        if self.embedding != self.generation {
            list.push(self.embedding.clone());
        }
        self.health.check_many(&list).await
    }

    /// Returns references to the current profiles `(generation, embedding)`.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (&self.generation, &self.embedding)
    }

    /* --------------------- Internals --------------------- */

    async fn get_or_init_ollama(
        &self,
        cfg: &LlmModelConfig,
    ) -> Result<Arc<OllamaService>, AiLlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.ollama.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.ollama.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        debug!(model = %cfg.model, endpoint = %cfg.endpoint, "initializing Ollama client");
        let cli = Arc::new(OllamaService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }
}

/// Internal cache key to identify unique client configs.
#[derive(Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    timeout: Option<u64>,
}

impl From<&LlmModelConfig> for ClientKey {
    fn from(cfg: &LlmModelConfig) -> Self {
        Self {
            provider: cfg.provider,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            timeout: cfg.timeout_secs,
        }
    }
}

//! Ollama-backed language model access for the hybrid RAG service.
//!
//! The crate exposes:
//! - [`config`]: model configs resolved from the environment
//! - [`services::ollama_service`]: thin HTTP client for `/api/generate` and `/api/embeddings`
//! - [`service_profiles`]: shared `generation` + `embedding` profiles with cached clients
//! - [`health_service`]: lightweight readiness probe for the Ollama server
//! - [`telemetry`]: a library-scoped tracing layer

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::{AiLlmError, ConfigError, HealthError};
pub use services::ollama_service::{OllamaError, OllamaService};

//! Runtime configuration for the local cache.

use std::path::{Path, PathBuf};

use crate::errors::RagError;

/// Output width of `all-minilm` / `all-MiniLM-L6-v2`.
pub const DEFAULT_DIM: usize = 384;

/// Which embedding backend feeds the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// Ollama embedding model (network call to the local server).
    Ollama,
    /// In-process feature hashing; needs no model at all.
    Hashing,
}

impl EmbeddingBackend {
    /// Parse from env string (case-insensitive). Defaults to Ollama.
    pub fn from_env(s: Option<String>) -> Self {
        match s.unwrap_or_default().trim().to_lowercase().as_str() {
            "hashing" | "hash" | "local" => EmbeddingBackend::Hashing,
            _ => EmbeddingBackend::Ollama,
        }
    }
}

/// Configuration for the vector index and document store.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Binary vector index file.
    pub index_path: PathBuf,
    /// JSONL document metadata file.
    pub docs_path: PathBuf,
    /// Embedding dimension, fixed for the process lifetime.
    pub dim: usize,
    /// Embedding backend selection.
    pub backend: EmbeddingBackend,
}

impl RagConfig {
    /// Default file names inside `dir`.
    pub fn new_default(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            index_path: dir.join("rag_index.bin"),
            docs_path: dir.join("rag_docs.jsonl"),
            dim: DEFAULT_DIM,
            backend: EmbeddingBackend::Ollama,
        }
    }

    /// Build configuration from environment variables.
    ///
    /// - `RAG_INDEX_PATH` (default: `rag_index.bin`)
    /// - `RAG_DOCS_PATH` (default: `rag_docs.jsonl`)
    /// - `EMBEDDING_DIM` (default: 384)
    /// - `EMBEDDING_PROVIDER` (`ollama` | `hashing`, default: `ollama`)
    pub fn from_env() -> Result<Self, RagError> {
        let mut cfg = Self::new_default(".");
        if let Ok(p) = std::env::var("RAG_INDEX_PATH") {
            cfg.index_path = PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("RAG_DOCS_PATH") {
            cfg.docs_path = PathBuf::from(p);
        }
        if let Ok(v) = std::env::var("EMBEDDING_DIM") {
            cfg.dim = v
                .trim()
                .parse::<usize>()
                .map_err(|_| RagError::Config(format!("EMBEDDING_DIM is not a number: '{v}'")))?;
        }
        cfg.backend = EmbeddingBackend::from_env(std::env::var("EMBEDDING_PROVIDER").ok());
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.dim == 0 {
            return Err(RagError::Config("EMBEDDING_DIM must be > 0".into()));
        }
        if self.dim > u32::MAX as usize {
            return Err(RagError::Config("EMBEDDING_DIM does not fit in u32".into()));
        }
        if self.index_path == self.docs_path {
            return Err(RagError::Config(
                "index and document files must be different paths".into(),
            ));
        }
        Ok(())
    }
}

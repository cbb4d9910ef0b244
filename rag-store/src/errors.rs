//! Unified error types for the crate.

use thiserror::Error;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing / serialization errors.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Mismatch in vector dimensionality.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// The embedding provider could not produce a vector.
    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// A persisted artifact exists but cannot be decoded.
    #[error("corrupt store file: {0}")]
    Corrupt(String),

    /// Vector and document counts disagree.
    #[error("store misaligned: {vectors} vectors vs {documents} documents")]
    Misaligned { vectors: usize, documents: usize },
}

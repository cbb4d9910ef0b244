//! Typed error for the contextor crate.

use thiserror::Error;

use crate::generation::GenerationError;

#[derive(Debug, Error)]
pub enum ContextorError {
    /// Errors from the underlying rag-store crate (embedding, persistence).
    #[error("RAG error: {0}")]
    Rag(#[from] rag_store::RagError),

    /// The generation backend failed; never retried here.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// HTTP client construction errors (connectivity probe).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Blank question.
    #[error("question must not be empty")]
    EmptyQuestion,
}

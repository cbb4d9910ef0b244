use crate::errors::RagError;
use std::{future::Future, pin::Pin};

/// Boxed future returned by [`EmbeddingsProvider::embed`].
pub type EmbedFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>>;

/// Provider interface for embedding generation.
///
/// Async because most real providers (Ollama, hosted APIs) perform HTTP
/// requests. Implementations must return vectors of [`EmbeddingsProvider::dim`]
/// width and map backend failures to [`RagError::EmbeddingUnavailable`].
pub trait EmbeddingsProvider: Send + Sync {
    /// Output width of every vector this provider returns.
    fn dim(&self) -> usize;

    /// Async embedding function.
    fn embed<'a>(&'a self, text: &'a str) -> EmbedFuture<'a>;
}

pub mod hashing;
pub mod ollama;

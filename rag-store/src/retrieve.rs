//! Retrieval helpers: low-level vector search and text queries.

use tracing::{trace, warn};

use crate::RagStore;
use crate::errors::RagError;
use crate::record::RagHit;

/// Top-`k` hits for a ready query vector, nearest first.
///
/// Positions beyond the document store are dropped rather than trusted.
pub(crate) async fn search_by_vector(
    store: &RagStore,
    query_vector: &[f32],
    k: usize,
) -> Result<Vec<RagHit>, RagError> {
    let state = store.state.read().await;
    let neighbors = state.index.query(query_vector, k)?;

    let doc_count = state.docs.len();
    let mut out = Vec::with_capacity(neighbors.len());
    for n in neighbors {
        match state.docs.get(n.position) {
            Some(doc) => out.push(RagHit {
                position: n.position,
                distance: n.distance,
                document: doc.clone(),
            }),
            None => warn!(
                position = n.position,
                doc_count, "index position has no document; skipping"
            ),
        }
    }
    trace!(k, hits = out.len(), "retrieve::search_by_vector");
    Ok(out)
}

/// Embeds `query` and returns its nearest cached documents.
///
/// # Errors
/// Returns embedding errors from the provider.
pub(crate) async fn rag_context(
    store: &RagStore,
    query: &str,
    k: usize,
) -> Result<Vec<RagHit>, RagError> {
    if store.is_empty().await {
        return Ok(Vec::new());
    }
    let qv = store.embedder.embed(query).await?;
    search_by_vector(store, &qv, k).await
}

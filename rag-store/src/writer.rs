//! Cache writer: makes the two-store append look atomic to callers.
//!
//! Sequence: embed → append vector + document → persist index → persist
//! documents. The whole sequence runs under the store's writer gate, so
//! concurrent writers cannot interleave and hand the same position to two
//! vectors. Readers take the state lock and see either the pre- or the
//! post-append pair, never one store grown without the other.
//!
//! Crash window: each file is replaced atomically, but the two replacements
//! are separate. A crash after the index rename and before the document
//! rename leaves the index one entry ahead on disk; [`crate::RagStore::open`]
//! truncates to the common prefix, so that entry is lost rather than
//! misaligned.

use tracing::{debug, instrument, warn};

use crate::errors::RagError;
use crate::record::Document;
use crate::RagStore;

/// Embeds `text`, appends it to both stores and persists them.
///
/// # Errors
/// - [`RagError::EmbeddingUnavailable`] / [`RagError::VectorSizeMismatch`] before any mutation
/// - [`RagError::Io`] if persisting fails; the entry is removed from memory again
///   and at most the index file is left one entry ahead on disk
#[instrument(skip_all, fields(source = %source, text_len = text.len()))]
pub(crate) async fn write(store: &RagStore, text: &str, source: &str) -> Result<usize, RagError> {
    let _gate = store.writer.lock().await;

    let vector = store.embedder.embed(text).await?;
    if vector.len() != store.cfg.dim {
        return Err(RagError::VectorSizeMismatch {
            got: vector.len(),
            want: store.cfg.dim,
        });
    }

    let mut state = store.state.write().await;
    if state.index.len() != state.docs.len() {
        // Unreachable while every mutation goes through this function.
        return Err(RagError::Misaligned {
            vectors: state.index.len(),
            documents: state.docs.len(),
        });
    }
    let position = state.index.append(&vector)?;
    state.docs.append(Document::new(text, source));

    // Readers may proceed while the files are rewritten; the gate still
    // keeps other writers out.
    let state = state.downgrade();
    let persisted = state
        .index
        .persist(&store.cfg.index_path)
        .and_then(|()| state.docs.persist(&store.cfg.docs_path));
    let total = state.docs.len();
    drop(state);

    if let Err(e) = persisted {
        // Still under the gate, so nothing was appended after `position`.
        let mut state = store.state.write().await;
        state.index.truncate(position);
        state.docs.truncate(position);
        warn!(position, error = %e, "cache persist failed; entry rolled back");
        return Err(e);
    }

    debug!(position, total, "cache entry written");
    Ok(position)
}

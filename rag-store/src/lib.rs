//! Local, persistent vector cache for retrieved evidence.
//!
//! This crate provides:
//! - [`VectorIndex`]: exact L2 nearest-neighbor index with append-only growth
//! - [`DocumentStore`]: document metadata aligned 1:1 with index positions
//! - [`RagStore`]: facade that owns both, loads them at startup, and exposes
//!   the cache writer and text retrieval
//!
//! Both files are rewritten atomically after every successful write
//! (write-through); a failed or missing load degrades to an empty cache.

mod config;
mod doc_store;
mod errors;
mod persist;
mod record;
mod retrieve;
mod vector_index;
mod writer;

pub mod embed;

pub use config::{DEFAULT_DIM, EmbeddingBackend, RagConfig};
pub use doc_store::DocumentStore;
pub use embed::{EmbeddingsProvider, hashing::HashingEmbedder};
pub use errors::RagError;
pub use persist::LoadOutcome;
pub use record::{CacheStats, Document, Neighbor, RagHit};
pub use vector_index::VectorIndex;

use std::sync::Arc;

use ai_llm_service::service_profiles::LlmServiceProfiles;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, trace, warn};

use crate::embed::ollama::{OllamaConfig, OllamaEmbedder};

/// Both stores, guarded together so readers never see them out of step.
struct CacheState {
    index: VectorIndex,
    docs: DocumentStore,
}

/// What [`RagStore::open`] found on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenReport {
    pub index: LoadOutcome,
    pub documents: LoadOutcome,
    /// Entries dropped to restore alignment (non-zero only after a crash
    /// between the two file replacements, or a corrupt file).
    pub truncated: usize,
}

/// High-level facade over the offline cache.
///
/// Construct once at startup, wrap in `Arc`, and share.
pub struct RagStore {
    cfg: RagConfig,
    embedder: Arc<dyn EmbeddingsProvider>,
    state: RwLock<CacheState>,
    writer: Mutex<()>,
    report: OpenReport,
}

impl RagStore {
    /// Loads both stores from the configured paths.
    ///
    /// Absent or corrupt files never fail the open; they start empty. If the
    /// two files disagree in length, the longer one is cut back to the common
    /// prefix.
    ///
    /// # Errors
    /// Returns [`RagError::Config`] for invalid config or an embedder whose
    /// width differs from `cfg.dim`.
    pub fn open(cfg: RagConfig, embedder: Arc<dyn EmbeddingsProvider>) -> Result<Self, RagError> {
        cfg.validate()?;
        if embedder.dim() != cfg.dim {
            return Err(RagError::Config(format!(
                "embedder produces {} dimensions, cache is configured for {}",
                embedder.dim(),
                cfg.dim
            )));
        }

        let (mut index, index_outcome) = VectorIndex::load(&cfg.index_path, cfg.dim);
        let (mut docs, docs_outcome) = DocumentStore::load(&cfg.docs_path);

        let aligned = index.len().min(docs.len());
        let truncated = index.len().max(docs.len()) - aligned;
        if truncated > 0 {
            warn!(
                vectors = index.len(),
                documents = docs.len(),
                keep = aligned,
                "cache files out of step; truncating to common prefix"
            );
            index.truncate(aligned);
            docs.truncate(aligned);
        }

        info!(entries = aligned, dim = cfg.dim, "offline cache ready");

        Ok(Self {
            cfg,
            embedder,
            state: RwLock::new(CacheState { index, docs }),
            writer: Mutex::new(()),
            report: OpenReport {
                index: index_outcome,
                documents: docs_outcome,
                truncated,
            },
        })
    }

    pub fn config(&self) -> &RagConfig {
        &self.cfg
    }

    /// Load report captured by [`RagStore::open`].
    pub fn open_report(&self) -> &OpenReport {
        &self.report
    }

    /// Number of cached documents (equals the number of vectors).
    pub async fn len(&self) -> usize {
        self.state.read().await.docs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.docs.is_empty()
    }

    /// Counters read under one lock acquisition.
    pub async fn stats(&self) -> CacheStats {
        let state = self.state.read().await;
        CacheStats {
            documents: state.docs.len(),
            vectors: state.index.len(),
            dim: state.index.dim(),
        }
    }

    /// Cache writer: embeds `text`, appends `(vector, document)` to both
    /// stores, persists both, and returns the shared position.
    ///
    /// # Errors
    /// See the [`writer`] module for the failure classes and crash window.
    pub async fn write(&self, text: &str, source: &str) -> Result<usize, RagError> {
        writer::write(self, text, source).await
    }

    /// Nearest cached documents for a text query, nearest first.
    ///
    /// Returns an empty list without calling the embedder when the cache is empty.
    pub async fn rag_context(&self, query: &str, k: usize) -> Result<Vec<RagHit>, RagError> {
        trace!(k, "RagStore::rag_context");
        retrieve::rag_context(self, query, k).await
    }

    /// Nearest cached documents for a ready query vector.
    pub async fn search_by_vector(
        &self,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<RagHit>, RagError> {
        retrieve::search_by_vector(self, query_vector, k).await
    }
}

/// Builds the embedding provider selected by `cfg.backend`.
pub fn embedder_for(cfg: &RagConfig, svc: Arc<LlmServiceProfiles>) -> Arc<dyn EmbeddingsProvider> {
    match cfg.backend {
        EmbeddingBackend::Ollama => Arc::new(OllamaEmbedder::new(OllamaConfig { svc, dim: cfg.dim })),
        EmbeddingBackend::Hashing => Arc::new(HashingEmbedder::new(cfg.dim)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::EmbedFuture;
    use std::path::Path;

    const DIM: usize = 32;

    fn cfg(dir: &Path) -> RagConfig {
        let mut cfg = RagConfig::new_default(dir);
        cfg.dim = DIM;
        cfg.backend = EmbeddingBackend::Hashing;
        cfg
    }

    fn open(dir: &Path) -> RagStore {
        RagStore::open(cfg(dir), Arc::new(HashingEmbedder::new(DIM))).unwrap()
    }

    struct FailingEmbedder;

    impl EmbeddingsProvider for FailingEmbedder {
        fn dim(&self) -> usize {
            DIM
        }
        fn embed<'a>(&'a self, _text: &'a str) -> EmbedFuture<'a> {
            Box::pin(async { Err(RagError::EmbeddingUnavailable("model offline".into())) })
        }
    }

    #[tokio::test]
    async fn writes_keep_stores_aligned_and_positions_increasing() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());

        let mut last = None;
        for i in 0..6 {
            let pos = store
                .write(&format!("Title: doc {i}\nSnippet: body {i}"), "http://x")
                .await
                .unwrap();
            if let Some(prev) = last {
                assert!(pos > prev);
            }
            last = Some(pos);
            let stats = store.stats().await;
            assert_eq!(stats.documents, stats.vectors);
            assert_eq!(stats.documents, i + 1);
        }
    }

    #[tokio::test]
    async fn reopen_reproduces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());
        store.write("alpha beta", "http://a").await.unwrap();
        store.write("gamma delta", "").await.unwrap();
        let before = store.search_by_vector(&HashingEmbedder::new(DIM).embed_sync("alpha beta"), 2).await.unwrap();
        drop(store);

        let reopened = open(dir.path());
        assert_eq!(reopened.open_report().index, LoadOutcome::Loaded(2));
        assert_eq!(reopened.open_report().documents, LoadOutcome::Loaded(2));
        assert_eq!(reopened.len().await, 2);
        let after = reopened.search_by_vector(&HashingEmbedder::new(DIM).embed_sync("alpha beta"), 2).await.unwrap();
        assert_eq!(before, after);
        assert_eq!(after[0].document, Document::new("alpha beta", "http://a"));
    }

    #[tokio::test]
    async fn embedding_failure_leaves_cache_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = RagStore::open(cfg(dir.path()), Arc::new(FailingEmbedder)).unwrap();
        let err = store.write("anything", "").await.unwrap_err();
        assert!(matches!(err, RagError::EmbeddingUnavailable(_)));
        assert!(store.is_empty().await);
        assert!(!cfg(dir.path()).index_path.exists());
    }

    #[tokio::test]
    async fn empty_cache_skips_embedding() {
        let dir = tempfile::tempdir().unwrap();
        let store = RagStore::open(cfg(dir.path()), Arc::new(FailingEmbedder)).unwrap();
        assert!(store.rag_context("anything", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn open_truncates_longer_file_to_common_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let c = cfg(dir.path());
        {
            let store = open(dir.path());
            store.write("one", "").await.unwrap();
            store.write("two", "").await.unwrap();
        }
        // Simulate the crash window: index has a third vector, documents do not.
        let (mut index, _) = VectorIndex::load(&c.index_path, DIM);
        index.append(&HashingEmbedder::new(DIM).embed_sync("three")).unwrap();
        index.persist(&c.index_path).unwrap();

        let store = open(dir.path());
        assert_eq!(store.open_report().truncated, 1);
        let stats = store.stats().await;
        assert_eq!((stats.vectors, stats.documents), (2, 2));

        // Next write lands on position 2 and rewrites both files aligned.
        assert_eq!(store.write("three", "").await.unwrap(), 2);
        drop(store);
        let store = open(dir.path());
        assert_eq!(store.open_report().truncated, 0);
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn positions_without_documents_are_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());
        store.write("kept entry", "").await.unwrap();
        {
            let mut state = store.state.write().await;
            state.index.append(&HashingEmbedder::new(DIM).embed_sync("orphan")).unwrap();
        }
        let hits = store
            .search_by_vector(&HashingEmbedder::new(DIM).embed_sync("orphan"), 5)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.text, "kept entry");
    }

    #[tokio::test]
    async fn failed_persist_rolls_back_memory() {
        let dir = tempfile::tempdir().unwrap();
        let c = cfg(dir.path());
        let store = open(dir.path());
        store.write("kept entry", "").await.unwrap();

        // A directory where the index file should go makes every rename fail.
        std::fs::remove_file(&c.index_path).unwrap();
        std::fs::create_dir(&c.index_path).unwrap();
        for i in 0..5 {
            let err = store.write(&format!("doc {i}"), "").await.unwrap_err();
            assert!(matches!(err, RagError::Io(_)));
        }

        let stats = store.stats().await;
        assert_eq!((stats.vectors, stats.documents), (1, 1));
        let hits = store.rag_context("doc 3", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.text, "kept entry");

        // Once the path is usable again the next write takes the freed position.
        std::fs::remove_dir(&c.index_path).unwrap();
        assert_eq!(store.write("doc 5", "").await.unwrap(), 1);
        drop(store);
        let store = open(dir.path());
        assert_eq!(store.open_report().truncated, 0);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn failed_document_persist_is_repaired_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let c = cfg(dir.path());
        let store = open(dir.path());
        store.write("one", "").await.unwrap();

        let saved = std::fs::read(&c.docs_path).unwrap();
        std::fs::remove_file(&c.docs_path).unwrap();
        std::fs::create_dir(&c.docs_path).unwrap();
        assert!(store.write("two", "").await.is_err());
        assert_eq!(store.len().await, 1);
        drop(store);

        // The index file was replaced, so disk is one vector ahead.
        std::fs::remove_dir(&c.docs_path).unwrap();
        std::fs::write(&c.docs_path, saved).unwrap();
        let store = open(dir.path());
        assert_eq!(store.open_report().truncated, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn misaligned_state_rejects_write_without_appending() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());
        store.write("kept entry", "").await.unwrap();
        {
            let mut state = store.state.write().await;
            state.index.append(&HashingEmbedder::new(DIM).embed_sync("orphan")).unwrap();
        }
        let err = store.write("next", "").await.unwrap_err();
        assert!(matches!(err, RagError::Misaligned { vectors: 2, documents: 1 }));
        let stats = store.stats().await;
        assert_eq!((stats.vectors, stats.documents), (2, 1));
    }

    #[tokio::test]
    async fn embedder_width_must_match_config() {
        let dir = tempfile::tempdir().unwrap();
        let res = RagStore::open(cfg(dir.path()), Arc::new(HashingEmbedder::new(DIM + 1)));
        assert!(matches!(res, Err(RagError::Config(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_get_distinct_positions() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(open(dir.path()));

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.write(&format!("entry number {i}"), "").await.unwrap()
            }));
        }
        let mut positions = Vec::new();
        for h in handles {
            positions.push(h.await.unwrap());
        }
        positions.sort_unstable();
        assert_eq!(positions, (0..16).collect::<Vec<_>>());

        let stats = store.stats().await;
        assert_eq!((stats.vectors, stats.documents), (16, 16));

        // Every document sits next to the vector of its own text.
        let embed = HashingEmbedder::new(DIM);
        let state = store.state.read().await;
        for (position, doc) in state.docs.iter().enumerate() {
            assert_eq!(state.index.vector(position), Some(embed.embed_sync(&doc.text).as_slice()));
        }
    }
}

//! Retrieval Router: offline cache lookup vs. live search with cache warming.
//!
//! Online retrieval is only attempted when the connectivity probe says the
//! network is up; otherwise the router falls back to the cache without
//! touching the search client. "Nothing found" outcomes are statuses, not
//! errors, so the caller can render guidance.

use std::sync::Arc;

use rag_store::{Document, RagError, RagStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use web_search::LiveSearch;

use crate::connectivity::ConnectivityProbe;

/// Where evidence comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMode {
    Offline,
    /// Preferred by default; falls back when the network is down.
    #[default]
    Online,
}

/// Outcome class of one retrieval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RetrievalStatus {
    /// Evidence found.
    Ok,
    /// The offline cache holds no documents at all.
    NoCache,
    /// The cache is populated but nothing usable came back.
    NoMatch,
    /// Live search returned nothing (or failed).
    NoResults,
}

impl RetrievalStatus {
    /// User-facing guidance for terminal non-Ok statuses.
    pub fn guidance(self) -> Option<&'static str> {
        match self {
            RetrievalStatus::Ok => None,
            RetrievalStatus::NoCache => Some("No offline data. Try online mode once to build cache."),
            RetrievalStatus::NoMatch => Some("No relevant offline information found."),
            RetrievalStatus::NoResults => Some("No relevant web info found."),
        }
    }
}

/// Evidence plus everything observable about how it was obtained.
#[derive(Clone, Debug, PartialEq)]
pub struct Retrieval {
    /// Mode the caller asked for.
    pub requested: RetrievalMode,
    /// Mode actually used after the connectivity check.
    pub mode: RetrievalMode,
    pub status: RetrievalStatus,
    /// Nearest-first (offline) or provider ranking order (online).
    pub evidence: Vec<Document>,
    /// Set when live search failed, as opposed to returning no hits.
    pub search_error: Option<String>,
    /// Hits that could not be written into the cache.
    pub cache_failures: usize,
}

impl Retrieval {
    fn empty(requested: RetrievalMode, mode: RetrievalMode, status: RetrievalStatus) -> Self {
        Self {
            requested,
            mode,
            status,
            evidence: Vec::new(),
            search_error: None,
            cache_failures: 0,
        }
    }

    /// Non-empty evidence sources, deduplicated in first-seen order.
    pub fn sources(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for src in self.evidence.iter().filter_map(Document::source) {
            if !out.iter().any(|s| s == src) {
                out.push(src.to_string());
            }
        }
        out
    }
}

/// Chooses and runs a retrieval strategy.
pub struct RetrievalRouter {
    store: Arc<RagStore>,
    search: Arc<dyn LiveSearch>,
    probe: Arc<dyn ConnectivityProbe>,
    top_k: usize,
    search_limit: usize,
}

impl RetrievalRouter {
    pub fn new(
        store: Arc<RagStore>,
        search: Arc<dyn LiveSearch>,
        probe: Arc<dyn ConnectivityProbe>,
        top_k: usize,
        search_limit: usize,
    ) -> Self {
        Self {
            store,
            search,
            probe,
            top_k: top_k.max(1),
            search_limit: search_limit.max(1),
        }
    }

    pub fn store(&self) -> &Arc<RagStore> {
        &self.store
    }

    /// Current (possibly cached) connectivity answer.
    pub async fn is_online(&self) -> bool {
        self.probe.is_online().await
    }

    /// Runs the strategy for `requested`, falling back to offline when the
    /// network is unavailable.
    ///
    /// # Errors
    /// Only offline retrieval can fail, with the embedding error of the query.
    #[instrument(skip_all, fields(requested = ?requested))]
    pub async fn retrieve(
        &self,
        query: &str,
        requested: RetrievalMode,
    ) -> Result<Retrieval, RagError> {
        let mut out = match requested {
            RetrievalMode::Online if self.is_online().await => self.retrieve_online(query).await,
            RetrievalMode::Online => {
                info!("network unavailable; using offline cache");
                self.retrieve_offline(query, self.top_k).await?
            }
            RetrievalMode::Offline => self.retrieve_offline(query, self.top_k).await?,
        };
        out.requested = requested;
        Ok(out)
    }

    /// Top-`k` cached documents for `query`, nearest first.
    ///
    /// # Errors
    /// [`RagError::EmbeddingUnavailable`] if the query cannot be embedded.
    pub async fn retrieve_offline(&self, query: &str, k: usize) -> Result<Retrieval, RagError> {
        let mode = RetrievalMode::Offline;
        if self.store.is_empty().await {
            debug!("offline cache empty");
            return Ok(Retrieval::empty(mode, mode, RetrievalStatus::NoCache));
        }

        let hits = self.store.rag_context(query, k).await?;
        if hits.is_empty() {
            return Ok(Retrieval::empty(mode, mode, RetrievalStatus::NoMatch));
        }

        debug!(hits = hits.len(), "offline evidence");
        Ok(Retrieval {
            evidence: hits.into_iter().map(|h| h.document).collect(),
            ..Retrieval::empty(mode, mode, RetrievalStatus::Ok)
        })
    }

    /// Live search; every hit is also written into the offline cache.
    ///
    /// Never fails: search errors become [`RetrievalStatus::NoResults`] with
    /// [`Retrieval::search_error`] set, and cache-write failures are counted
    /// and skipped.
    pub async fn retrieve_online(&self, query: &str) -> Retrieval {
        let mode = RetrievalMode::Online;
        let hits = match self.search.search(query, self.search_limit).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "live search failed");
                return Retrieval {
                    search_error: Some(e.to_string()),
                    ..Retrieval::empty(mode, mode, RetrievalStatus::NoResults)
                };
            }
        };
        if hits.is_empty() {
            return Retrieval::empty(mode, mode, RetrievalStatus::NoResults);
        }

        let mut evidence = Vec::with_capacity(hits.len());
        let mut cache_failures = 0;
        for hit in hits {
            let doc = Document::new(hit.to_document_text(), hit.url);
            if let Err(e) = self.store.write(&doc.text, &doc.source).await {
                warn!(source = %doc.source, error = %e, "cache write failed; skipping");
                cache_failures += 1;
            }
            evidence.push(doc);
        }

        debug!(hits = evidence.len(), cache_failures, "online evidence");
        Retrieval {
            evidence,
            cache_failures,
            ..Retrieval::empty(mode, mode, RetrievalStatus::Ok)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retrieval(docs: &[(&str, &str)]) -> Retrieval {
        Retrieval {
            evidence: docs.iter().map(|(t, s)| Document::new(*t, *s)).collect(),
            ..Retrieval::empty(
                RetrievalMode::Online,
                RetrievalMode::Online,
                RetrievalStatus::Ok,
            )
        }
    }

    #[test]
    fn sources_are_deduplicated_in_order() {
        let r = retrieval(&[
            ("a", "http://b"),
            ("b", ""),
            ("c", "http://a"),
            ("d", "http://b"),
        ]);
        assert_eq!(r.sources(), vec!["http://b".to_string(), "http://a".to_string()]);
    }

    #[test]
    fn guidance_only_for_terminal_statuses() {
        assert_eq!(RetrievalStatus::Ok.guidance(), None);
        assert_eq!(
            RetrievalStatus::NoCache.guidance(),
            Some("No offline data. Try online mode once to build cache.")
        );
        assert!(RetrievalStatus::NoMatch.guidance().is_some());
        assert!(RetrievalStatus::NoResults.guidance().is_some());
    }

    #[test]
    fn wire_names() {
        assert_eq!(serde_json::to_string(&RetrievalStatus::NoCache).unwrap(), "\"NO_CACHE\"");
        let m: RetrievalMode = serde_json::from_str("\"online\"").unwrap();
        assert_eq!(m, RetrievalMode::Online);
    }
}

//! Shared state for all HTTP handlers.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ai_llm_service::config::default_config::{config_ollama_embedding, config_ollama_generation};
use ai_llm_service::service_profiles::LlmServiceProfiles;
use chrono::Utc;
use contextor::{Contextor, ContextorConfig, RetrievalRouter, Session, probe_for};
use rag_store::{RagConfig, RagStore, embedder_for};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use web_search::{SearchConfig, SerperClient};

use crate::error_handler::AppError;

/// Timeout for `/health` probes.
const HEALTH_TIMEOUT_SECS: u64 = 5;

/// Sessions kept in memory before the least recently used one is dropped.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

struct SessionSlot {
    session: Arc<Mutex<Session>>,
    /// Value of the use counter at the last lookup.
    last_used: u64,
}

pub struct AppState {
    pub contextor: Contextor,
    pub store: Arc<RagStore>,
    pub llm: Arc<LlmServiceProfiles>,
    sessions: RwLock<HashMap<String, SessionSlot>>,
    max_sessions: usize,
    next_session: AtomicU64,
    use_counter: AtomicU64,
}

impl AppState {
    pub fn new(contextor: Contextor, llm: Arc<LlmServiceProfiles>) -> Self {
        let store = contextor.router().store().clone();
        Self {
            contextor,
            store,
            llm,
            sessions: RwLock::new(HashMap::new()),
            max_sessions: DEFAULT_MAX_SESSIONS,
            next_session: AtomicU64::new(0),
            use_counter: AtomicU64::new(0),
        }
    }

    /// Caps the session map (at least one session is always kept).
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// Wires the whole service from environment variables.
    ///
    /// # Errors
    /// Any invalid configuration, or an embedder/cache dimension mismatch.
    pub fn from_env() -> Result<Self, AppError> {
        let llm = Arc::new(LlmServiceProfiles::new(
            config_ollama_generation()?,
            config_ollama_embedding()?,
            Some(HEALTH_TIMEOUT_SECS),
        )?);

        let rag_cfg = RagConfig::from_env()?;
        let embedder = embedder_for(&rag_cfg, llm.clone());
        let store = Arc::new(RagStore::open(rag_cfg, embedder)?);

        let search_cfg = SearchConfig::from_env()?;
        if search_cfg.api_key.is_none() {
            info!("SERPER_API_KEY not set; online retrieval will report no results");
        }
        let search_limit = search_cfg.limit;
        let search = Arc::new(SerperClient::new(search_cfg)?);

        let max_sessions = std::env::var("MAX_SESSIONS")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_SESSIONS);

        let ctx_cfg = ContextorConfig::from_env();
        let probe = probe_for(&ctx_cfg)?;

        let router = RetrievalRouter::new(store, search, probe, ctx_cfg.top_k, search_limit);
        Ok(Self::new(Contextor::new(router, llm.clone()), llm).with_max_sessions(max_sessions))
    }

    /// Fresh, process-unique session id.
    pub fn new_session_id(&self) -> String {
        let n = self.next_session.fetch_add(1, Ordering::Relaxed);
        let nanos = Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_else(|| Utc::now().timestamp_micros() * 1000);
        format!("s-{nanos}-{n}")
    }

    /// Session `id`, created on first use.
    ///
    /// Inserting past the cap evicts the least recently used other session.
    pub async fn session(&self, id: &str) -> Arc<Mutex<Session>> {
        let mut sessions = self.sessions.write().await;
        let now = self.use_counter.fetch_add(1, Ordering::Relaxed);
        if let Some(slot) = sessions.get_mut(id) {
            slot.last_used = now;
            return slot.session.clone();
        }

        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            sessions.remove(&oldest);
            debug!(session_id = %oldest, "session evicted");
        }

        let session = Arc::new(Mutex::new(Session::new()));
        sessions.insert(
            id.to_string(),
            SessionSlot {
                session: session.clone(),
                last_used: now,
            },
        );
        session
    }

    /// Session `id` if it exists.
    pub async fn existing_session(&self, id: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions.read().await.get(id).map(|slot| slot.session.clone())
    }

    /// Drops session `id`; returns it if it existed.
    pub async fn remove_session(&self, id: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions.write().await.remove(id).map(|slot| slot.session)
    }

    /// Number of sessions currently held.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

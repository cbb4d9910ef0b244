//! HTTP front end for the hybrid RAG service.

use std::sync::Arc;

mod core;
mod error_handler;
mod routes;

pub use crate::core::app_state::AppState;
pub use crate::error_handler::{AppError, AppResult};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tracing::{error, info};

use crate::routes::{
    ask::ask_route::ask_route,
    health_route::health_route,
    sessions::history_route::{clear_history_route, get_history_route},
    status_route::status_route,
};

/// Default bind address when `API_ADDRESS` is unset.
pub const DEFAULT_API_ADDRESS: &str = "127.0.0.1:8080";

/// All routes over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ask", post(ask_route))
        .route("/status", get(status_route))
        .route("/health", get(health_route))
        .route(
            "/sessions/{id}/history",
            get(get_history_route).delete(clear_history_route),
        )
        .with_state(state)
}

/// Builds state from the environment and serves until Ctrl+C.
///
/// # Errors
/// Configuration errors, or failure to bind `API_ADDRESS`.
pub async fn start() -> Result<(), AppError> {
    let host_url = std::env::var("API_ADDRESS")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_ADDRESS.to_string());
    if host_url.parse::<std::net::SocketAddr>().is_err() {
        return Err(AppError::Address(host_url));
    }

    let state = Arc::new(AppState::from_env()?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, "HTTP server listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("HTTP server stopped");
    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Mutex;

    use ai_llm_service::config::llm_model_config::LlmModelConfig;
    use ai_llm_service::service_profiles::LlmServiceProfiles;
    use ai_llm_service::LlmProvider;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use contextor::generation::GenerateFuture;
    use contextor::{
        Contextor, FixedProbe, GenerationClient, GenerationError, RetrievalRouter,
    };
    use rag_store::{EmbeddingBackend, HashingEmbedder, RagConfig, RagStore};
    use serde_json::Value;
    use tower::ServiceExt;
    use web_search::{LiveSearch, SearchFuture, SearchHit};

    const DIM: usize = 128;

    struct StaticSearch(Vec<SearchHit>);

    impl LiveSearch for StaticSearch {
        fn search<'a>(&'a self, _query: &'a str, limit: usize) -> SearchFuture<'a> {
            let hits = self.0.iter().take(limit).cloned().collect();
            Box::pin(async move { Ok(hits) })
        }
    }

    struct StaticGenerator(Mutex<Option<GenerationError>>);

    impl GenerationClient for StaticGenerator {
        fn generate<'a>(&'a self, _prompt: &'a str) -> GenerateFuture<'a> {
            let out = match self.0.lock().unwrap().clone() {
                Some(e) => Err(e),
                None => Ok("Paris is the capital of France.".to_string()),
            };
            Box::pin(async move { out })
        }
    }

    fn llm() -> Arc<LlmServiceProfiles> {
        let cfg = LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "phi3:mini".into(),
            endpoint: "http://127.0.0.1:9".into(),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(1),
        };
        Arc::new(LlmServiceProfiles::new(cfg.clone(), cfg, Some(1)).unwrap())
    }

    fn state(dir: &Path, online: bool, fail: Option<GenerationError>) -> Arc<AppState> {
        let mut cfg = RagConfig::new_default(dir);
        cfg.dim = DIM;
        cfg.backend = EmbeddingBackend::Hashing;
        let store = Arc::new(RagStore::open(cfg, Arc::new(HashingEmbedder::new(DIM))).unwrap());
        let search = Arc::new(StaticSearch(vec![
            SearchHit::new("Paris", "capital of France", "http://a"),
            SearchHit::new("Paris", "city of light", "http://a"),
        ]));
        let router = RetrievalRouter::new(store, search, Arc::new(FixedProbe::new(online)), 3, 5);
        let generator = Arc::new(StaticGenerator(Mutex::new(fail)));
        Arc::new(AppState::new(Contextor::new(router, generator), llm()))
    }

    async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_ask(body: &str) -> Request<Body> {
        Request::post("/ask")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn offline_ask_on_empty_cache_returns_guidance() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state(dir.path(), true, None));
        let (status, body) = call(app, post_ask(r#"{"question":"hi","mode":"offline"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "NO_CACHE");
        assert_eq!(
            body["data"]["answer"],
            "No offline data. Try online mode once to build cache."
        );
        assert!(body["data"]["session_id"].as_str().is_some());
    }

    #[tokio::test]
    async fn online_ask_answers_and_fills_cache() {
        let dir = tempfile::tempdir().unwrap();
        let st = state(dir.path(), true, None);
        let (status, body) = call(
            router(st.clone()),
            post_ask(r#"{"question":"capital of France?","session_id":"s1"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["answer"], "Paris is the capital of France.");
        assert_eq!(body["data"]["mode"], "online");
        assert_eq!(body["data"]["sources"], serde_json::json!(["http://a"]));
        assert_eq!(body["data"]["session_id"], "s1");

        let (_, status_body) = call(
            router(st.clone()),
            Request::get("/status").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status_body["data"]["cached_documents"], 2);
        assert_eq!(status_body["data"]["vectors"], 2);
        assert_eq!(status_body["data"]["dim"], DIM);
        assert_eq!(status_body["data"]["online"], true);
    }

    #[tokio::test]
    async fn offline_network_falls_back_to_cache() {
        let dir = tempfile::tempdir().unwrap();
        let (_, body) = call(
            router(state(dir.path(), false, None)),
            post_ask(r#"{"question":"capital of France?","mode":"online"}"#),
        )
        .await;
        assert_eq!(body["data"]["requested"], "online");
        assert_eq!(body["data"]["mode"], "offline");
        assert_eq!(body["data"]["status"], "NO_CACHE");
    }

    #[tokio::test]
    async fn blank_question_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = call(router(state(dir.path(), true, None)), post_ask(r#"{"question":"  "}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn malformed_json_is_rejected_in_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = call(router(state(dir.path(), true, None)), post_ask("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn backend_missing_maps_to_bad_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let st = state(
            dir.path(),
            true,
            Some(GenerationError::BackendNotFound("connection refused".into())),
        );
        let (status, body) = call(router(st), post_ask(r#"{"question":"capital of France?"}"#)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "BACKEND_NOT_FOUND");
    }

    #[tokio::test]
    async fn history_lists_newest_first_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let st = state(dir.path(), true, None);
        for q in ["first question", "second question"] {
            let body = format!(r#"{{"question":"{q}","session_id":"abc"}}"#);
            let (status, _) = call(router(st.clone()), post_ask(&body)).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = call(
            router(st.clone()),
            Request::get("/sessions/abc/history").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["exchanges"][0]["question"], "second question");
        assert_eq!(body["data"]["exchanges"][1]["question"], "first question");

        let (status, body) = call(
            router(st.clone()),
            Request::delete("/sessions/abc/history").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["cleared"], 2);

        let (status, _) = call(
            router(st.clone()),
            Request::get("/sessions/abc/history").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(st.session_count().await, 0);
    }

    #[tokio::test]
    async fn anonymous_asks_stay_within_session_cap() {
        let dir = tempfile::tempdir().unwrap();
        let st = Arc::new(
            Arc::into_inner(state(dir.path(), true, None))
                .unwrap()
                .with_max_sessions(8),
        );
        for _ in 0..200 {
            let (status, _) = call(
                router(st.clone()),
                post_ask(r#"{"question":"hi","mode":"offline"}"#),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
        assert_eq!(st.session_count().await, 8);
    }

    #[tokio::test]
    async fn recently_used_session_survives_eviction() {
        let dir = tempfile::tempdir().unwrap();
        let st = Arc::new(
            Arc::into_inner(state(dir.path(), true, None))
                .unwrap()
                .with_max_sessions(2),
        );
        let ask = |id: &'static str| {
            let st = st.clone();
            async move {
                let body = format!(r#"{{"question":"hi","mode":"offline","session_id":"{id}"}}"#);
                call(router(st), post_ask(&body)).await.0
            }
        };
        assert_eq!(ask("keep").await, StatusCode::OK);
        assert_eq!(ask("drop").await, StatusCode::OK);
        assert_eq!(ask("keep").await, StatusCode::OK);
        assert_eq!(ask("new").await, StatusCode::OK);

        assert!(st.existing_session("keep").await.is_some());
        assert!(st.existing_session("drop").await.is_none());
        assert!(st.existing_session("new").await.is_some());
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = call(
            router(state(dir.path(), true, None)),
            Request::get("/sessions/nope/history").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}

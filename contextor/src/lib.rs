//! Hybrid retrieval core: cache-or-web evidence, grounded prompt, answer.
//!
//! Public API: [`Contextor::ask`]. It routes the question to the offline
//! cache or to live search (which also warms the cache), assembles a
//! deterministic prompt, calls the generation backend once, and records the
//! exchange in the caller's [`Session`].

mod api_types;
mod cfg;
mod error;

pub mod connectivity;
pub mod generation;
pub mod prompt;
pub mod router;
pub mod session;

pub use api_types::QaAnswer;
pub use cfg::ContextorConfig;
pub use connectivity::{CachedProbe, ConnectivityProbe, FixedProbe, HttpConnectivityProbe};
pub use error::ContextorError;
pub use generation::{GenerationClient, GenerationError};
pub use prompt::{PromptTemplate, build_prompt, build_prompt_with};
pub use router::{Retrieval, RetrievalMode, RetrievalRouter, RetrievalStatus};
pub use session::{Exchange, Session};

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, instrument};

/// Question answering over the hybrid retriever.
pub struct Contextor {
    router: RetrievalRouter,
    generator: Arc<dyn GenerationClient>,
}

impl Contextor {
    pub fn new(router: RetrievalRouter, generator: Arc<dyn GenerationClient>) -> Self {
        Self { router, generator }
    }

    pub fn router(&self) -> &RetrievalRouter {
        &self.router
    }

    /// Answers `question` using evidence retrieved in `mode`.
    ///
    /// Non-Ok retrievals return the status guidance as the answer without
    /// calling the generator. Every answered question is appended to
    /// `session`; failed generations are not.
    ///
    /// # Errors
    /// - [`ContextorError::EmptyQuestion`] for a blank question
    /// - [`ContextorError::Rag`] if the question cannot be embedded
    /// - [`ContextorError::Generation`] if the backend fails (single attempt)
    ///
    /// # Example
    /// ```no_run
    /// # use contextor::{Contextor, RetrievalMode, Session};
    /// # async fn demo(ctx: &Contextor) -> Result<(), contextor::ContextorError> {
    /// let mut session = Session::new();
    /// let qa = ctx.ask(&mut session, "What is the capital of France?", RetrievalMode::Online).await?;
    /// println!("{} ({:?})", qa.answer, qa.sources);
    /// # Ok(()) }
    /// ```
    #[instrument(skip_all, fields(mode = ?mode))]
    pub async fn ask(
        &self,
        session: &mut Session,
        question: &str,
        mode: RetrievalMode,
    ) -> Result<QaAnswer, ContextorError> {
        if question.trim().is_empty() {
            return Err(ContextorError::EmptyQuestion);
        }

        let retrieval = self.router.retrieve(question, mode).await?;
        let sources = retrieval.sources();

        let answer = match retrieval.status.guidance() {
            Some(guidance) => {
                debug!(status = ?retrieval.status, "no evidence; returning guidance");
                guidance.to_string()
            }
            None => {
                let template = PromptTemplate::for_mode(retrieval.mode);
                let prompt = build_prompt_with(template, question, &retrieval.evidence);
                self.generator.generate(&prompt).await?
            }
        };

        session.record(Exchange {
            question: question.to_string(),
            answer: answer.clone(),
            mode: retrieval.mode,
            status: retrieval.status,
            asked_at: Utc::now(),
        });
        info!(
            status = ?retrieval.status,
            used = ?retrieval.mode,
            evidence = retrieval.evidence.len(),
            "question answered"
        );

        Ok(QaAnswer {
            answer,
            status: retrieval.status,
            requested: retrieval.requested,
            mode: retrieval.mode,
            sources,
            evidence_count: retrieval.evidence.len(),
            cache_failures: retrieval.cache_failures,
            search_error: retrieval.search_error,
        })
    }
}

/// Connectivity probe selected by `cfg`: fixed offline, or HTTP with TTL cache.
///
/// # Errors
/// [`ContextorError::Http`] if the HTTP client cannot be built.
pub fn probe_for(cfg: &ContextorConfig) -> Result<Arc<dyn ConnectivityProbe>, ContextorError> {
    if cfg.force_offline {
        info!("FORCE_OFFLINE set; online retrieval disabled");
        return Ok(Arc::new(FixedProbe::new(false)));
    }
    let http = HttpConnectivityProbe::new(
        cfg.connectivity_url.clone(),
        Duration::from_secs(cfg.connectivity_timeout_secs),
    )?;
    Ok(Arc::new(CachedProbe::new(
        http,
        Duration::from_secs(cfg.connectivity_ttl_secs),
    )))
}

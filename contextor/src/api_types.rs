//! Public API types re-used by external crates (e.g., the HTTP API layer).

use serde::Serialize;

use crate::router::{RetrievalMode, RetrievalStatus};

/// Final answer together with how its evidence was obtained.
///
/// For non-Ok statuses `answer` carries the guidance text and no generation
/// call was made.
///
/// # Example
/// ```
/// use contextor::{QaAnswer, RetrievalMode, RetrievalStatus};
/// let qa = QaAnswer {
///     answer: "No offline data. Try online mode once to build cache.".into(),
///     status: RetrievalStatus::NoCache,
///     requested: RetrievalMode::Offline,
///     mode: RetrievalMode::Offline,
///     sources: vec![],
///     evidence_count: 0,
///     cache_failures: 0,
///     search_error: None,
/// };
/// assert!(!qa.is_grounded());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QaAnswer {
    pub answer: String,
    pub status: RetrievalStatus,
    pub requested: RetrievalMode,
    pub mode: RetrievalMode,
    /// Deduplicated evidence sources, first-seen order.
    pub sources: Vec<String>,
    pub evidence_count: usize,
    pub cache_failures: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_error: Option<String>,
}

impl QaAnswer {
    /// `true` when the answer came from the generation backend.
    pub fn is_grounded(&self) -> bool {
        self.status == RetrievalStatus::Ok
    }
}

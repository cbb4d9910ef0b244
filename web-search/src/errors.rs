//! Error hierarchy for the live search client.

use thiserror::Error;

/// Convenient alias for search results.
pub type SearchResult<T> = Result<T, SearchError>;

/// Failures of the live search provider.
///
/// Callers on the retrieval path collapse every variant into "no web
/// results"; the variant is kept for logs and diagnostics.
#[derive(Debug, Error)]
pub enum SearchError {
    /// No API key configured; online search is unavailable.
    #[error("[SEARCH] SERPER_API_KEY is not set")]
    MissingApiKey,

    /// Invalid configuration value.
    #[error("[SEARCH] invalid config {var}: {reason}")]
    Config { var: &'static str, reason: String },

    /// Network/transport failure without HTTP status (DNS/connect/reset).
    #[error("[SEARCH] network error: {0}")]
    Transport(String),

    /// Timeout at transport level.
    #[error("[SEARCH] request timed out")]
    Timeout,

    /// Non-2xx status from the provider.
    #[error("[SEARCH] http status {status}: {snippet}")]
    HttpStatus { status: u16, snippet: String },

    /// Unexpected/invalid shape of the provider response.
    #[error("[SEARCH] invalid provider response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return SearchError::Timeout;
        }
        if e.is_decode() {
            return SearchError::Decode(e.to_string());
        }
        if let Some(status) = e.status() {
            return SearchError::HttpStatus {
                status: status.as_u16(),
                snippet: String::new(),
            };
        }
        SearchError::Transport(e.to_string())
    }
}

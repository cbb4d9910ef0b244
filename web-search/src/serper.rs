//! Serper.dev client (Google results over a JSON POST API).
//!
//! Endpoint: `POST {url}` with header `X-API-KEY` and body
//! `{"q": ..., "num": ..., "hl": ...}`; ranked results come back under
//! `organic[]` as `{title, link, snippet}`.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::SearchConfig;
use crate::errors::{SearchError, SearchResult};
use crate::types::SearchHit;
use crate::{LiveSearch, SearchFuture};

/// Serper HTTP client.
#[derive(Debug, Clone)]
pub struct SerperClient {
    http: Client,
    cfg: SearchConfig,
}

#[derive(Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: usize,
    hl: &'a str,
}

#[derive(Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperOrganic>,
}

#[derive(Deserialize)]
struct SerperOrganic {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl SerperClient {
    /// Builds a client with the configured request timeout.
    ///
    /// # Errors
    /// [`SearchError::Transport`] if the HTTP client cannot be built.
    pub fn new(cfg: SearchConfig) -> SearchResult<Self> {
        let http = Client::builder()
            .user_agent("hybrid-rag/0.1")
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        debug!(url = %cfg.url, limit = cfg.limit, "Creating SerperClient");
        Ok(Self { http, cfg })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.cfg
    }

    /// Runs one search and returns hits in provider ranking order.
    ///
    /// # Errors
    /// - [`SearchError::MissingApiKey`] when no key is configured
    /// - [`SearchError::Timeout`] / [`SearchError::Transport`] on network failures
    /// - [`SearchError::HttpStatus`] for non-2xx responses
    /// - [`SearchError::Decode`] for an unexpected body
    #[instrument(skip_all, fields(limit = limit))]
    pub async fn search_hits(&self, query: &str, limit: usize) -> SearchResult<Vec<SearchHit>> {
        let key = self.cfg.api_key.as_deref().ok_or(SearchError::MissingApiKey)?;

        let body = SerperRequest {
            q: query,
            num: limit,
            hl: &self.cfg.language,
        };
        let resp = self
            .http
            .post(&self.cfg.url)
            .header("X-API-KEY", key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "serper returned an error status");
            return Err(SearchError::HttpStatus {
                status: status.as_u16(),
                snippet: snippet(&text),
            });
        }

        let hits = parse_organic(&text, limit)?;
        debug!(hits = hits.len(), "serper search finished");
        Ok(hits)
    }
}

impl LiveSearch for SerperClient {
    fn search<'a>(&'a self, query: &'a str, limit: usize) -> SearchFuture<'a> {
        Box::pin(self.search_hits(query, limit))
    }
}

/// Extracts at most `limit` ranked hits from a Serper response body.
fn parse_organic(body: &str, limit: usize) -> SearchResult<Vec<SearchHit>> {
    let parsed: SerperResponse =
        serde_json::from_str(body).map_err(|e| SearchError::Decode(e.to_string()))?;
    Ok(parsed
        .organic
        .into_iter()
        .take(limit)
        .map(|o| SearchHit::new(o.title, o.snippet, o.link))
        .collect())
}

fn snippet(body: &str) -> String {
    let flat = body.replace(['\n', '\r'], " ");
    match flat.char_indices().nth(200) {
        Some((idx, _)) => format!("{}…", &flat[..idx]),
        None => flat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn organic_results_keep_ranking() {
        let body = r#"{
            "searchParameters": {"q": "capital of France"},
            "organic": [
                {"title": "Paris", "link": "http://a", "snippet": "capital of France", "position": 1},
                {"title": "France", "link": "http://b", "snippet": "country in Europe", "position": 2},
                {"title": "Lyon", "snippet": "third city"}
            ]
        }"#;
        let hits = parse_organic(body, 5).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0], SearchHit::new("Paris", "capital of France", "http://a"));
        assert_eq!(hits[1].url, "http://b");
        assert_eq!(hits[2].url, "");
    }

    #[test]
    fn limit_is_enforced_locally() {
        let body = r#"{"organic":[{"title":"a"},{"title":"b"},{"title":"c"}]}"#;
        assert_eq!(parse_organic(body, 2).unwrap().len(), 2);
    }

    #[test]
    fn missing_organic_is_empty() {
        assert!(parse_organic(r#"{"answerBox":{}}"#, 5).unwrap().is_empty());
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(parse_organic("<html>", 5), Err(SearchError::Decode(_))));
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let client = SerperClient::new(SearchConfig::default()).unwrap();
        let err = client.search("anything", 5).await.unwrap_err();
        assert!(matches!(err, SearchError::MissingApiKey));
    }
}

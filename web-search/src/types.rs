//! Provider-agnostic search result model.

use serde::{Deserialize, Serialize};

/// One ranked web result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    /// Result link; may be empty when the provider omits it.
    pub url: String,
}

impl SearchHit {
    pub fn new(title: impl Into<String>, snippet: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
            url: url.into(),
        }
    }

    /// Evidence text stored in the offline cache and fed to the prompt.
    pub fn to_document_text(&self) -> String {
        format!("Title: {}\nSnippet: {}", self.title, self.snippet)
            .trim()
            .to_string()
    }
}

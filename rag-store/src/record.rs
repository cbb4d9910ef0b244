//! Core data models used by the library.

use serde::{Deserialize, Serialize};

/// A cached evidence item. Position `i` in the document store describes
/// vector `i` in the index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    /// URI of the origin, or empty when unknown.
    #[serde(default)]
    pub source: String,
}

impl Document {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
        }
    }

    /// Source as an option; empty strings count as missing.
    pub fn source(&self) -> Option<&str> {
        let s = self.source.trim();
        (!s.is_empty()).then_some(s)
    }
}

/// One nearest-neighbor match in the vector index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    /// Squared Euclidean distance to the query.
    pub distance: f32,
}

/// A retrieval hit: neighbor plus the aligned document.
#[derive(Clone, Debug, PartialEq)]
pub struct RagHit {
    pub position: usize,
    pub distance: f32,
    pub document: Document,
}

/// Counters describing the cache, as shown to operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub documents: usize,
    pub vectors: usize,
    pub dim: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_source_is_none() {
        assert_eq!(Document::new("t", "  ").source(), None);
        assert_eq!(Document::new("t", "http://a").source(), Some("http://a"));
    }

    #[test]
    fn missing_source_field_defaults_to_empty() {
        let d: Document = serde_json::from_str(r#"{"text":"hello"}"#).unwrap();
        assert_eq!(d, Document::new("hello", ""));
    }
}

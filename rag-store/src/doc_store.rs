//! Ordered, append-only document metadata persisted as JSON Lines.
//!
//! One `{"text": ..., "source": ...}` object per line; line `i` describes
//! vector `i` of the index. Reading is strict: a single malformed line makes
//! the whole file untrustworthy, since skipping it would shift every later
//! position.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::errors::RagError;
use crate::persist::{LoadOutcome, write_atomic};
use crate::record::Document;

/// Positionally aligned document sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentStore {
    docs: Vec<Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Document at `position`, if any.
    pub fn get(&self, position: usize) -> Option<&Document> {
        self.docs.get(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.iter()
    }

    /// Appends one document and returns its position.
    pub fn append(&mut self, doc: Document) -> usize {
        self.docs.push(doc);
        self.docs.len() - 1
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.docs.truncate(len);
    }

    /// Loads documents from `path`, degrading to an empty store when the file
    /// is absent or unreadable. Never fails.
    pub fn load(path: &Path) -> (Self, LoadOutcome) {
        if !path.exists() {
            debug!(path = %path.display(), "document file missing; starting empty");
            return (Self::new(), LoadOutcome::Missing);
        }
        match read_all_documents(path) {
            Ok(docs) => {
                let n = docs.len();
                info!(path = %path.display(), count = n, "document store loaded");
                (Self { docs }, LoadOutcome::Loaded(n))
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "document file unreadable; starting empty");
                (Self::new(), LoadOutcome::Corrupt(e.to_string()))
            }
        }
    }

    /// Rewrites the whole document file atomically.
    pub fn persist(&self, path: &Path) -> Result<(), RagError> {
        // Serialize up front so an encoding failure never reaches the disk.
        let mut lines = Vec::with_capacity(self.docs.len());
        for doc in &self.docs {
            lines.push(serde_json::to_string(doc)?);
        }
        write_atomic(path, |w| {
            for line in &lines {
                w.write_all(line.as_bytes())?;
                w.write_all(b"\n")?;
            }
            Ok(())
        })?;
        debug!(path = %path.display(), count = self.docs.len(), "document store persisted");
        Ok(())
    }
}

/// Reads every document strictly. Empty lines are ignored.
///
/// # Errors
/// - [`RagError::Io`] if the file cannot be read.
/// - [`RagError::Corrupt`] naming the first line that fails to parse.
fn read_all_documents(path: &Path) -> Result<Vec<Document>, RagError> {
    let reader = BufReader::new(File::open(path)?);

    let mut out = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: Document = serde_json::from_str(&line)
            .map_err(|e| RagError::Corrupt(format!("line {} parse error: {}", i + 1, e)))?;
        out.push(doc);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn append_assigns_positions_in_order() {
        let mut store = DocumentStore::new();
        assert_eq!(store.append(Document::new("a", "")), 0);
        assert_eq!(store.append(Document::new("b", "http://b")), 1);
        assert_eq!(store.get(1).map(|d| d.text.as_str()), Some("b"));
        assert!(store.get(2).is_none());
    }

    #[test]
    fn persist_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rag_docs.jsonl");
        let mut store = DocumentStore::new();
        store.append(Document::new("Title: Paris\nSnippet: capital of France", "http://a"));
        store.append(Document::new("quote \" and unicode ✓", ""));
        store.persist(&path).unwrap();

        let (loaded, outcome) = DocumentStore::load(&path);
        assert_eq!(outcome, LoadOutcome::Loaded(2));
        assert_eq!(loaded, store);
        // One JSON object per line, embedded newlines escaped.
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 2);
    }

    #[test]
    fn malformed_line_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rag_docs.jsonl");
        fs::write(
            &path,
            "{\"text\":\"ok\",\"source\":\"\"}\n{not json}\n{\"text\":\"later\"}\n",
        )
        .unwrap();
        let (store, outcome) = DocumentStore::load(&path);
        match outcome {
            LoadOutcome::Corrupt(msg) => assert!(msg.contains("line 2")),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(store.is_empty());
    }

    #[test]
    fn blank_lines_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rag_docs.jsonl");
        fs::write(&path, "\n{\"text\":\"x\",\"source\":\"s\"}\n\n").unwrap();
        let (store, outcome) = DocumentStore::load(&path);
        assert_eq!(outcome, LoadOutcome::Loaded(1));
        assert_eq!(store.get(0), Some(&Document::new("x", "s")));
    }
}

//! Prompt assembler: evidence block, instructions, verbatim question.
//!
//! Output is a pure function of its inputs so prompts can be compared
//! byte-for-byte in tests.

use rag_store::Document;

use crate::router::RetrievalMode;

/// Instruction variants; evidence provenance changes the wording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptTemplate {
    /// Evidence from the offline cache.
    Cache,
    /// Evidence from a fresh web search.
    Web,
}

impl PromptTemplate {
    pub fn for_mode(mode: RetrievalMode) -> Self {
        match mode {
            RetrievalMode::Offline => PromptTemplate::Cache,
            RetrievalMode::Online => PromptTemplate::Web,
        }
    }

    fn instructions(self) -> &'static str {
        match self {
            PromptTemplate::Cache => {
                "Answer factually using the given CONTEXT.\n\
                 If unsure, say \"Information not found locally.\""
            }
            PromptTemplate::Web => "Answer factually using this recent web search context.",
        }
    }
}

/// Builds the grounding prompt with the cache template.
///
/// # Example
/// ```
/// use contextor::prompt::build_prompt;
/// use rag_store::Document;
/// let ev = vec![Document::new("Title: Paris\nSnippet: capital of France", "http://a")];
/// let p = build_prompt("capital of France?", &ev);
/// assert!(p.starts_with("CONTEXT:\nTitle: Paris"));
/// assert!(p.ends_with("Answer clearly:"));
/// ```
pub fn build_prompt(query: &str, evidence: &[Document]) -> String {
    build_prompt_with(PromptTemplate::Cache, query, evidence)
}

/// Builds the grounding prompt with an explicit template.
///
/// Layout: `CONTEXT:` followed by evidence texts in the given order joined by
/// a blank line, then the instructions, then `QUESTION:` with the query
/// verbatim, then the `Answer clearly:` trailer.
pub fn build_prompt_with(template: PromptTemplate, query: &str, evidence: &[Document]) -> String {
    let context = evidence
        .iter()
        .map(|d| d.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut out = String::with_capacity(context.len() + query.len() + 256);
    out.push_str("CONTEXT:\n");
    out.push_str(&context);
    out.push_str("\n\n");
    out.push_str(template.instructions());
    out.push_str("\n\nQUESTION:\n");
    out.push_str(query);
    out.push_str("\n\nAnswer clearly:");
    out
}

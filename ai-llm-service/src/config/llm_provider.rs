/// Backend used for language model inference and embeddings.
///
/// Only a local Ollama runtime is wired today; the enum keeps the seam open
/// for other hosted providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Local Ollama runtime for on-device inference.
    Ollama,
}

use contextor::{QaAnswer, RetrievalMode};
use serde::{Deserialize, Serialize};

/// Request payload for `POST /ask`.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Natural language question.
    pub question: String,
    /// `"online"` (default) or `"offline"`.
    #[serde(default)]
    pub mode: Option<RetrievalMode>,
    /// Conversation to append to; a new one is created when absent.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response payload for `POST /ask`.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub session_id: String,
    #[serde(flatten)]
    pub qa: QaAnswer,
}

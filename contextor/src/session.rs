//! Caller-owned question/answer history.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::router::{RetrievalMode, RetrievalStatus};

/// One answered question.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
    /// Mode actually used to retrieve evidence.
    pub mode: RetrievalMode,
    pub status: RetrievalStatus,
    pub asked_at: DateTime<Utc>,
}

/// History of one conversation. Owned by the front end, not the core.
#[derive(Clone, Debug, Default)]
pub struct Session {
    exchanges: Vec<Exchange>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, exchange: Exchange) {
        self.exchanges.push(exchange);
    }

    /// Exchanges, newest first.
    pub fn history(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    pub fn clear(&mut self) {
        self.exchanges.clear();
    }
}

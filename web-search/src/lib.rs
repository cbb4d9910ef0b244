//! Live Search Client: ranked web snippets for a query.
//!
//! The retrieval core depends only on the [`LiveSearch`] trait; the
//! production implementation is [`SerperClient`].

pub mod config;
pub mod errors;
pub mod serper;
pub mod types;

pub use config::SearchConfig;
pub use errors::{SearchError, SearchResult};
pub use serper::SerperClient;
pub use types::SearchHit;

use std::{future::Future, pin::Pin};

/// Boxed future returned by [`LiveSearch::search`].
pub type SearchFuture<'a> = Pin<Box<dyn Future<Output = SearchResult<Vec<SearchHit>>> + Send + 'a>>;

/// Live web search capability.
pub trait LiveSearch: Send + Sync {
    /// Returns up to `limit` hits in the provider's ranking order.
    fn search<'a>(&'a self, query: &'a str, limit: usize) -> SearchFuture<'a>;
}

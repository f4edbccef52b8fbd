//! Search cache port.
//!
//! Keyed on the raw query string. Only location-free queries are cached,
//! since location-biased results depend on where the user is.

use async_trait::async_trait;

use crate::domain::conversation::Place;

#[async_trait]
pub trait SearchCache: Send + Sync {
    /// Returns cached results for `query`, or `None` on a miss.
    async fn get(&self, query: &str) -> Result<Option<Vec<Place>>, SearchCacheError>;

    /// Stores results for `query`, replacing any previous entry.
    async fn put(&self, query: &str, places: &[Place]) -> Result<(), SearchCacheError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchCacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("cache entry could not be decoded: {0}")]
    Corrupt(String),
}

//! Place search port - keyword venue lookup.

use async_trait::async_trait;

use crate::domain::conversation::{GeoPoint, Place};

/// Searches local businesses by free-text keyword.
///
/// Implementations return at most a handful of ranked candidates
/// (see `MAX_PLACE_CANDIDATES`) with HTML already stripped from names.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Search for venues matching `query`, optionally biased to `location`.
    async fn search(&self, query: &str, location: Option<GeoPoint>)
        -> Result<Vec<Place>, SearchError>;
}

/// Place search errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("search provider is not configured")]
    NotConfigured,

    #[error("search provider returned status {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_search_is_object_safe() {
        fn _accepts_dyn(_search: &dyn PlaceSearch) {}
    }

    #[test]
    fn provider_error_displays_status() {
        let err = SearchError::Provider {
            status: 429,
            message: "quota".to_string(),
        };
        assert_eq!(err.to_string(), "search provider returned status 429: quota");
    }
}

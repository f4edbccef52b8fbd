//! Place search returning a fixed candidate list, for tests and offline runs.

use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

use crate::domain::conversation::{GeoPoint, Place};
use crate::ports::{PlaceSearch, SearchError};

#[derive(Debug, Default)]
pub struct StaticPlaceSearch {
    results: Vec<Place>,
    error: Option<SearchError>,
    queries: Mutex<Vec<String>>,
}

impl StaticPlaceSearch {
    pub fn new(results: Vec<Place>) -> Self {
        Self {
            results,
            ..Self::default()
        }
    }

    /// A search that always fails with `error`.
    pub fn failing(error: SearchError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    /// Queries received so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl PlaceSearch for StaticPlaceSearch {
    async fn search(
        &self,
        query: &str,
        _location: Option<GeoPoint>,
    ) -> Result<Vec<Place>, SearchError> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.to_string());

        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(self.results.clone()),
        }
    }
}

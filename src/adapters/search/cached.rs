//! Caching decorator over any [`PlaceSearch`].
//!
//! Only location-free queries touch the cache. Cache failures are logged and
//! ignored; empty result lists are never cached.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::conversation::{GeoPoint, Place};
use crate::ports::{PlaceSearch, SearchCache, SearchError};

pub struct CachedPlaceSearch {
    inner: Arc<dyn PlaceSearch>,
    cache: Arc<dyn SearchCache>,
}

impl CachedPlaceSearch {
    pub fn new(inner: Arc<dyn PlaceSearch>, cache: Arc<dyn SearchCache>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl PlaceSearch for CachedPlaceSearch {
    async fn search(
        &self,
        query: &str,
        location: Option<GeoPoint>,
    ) -> Result<Vec<Place>, SearchError> {
        if location.is_some() {
            return self.inner.search(query, location).await;
        }

        match self.cache.get(query).await {
            Ok(Some(cached)) if !cached.is_empty() => {
                tracing::debug!(query, "Search cache hit");
                return Ok(cached);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(query, error = %e, "Search cache lookup failed"),
        }

        let places = self.inner.search(query, None).await?;

        if !places.is_empty() {
            if let Err(e) = self.cache.put(query, &places).await {
                tracing::warn!(query, error = %e, "Failed to cache search results");
            }
        }

        Ok(places)
    }
}

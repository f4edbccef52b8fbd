//! In-memory search cache with a fixed time-to-live.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::domain::conversation::Place;
use crate::ports::{SearchCache, SearchCacheError};

#[derive(Debug, Clone)]
struct Entry {
    places: Vec<Place>,
    stored_at: Instant,
}

#[derive(Debug, Clone)]
pub struct InMemorySearchCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    ttl: Duration,
}

impl InMemorySearchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }
}

#[async_trait]
impl SearchCache for InMemorySearchCache {
    async fn get(&self, query: &str) -> Result<Option<Vec<Place>>, SearchCacheError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(query)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.places.clone()))
    }

    async fn put(&self, query: &str, places: &[Place]) -> Result<(), SearchCacheError> {
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        entries.insert(
            query.to_string(),
            Entry {
                places: places.to_vec(),
                stored_at: Instant::now(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::place::test_support::place;

    #[tokio::test]
    async fn returns_stored_results() {
        let cache = InMemorySearchCache::new(Duration::from_secs(60));

        cache.put("카페", &[place("OO카페", None)]).await.unwrap();

        let hit = cache.get("카페").await.unwrap().unwrap();
        assert_eq!(hit[0].name, "OO카페");
        assert!(cache.get("식당").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_misses() {
        let cache = InMemorySearchCache::new(Duration::from_millis(10));
        cache.put("카페", &[place("OO카페", None)]).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(cache.get("카페").await.unwrap().is_none());
    }
}

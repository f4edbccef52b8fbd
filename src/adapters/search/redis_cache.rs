//! Redis-backed search cache for multi-instance deployments.
//!
//! Each query is stored as a JSON array under `wigvo:search:{query}` with
//! `SET ... EX ttl`, so expiry is handled by Redis.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use crate::domain::conversation::Place;
use crate::ports::{SearchCache, SearchCacheError};

const KEY_PREFIX: &str = "wigvo:search:";

#[derive(Clone)]
pub struct RedisSearchCache {
    conn: MultiplexedConnection,
    ttl: Duration,
}

impl RedisSearchCache {
    pub fn new(conn: MultiplexedConnection, ttl: Duration) -> Self {
        Self { conn, ttl }
    }

    /// Opens a multiplexed connection to `url`.
    pub async fn connect(url: &str, ttl: Duration) -> Result<Self, SearchCacheError> {
        let client = redis::Client::open(url)
            .map_err(|e: redis::RedisError| SearchCacheError::Backend(e.to_string()))?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e: redis::RedisError| SearchCacheError::Backend(e.to_string()))?;
        Ok(Self::new(conn, ttl))
    }
}

fn cache_key(query: &str) -> String {
    format!("{}{}", KEY_PREFIX, query.trim())
}

#[async_trait]
impl SearchCache for RedisSearchCache {
    async fn get(&self, query: &str) -> Result<Option<Vec<Place>>, SearchCacheError> {
        let mut conn = self.conn.clone();

        let raw: Option<String> = conn
            .get(cache_key(query))
            .await
            .map_err(|e: redis::RedisError| SearchCacheError::Backend(e.to_string()))?;

        raw.map(|json| {
            serde_json::from_str(&json).map_err(|e| SearchCacheError::Corrupt(e.to_string()))
        })
        .transpose()
    }

    async fn put(&self, query: &str, places: &[Place]) -> Result<(), SearchCacheError> {
        let json =
            serde_json::to_string(places).map_err(|e| SearchCacheError::Corrupt(e.to_string()))?;
        let mut conn = self.conn.clone();

        conn.set_ex::<_, _, ()>(cache_key(query), json, self.ttl.as_secs().max(1))
            .await
            .map_err(|e: redis::RedisError| SearchCacheError::Backend(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_prefixed_and_trimmed() {
        assert_eq!(cache_key("  강남 미용실 "), "wigvo:search:강남 미용실");
    }

    #[tokio::test]
    #[ignore = "Requires a running Redis instance"]
    async fn integration_round_trip() {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string());
        let cache = RedisSearchCache::connect(&url, Duration::from_secs(30))
            .await
            .unwrap();
        let places = vec![crate::domain::conversation::place::test_support::place("OO카페", None)];

        cache.put("통합테스트 카페", &places).await.unwrap();

        assert_eq!(cache.get("통합테스트 카페").await.unwrap(), Some(places));
    }
}

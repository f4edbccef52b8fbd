//! Place search adapters.
//!
//! - `NaverPlaceSearch` - Naver local search API
//! - `CachedPlaceSearch` - decorator consulting a `SearchCache` for location-free queries
//! - `InMemorySearchCache` / `RedisSearchCache` - cache backends
//! - `StaticPlaceSearch` - fixed results for tests and offline runs

mod cached;
mod fixed;
mod memory_cache;
mod naver;
mod redis_cache;

pub use cached::CachedPlaceSearch;
pub use fixed::StaticPlaceSearch;
pub use memory_cache::InMemorySearchCache;
pub use naver::{NaverPlaceSearch, NaverSearchConfig};
pub use redis_cache::RedisSearchCache;

//! Shared counter store. Backs the rate limiter's atomic path and the view
//! counter. Redis in production; in-memory doubles in tests.

pub mod redis_store;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increments `key` and, on its first increment, sets it to
    /// expire after `window_secs`. Returns the post-increment count.
    async fn incr_in_window(&self, key: &str, window_secs: u64) -> Result<i64, CacheError>;

    async fn incr(&self, key: &str) -> Result<i64, CacheError>;

    async fn get(&self, key: &str) -> Result<Option<i64>, CacheError>;

    async fn ping(&self) -> Result<(), CacheError>;
}

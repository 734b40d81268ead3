//! `CounterStore` test doubles.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::cache::{CacheError, CounterStore};

/// Atomic in-process counters. Expiry is not modelled.
#[derive(Default)]
pub struct MemoryCounterStore {
    counters: Mutex<HashMap<String, i64>>,
}

impl MemoryCounterStore {
    pub fn value(&self, key: &str) -> Option<i64> {
        self.counters.lock().unwrap().get(key).copied()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn incr_in_window(&self, key: &str, _window_secs: u64) -> Result<i64, CacheError> {
        self.incr(key).await
    }

    async fn incr(&self, key: &str) -> Result<i64, CacheError> {
        let mut counters = self.counters.lock().unwrap();
        let count = counters.entry(key.to_string()).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    async fn get(&self, key: &str) -> Result<Option<i64>, CacheError> {
        Ok(self.value(key))
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Every call fails, as if Redis were down.
pub struct FailingCounterStore;

#[async_trait]
impl CounterStore for FailingCounterStore {
    async fn incr_in_window(&self, _key: &str, _window_secs: u64) -> Result<i64, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn incr(&self, _key: &str) -> Result<i64, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn get(&self, _key: &str) -> Result<Option<i64>, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}

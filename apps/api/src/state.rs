use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use crate::cache::CounterStore;
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::rate_limit::{LocalLimiter, RateLimiter};
use crate::session::HistoryTracker;
use crate::store::PortfolioStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once at startup; nothing in the crate keeps module-level mutable state.
#[derive(Clone)]
pub struct AppState {
    /// Absent when `DATABASE_URL` is unset.
    pub store: Option<Arc<dyn PortfolioStore>>,
    /// Absent when `REDIS_URL` is unset or unreachable at startup.
    pub counters: Option<Arc<dyn CounterStore>>,
    pub llm: LlmClient,
    pub rate_limiter: Arc<RateLimiter>,
    pub history: HistoryTracker,
    /// View counter used when there is no shared counter store.
    pub local_views: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(
        store: Option<Arc<dyn PortfolioStore>>,
        counters: Option<Arc<dyn CounterStore>>,
        llm: LlmClient,
        ip_hash_salt: &str,
    ) -> Self {
        let rate_limiter = RateLimiter::new(counters.clone(), Arc::new(LocalLimiter::default()));
        Self {
            history: HistoryTracker::new(store.clone(), ip_hash_salt),
            store,
            counters,
            llm,
            rate_limiter: Arc::new(rate_limiter),
            local_views: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn require_store(&self) -> Result<&Arc<dyn PortfolioStore>, AppError> {
        self.store.as_ref().ok_or(AppError::StoreUnavailable)
    }
}

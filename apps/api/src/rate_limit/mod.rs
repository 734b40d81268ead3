//! Per-endpoint, per-client request throttle.
//!
//! Primary path: one atomic INCR-with-expiry against the shared counter store.
//! When that store is missing or errors, fail-closed endpoints fall back to the
//! process-local limiter and fail-open endpoints let the request through.

pub mod local;

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, warn};

use crate::cache::CounterStore;

pub use local::LocalLimiter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitConfig {
    pub max: u32,
    pub window: Duration,
    pub fail_closed: bool,
}

impl LimitConfig {
    /// Window length in whole seconds, rounded up, never zero.
    pub fn window_secs(&self) -> u64 {
        let secs = self.window.as_secs() + u64::from(self.window.subsec_nanos() > 0);
        secs.max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    AnalyzeJd,
    Chat,
}

impl Endpoint {
    pub fn key(&self) -> &'static str {
        match self {
            Endpoint::AnalyzeJd => "analyze-jd",
            Endpoint::Chat => "chat",
        }
    }

    pub fn limit(&self) -> LimitConfig {
        match self {
            Endpoint::AnalyzeJd => LimitConfig {
                max: 10,
                window: Duration::from_secs(3600),
                fail_closed: true,
            },
            Endpoint::Chat => LimitConfig {
                max: 15,
                window: Duration::from_secs(3600),
                fail_closed: true,
            },
        }
    }
}

pub struct RateLimiter {
    shared: Option<Arc<dyn CounterStore>>,
    local: Arc<LocalLimiter>,
}

impl RateLimiter {
    pub fn new(shared: Option<Arc<dyn CounterStore>>, local: Arc<LocalLimiter>) -> Self {
        Self { shared, local }
    }

    pub fn local(&self) -> &Arc<LocalLimiter> {
        &self.local
    }

    /// Returns whether `identity` may call `endpoint` now. Counts the attempt.
    pub async fn check(&self, endpoint: Endpoint, identity: &str) -> bool {
        self.check_with(endpoint.key(), &endpoint.limit(), identity)
            .await
    }

    pub async fn check_with(&self, name: &str, limit: &LimitConfig, identity: &str) -> bool {
        let Some(shared) = self.shared.as_ref() else {
            return self.fallback(name, limit, identity, "unavailable");
        };

        let key = format!("ratelimit:{name}:{identity}");
        match shared.incr_in_window(&key, limit.window_secs()).await {
            Ok(count) => count <= i64::from(limit.max),
            Err(e) => {
                error!("Rate limit check error for {name}: {e}");
                self.fallback(name, limit, identity, "error")
            }
        }
    }

    fn fallback(&self, name: &str, limit: &LimitConfig, identity: &str, reason: &str) -> bool {
        if !limit.fail_closed {
            return true;
        }
        warn!("Rate limiting: shared store {reason}, using in-memory fallback for {name}");
        self.local.check(&format!("{name}:{identity}"), limit)
    }
}

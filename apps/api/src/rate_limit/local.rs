//! Process-local fixed-window limiter used when the shared counter store is
//! down. The map is bounded by a periodic sweep.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::debug;

use crate::rate_limit::LimitConfig;

/// Hard cap on tracked (endpoint, identity) windows after a sweep.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started: Instant,
    length: Duration,
}

impl Window {
    fn expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) > self.length
    }
}

pub struct LocalLimiter {
    windows: Mutex<HashMap<String, Window>>,
    max_entries: usize,
}

impl Default for LocalLimiter {
    fn default() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }
}

impl LocalLimiter {
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_entries,
        }
    }

    pub fn check(&self, key: &str, limit: &LimitConfig) -> bool {
        self.check_at(key, limit, Instant::now())
    }

    /// Counts one request for `key` at `now`. A missing or expired window
    /// restarts at 1 and is always allowed.
    pub fn check_at(&self, key: &str, limit: &LimitConfig, now: Instant) -> bool {
        let mut windows = self.lock();

        match windows.get_mut(key) {
            Some(window) if !window.expired_at(now) => {
                window.count = window.count.saturating_add(1);
                window.count <= limit.max
            }
            _ => {
                windows.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        started: now,
                        length: limit.window,
                    },
                );
                true
            }
        }
    }

    pub fn sweep(&self) {
        self.sweep_at(Instant::now());
    }

    /// Drops expired windows, then evicts the oldest-started windows until the
    /// map is back under `max_entries`.
    pub fn sweep_at(&self, now: Instant) {
        let mut windows = self.lock();
        let before = windows.len();

        windows.retain(|_, window| !window.expired_at(now));

        if windows.len() > self.max_entries {
            let mut by_age: Vec<(String, Instant)> = windows
                .iter()
                .map(|(key, window)| (key.clone(), window.started))
                .collect();
            by_age.sort_by_key(|(_, started)| *started);

            let excess = windows.len() - self.max_entries;
            for (key, _) in by_age.into_iter().take(excess) {
                windows.remove(&key);
            }
        }

        debug!(
            "Rate limit sweep: {} -> {} local windows",
            before,
            windows.len()
        );
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Runs `sweep` every `SWEEP_INTERVAL` until the returned task is aborted.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            ticker.tick().await; // first tick fires immediately
            loop {
                ticker.tick().await;
                limiter.sweep();
            }
        })
    }

    // Never held across an await, so a std mutex is enough.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Window>> {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

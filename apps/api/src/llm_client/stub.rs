//! `CompletionProvider` test doubles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{CompletionProvider, CompletionRequest, ProviderError};

/// Returns a canned reply (or a 500) and records every request it sees.
pub struct StubProvider {
    reply: Option<String>,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl StubProvider {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(ProviderError::Api {
                status: 500,
                message: "upstream exploded".to_string(),
            }),
        }
    }
}

/// Sleeps before answering "finally".
pub struct SlowProvider {
    delay: Duration,
}

impl SlowProvider {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl CompletionProvider for SlowProvider {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<String, ProviderError> {
        tokio::time::sleep(self.delay).await;
        Ok("finally".to_string())
    }
}

//! Mock implementation of `SearchBackend` for testing
//!
//! Replays queued responses in order (falling back to a default response)
//! and records every request so tests can assert on the generated DSL.

use crate::{EsError, EsResult, EsSearchResponse, SearchBackend};
use async_trait::async_trait;
use codescope_common::CorrelationId;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A request the mock received
#[derive(Debug, Clone)]
pub struct RecordedSearch {
    pub index: String,
    pub body: Value,
    pub correlation_id: CorrelationId,
}

/// Mock search backend
#[derive(Clone, Default)]
pub struct MockSearchBackend {
    queued: Arc<Mutex<VecDeque<EsSearchResponse>>>,
    fallback: EsSearchResponse,
    recorded: Arc<Mutex<Vec<RecordedSearch>>>,
    fail_on_search: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockSearchBackend {
    /// A backend that answers every search with no hits
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every search with `response` once the queue is drained
    #[must_use]
    pub fn with_response(mut self, response: EsSearchResponse) -> Self {
        self.fallback = response;
        self
    }

    /// Queue responses returned one per search, in order
    #[must_use]
    pub fn with_queued(self, responses: Vec<EsSearchResponse>) -> Self {
        lock(&self.queued).extend(responses);
        self
    }

    /// Configure to fail on search operations (for testing error handling)
    #[must_use]
    pub const fn with_search_failure(mut self) -> Self {
        self.fail_on_search = true;
        self
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<RecordedSearch> {
        lock(&self.recorded).clone()
    }

    /// Body of the most recent request
    pub fn last_body(&self) -> Option<Value> {
        lock(&self.recorded).last().map(|r| r.body.clone())
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        lock(&self.recorded).len()
    }
}

#[async_trait]
impl SearchBackend for MockSearchBackend {
    async fn search(
        &self,
        index: &str,
        body: Value,
        correlation_id: &CorrelationId,
    ) -> EsResult<EsSearchResponse> {
        lock(&self.recorded).push(RecordedSearch {
            index: index.to_string(),
            body,
            correlation_id: correlation_id.clone(),
        });

        tracing::debug!(correlation_id = %correlation_id, index, "Mock search operation");

        if self.fail_on_search {
            return Err(EsError::Status {
                status: 503,
                body: "mock backend configured to fail".to_string(),
            });
        }

        let next = lock(&self.queued).pop_front();
        Ok(next.unwrap_or_else(|| self.fallback.clone()))
    }

    async fn ping(&self) -> EsResult<()> {
        if self.fail_on_search {
            Err(EsError::Transport("mock backend configured to fail".to_string()))
        } else {
            Ok(())
        }
    }
}

//! In-process loader backed by a map of resource bodies.
//! Used for offline sessions and for exercising the cache in tests.

use super::{FetchCause, FetchError, ResourceLoader};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
enum Body {
    Json(String),
    Fail(FetchCause),
}

#[derive(Default)]
pub struct MemoryLoader {
    bodies: Mutex<HashMap<String, Body>>,
    calls: Mutex<HashMap<String, usize>>,
    latency: Option<Duration>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fetch sleeps this long before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_json(self, resource: &str, body: impl Into<String>) -> Self {
        self.put_json(resource, body);
        self
    }

    pub fn with_failure(self, resource: &str, cause: FetchCause) -> Self {
        self.put_failure(resource, cause);
        self
    }

    /// Replace the body served for `resource`.
    pub fn put_json(&self, resource: &str, body: impl Into<String>) {
        self.bodies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(resource.to_string(), Body::Json(body.into()));
    }

    pub fn put_failure(&self, resource: &str, cause: FetchCause) {
        self.bodies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(resource.to_string(), Body::Fail(cause));
    }

    /// How many times `resource` has been requested.
    pub fn calls(&self, resource: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(resource)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }
}

#[async_trait]
impl ResourceLoader for MemoryLoader {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch(&self, resource: &str) -> Result<serde_json::Value, FetchError> {
        *self
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(resource.to_string())
            .or_insert(0) += 1;

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let body = self
            .bodies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(resource)
            .cloned();
        debug!(resource, found = body.is_some(), "memory fetch");

        match body {
            Some(Body::Json(text)) => serde_json::from_str(&text)
                .map_err(|e| FetchError::new(resource, FetchCause::InvalidJson(e.to_string()))),
            Some(Body::Fail(cause)) => Err(FetchError::new(resource, cause)),
            None => Err(FetchError::new(resource, FetchCause::NotFound)),
        }
    }
}

//! Resource loaders: fetch one named JSON resource, no caching.

pub mod http;
pub mod memory;

pub use http::HttpLoader;
pub use memory::MemoryLoader;

use async_trait::async_trait;
use thiserror::Error;

/// Why a single resource could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchCause {
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("body is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("unknown resource")]
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to fetch `{resource}`: {cause}")]
pub struct FetchError {
    pub resource: String,
    pub cause: FetchCause,
}

impl FetchError {
    pub fn new(resource: impl Into<String>, cause: FetchCause) -> Self {
        Self {
            resource: resource.into(),
            cause,
        }
    }
}

#[async_trait]
pub trait ResourceLoader: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Fetch and parse one resource. Never retries.
    async fn fetch(&self, resource: &str) -> Result<serde_json::Value, FetchError>;
}

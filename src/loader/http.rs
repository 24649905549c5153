//! Static JSON over plain HTTP GET.

use super::{FetchCause, FetchError, ResourceLoader};
use crate::config::HttpConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

pub struct HttpLoader {
    client: Client,
    base_url: Url,
}

impl HttpLoader {
    pub fn new(base_url: Url, http: &HttpConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(http.timeout_secs))
            .user_agent(http.user_agent.clone())
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resource names are relative to the base URL.
    pub fn resolve(&self, resource: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(resource)
            .map_err(|e| FetchError::new(resource, FetchCause::Transport(e.to_string())))
    }
}

#[async_trait]
impl ResourceLoader for HttpLoader {
    fn name(&self) -> &'static str {
        "http"
    }

    #[instrument(skip(self), fields(loader = self.name()))]
    async fn fetch(&self, resource: &str) -> Result<serde_json::Value, FetchError> {
        let url = self.resolve(resource)?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::new(resource, FetchCause::Timeout)
            } else {
                FetchError::new(resource, FetchCause::Transport(e.to_string()))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "non-success status");
            return Err(FetchError::new(resource, FetchCause::Status(status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::new(resource, FetchCause::Transport(e.to_string())))?;
        debug!(bytes = body.len(), "fetched");

        serde_json::from_str(&body)
            .map_err(|e| FetchError::new(resource, FetchCause::InvalidJson(e.to_string())))
    }
}

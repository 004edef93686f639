//! HTTP adapter for Elasticsearch/OpenSearch-compatible engines.
//!
//! Thin plumbing: one POST to `{base}/{index}/_search` per call, basic
//! auth and request timeout from [`EngineConfig`]. No query logic lives
//! here.

use serde_json::Value;

use crate::config::EngineConfig;
use crate::engine::{SearchEngine, SearchResponse};
use crate::error::{Result, VecinaError};

/// A [`SearchEngine`] reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEngine {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl HttpEngine {
    /// Build an engine client from connection settings.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| VecinaError::engine(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Override the base URL, e.g. to point at a test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl SearchEngine for HttpEngine {
    async fn search(&self, index: &str, body: &Value) -> Result<SearchResponse> {
        let url = format!("{}/{}/_search", self.base_url, index);
        log::debug!("POST {url}");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(body)
            .send()
            .await
            .map_err(|e| VecinaError::engine(format!("search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VecinaError::engine(format!(
                "engine returned {status} for {url}"
            )));
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| VecinaError::engine(format!("failed to decode engine response: {e}")))
    }
}

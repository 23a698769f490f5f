//! Search backend abstraction and the Elasticsearch HTTP implementation

use crate::{EsError, EsResult, EsSearchResponse};
use async_trait::async_trait;
use codescope_common::CorrelationId;
use codescope_config::ElasticsearchConfig;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Longest error body kept in [`EsError::Status`]
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Trait for search backends
///
/// Everything above this seam builds query DSL documents; implementations only
/// have to execute them against an index (or index pattern).
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Execute a search request body against `index`
    async fn search(
        &self,
        index: &str,
        body: Value,
        correlation_id: &CorrelationId,
    ) -> EsResult<EsSearchResponse>;

    /// Check that the backend is reachable
    async fn ping(&self) -> EsResult<()>;
}

/// Elasticsearch over HTTP
#[derive(Clone)]
pub struct HttpSearchBackend {
    client: reqwest::Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl HttpSearchBackend {
    /// Build a backend from configuration
    ///
    /// # Errors
    /// Returns `EsError::Configuration` if the HTTP client cannot be built
    pub fn new(config: &ElasticsearchConfig) -> EsResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| EsError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.username {
            Some(username) => request.basic_auth(username, self.password.as_ref()),
            None => request,
        }
    }

    fn search_url(&self, index: &str) -> String {
        format!("{}/{index}/_search", self.base_url)
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    #[instrument(skip(self, body, correlation_id), fields(correlation_id = %correlation_id))]
    async fn search(
        &self,
        index: &str,
        body: Value,
        correlation_id: &CorrelationId,
    ) -> EsResult<EsSearchResponse> {
        let url = self.search_url(index);
        debug!(correlation_id = %correlation_id, %url, "Sending search request");

        let response = self
            .with_auth(self.client.post(&url))
            .header("X-Opaque-Id", correlation_id.to_string())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(
                correlation_id = %correlation_id,
                status = status.as_u16(),
                index,
                "Search request rejected"
            );
            return Err(EsError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let parsed: EsSearchResponse = serde_json::from_str(&text)?;
        debug!(
            correlation_id = %correlation_id,
            took = parsed.took,
            total = parsed.total(),
            "Search request completed"
        );
        Ok(parsed)
    }

    async fn ping(&self) -> EsResult<()> {
        let response = self.with_auth(self.client.get(&self.base_url)).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(EsError::Status {
                status: status.as_u16(),
                body: String::new(),
            })
        }
    }
}

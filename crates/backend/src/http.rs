//! HTTP backend implementation.
//!
//! Talks to the FinRAG FastAPI backend over reqwest. Query requests use a
//! generous timeout because answer generation can involve live crawling;
//! the auxiliary endpoints (clear, stats, health) use short timeouts.

use std::time::Duration;

use finrag_core::{AppConfig, AppError, AppResult};

use crate::client::{
    Backend, ClearResponse, HealthStatus, QueryRequest, QueryResponse, VectorStats,
};

/// Timeout for the health endpoint.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Conversation-clear request body.
#[derive(Debug, serde::Serialize)]
struct ClearRequest<'a> {
    conversation_id: Option<&'a str>,
}

/// HTTP client for the FinRAG backend.
pub struct HttpBackend {
    /// Base URL for the backend API
    base_url: String,

    /// Shared HTTP client
    client: reqwest::Client,

    query_timeout: Duration,
    clear_timeout: Duration,
    stats_timeout: Duration,
}

impl HttpBackend {
    /// Create a backend client with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            query_timeout: Duration::from_secs(finrag_core::config::DEFAULT_QUERY_TIMEOUT_SECS),
            clear_timeout: Duration::from_secs(finrag_core::config::DEFAULT_CLEAR_TIMEOUT_SECS),
            stats_timeout: Duration::from_secs(finrag_core::config::DEFAULT_STATS_TIMEOUT_SECS),
        }
    }

    /// Create a backend client from application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.api_base.clone(),
            client: reqwest::Client::new(),
            query_timeout: config.query_timeout(),
            clear_timeout: config.clear_timeout(),
            stats_timeout: config.stats_timeout(),
        }
    }

    /// The base URL this client targets.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Turn a non-success response into an `AppError::Backend` with the
    /// status code and whatever body text is available.
    async fn status_error(response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        AppError::Backend(format!("Backend API error ({}): {}", status, body))
    }
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn query(&self, request: &QueryRequest) -> AppResult<QueryResponse> {
        tracing::info!("Sending query request to backend");
        tracing::debug!("Request: {:?}", request);

        let url = format!("{}/query", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .timeout(self.query_timeout)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to send query request: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let query_response: QueryResponse = response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to parse query response: {}", e)))?;

        tracing::info!(
            "Received answer ({} chars, {} sources)",
            query_response.answer.len(),
            query_response.contexts.len()
        );

        Ok(query_response)
    }

    async fn clear_conversation(&self, conversation_id: Option<&str>) -> AppResult<ClearResponse> {
        tracing::debug!("Clearing conversation state: {:?}", conversation_id);

        let url = format!("{}/vector/clear", self.base_url);
        let body = ClearRequest { conversation_id };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .timeout(self.clear_timeout)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to send clear request: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to parse clear response: {}", e)))
    }

    async fn stats(&self) -> AppResult<VectorStats> {
        let url = format!("{}/vector/stats", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(self.stats_timeout)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to send stats request: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to parse stats response: {}", e)))
    }

    async fn health(&self) -> AppResult<HealthStatus> {
        let url = format!("{}/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to reach backend: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to parse health response: {}", e)))
    }
}

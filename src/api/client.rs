//! Production client for `/chat/completions` endpoints.

use super::retry::RetryPolicy;
use super::{parse_retry_after_secs, CompletionClient};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

/// Client for OpenAI-compatible completion APIs.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    retry_policy: RetryPolicy,
}

impl ApiClient {
    /// Build a client from resolved API configuration.
    pub fn new(config: &ApiConfig, timeout: Duration) -> Self {
        Self::with_retry_policy(config, timeout, RetryPolicy::default())
    }

    fn with_retry_policy(config: &ApiConfig, timeout: Duration, retry_policy: RetryPolicy) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.trim().to_string(),
            retry_policy,
        }
    }

    /// Send one completion request, retrying transient failures.
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        let mut attempt: u32 = 0;
        loop {
            match self.send_once(request).await {
                Ok(response) => return Ok(response),
                Err(err) => {
                    if !self.retry_policy.should_retry(&err, attempt) {
                        return Err(err);
                    }
                    let delay = self.retry_policy.retry_delay_for(attempt, &err);
                    attempt = attempt.saturating_add(1);
                    tracing::warn!(
                        error = %err,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "retrying completion request"
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    async fn send_once(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut req = self.http.post(&url).json(request);

        // Only add auth for non-empty keys (local endpoints skip this).
        if !self.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let response = req.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let retry_after_secs = parse_retry_after_secs(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::status(status, body, retry_after_secs));
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(ApiError::from)
    }
}

#[async_trait]
impl CompletionClient for ApiClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        ApiClient::complete(self, request).await
    }
}

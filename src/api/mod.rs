//! HTTP client for OpenAI-compatible completion APIs.
//!
//! The completion request is one-shot request/response: no streaming. The
//! [`CompletionClient`] trait is the seam the orchestration loop depends on;
//! [`ApiClient`] is the production implementation.

use crate::error::ApiError;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;

mod client;
mod retry;

pub use client::ApiClient;

/// Minimal completion API interface used by the orchestration loop.
///
/// This trait lets tests provide deterministic mock responses without
/// network calls while the production path uses [`ApiClient`].
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError>;
}

/// Parse a `Retry-After` header as either delta-seconds or an HTTP-date.
pub(crate) fn parse_retry_after_secs(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    let value = headers.get(reqwest::header::RETRY_AFTER)?.to_str().ok()?;
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(secs);
    }
    let when = httpdate::parse_http_date(value).ok()?;
    when.duration_since(std::time::SystemTime::now())
        .ok()
        .map(|delta| delta.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};

    #[test]
    fn parses_delta_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
        assert_eq!(parse_retry_after_secs(&headers), Some(7));
    }

    #[test]
    fn parses_http_date_in_the_future() {
        let when = std::time::SystemTime::now() + std::time::Duration::from_secs(90);
        let formatted = httpdate::fmt_http_date(when);
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_str(&formatted).unwrap());
        let secs = parse_retry_after_secs(&headers).expect("future date should parse");
        assert!(secs <= 90, "got: {secs}");
        assert!(secs >= 85, "got: {secs}");
    }

    #[test]
    fn ignores_missing_or_garbage_values() {
        assert_eq!(parse_retry_after_secs(&HeaderMap::new()), None);
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));
        assert_eq!(parse_retry_after_secs(&headers), None);
    }
}

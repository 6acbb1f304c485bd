//! Shared reqwest plumbing: client construction and error mapping
use permit_core::{ServiceError, ServiceResult};
use reqwest::{Client, Response};
use std::time::Duration;

/// Longest response body quoted in an error
const ERROR_BODY_CHARS: usize = 320;

/// Where a service lives and how to authenticate against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Endpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `base_url` joined with `path`, without doubled slashes.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub(crate) fn require_key(&self, service: &str) -> ServiceResult<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ServiceError::NotConfigured(format!("{} requires an api key", service)))
    }
}

pub(crate) fn build_client(timeout: Duration) -> ServiceResult<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("permit-pipeline/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ServiceError::NotConfigured(format!("failed to build HTTP client: {}", e)))
}

pub(crate) fn transport(service: &str, err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        ServiceError::Timeout(format!("{} did not answer in time", service))
    } else if err.is_decode() {
        ServiceError::Decode(format!("invalid {} response: {}", service, err))
    } else {
        ServiceError::Transport(format!("{} request failed: {}", service, err))
    }
}

/// Pass successful responses through; turn anything else into `Http`.
pub(crate) async fn check_status(service: &str, response: Response) -> ServiceResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(service, status = status.as_u16(), "upstream call failed");
    Err(ServiceError::Http {
        status: status.as_u16(),
        message: format!("{} error: {}", service, truncate(&body, ERROR_BODY_CHARS)),
    })
}

pub(crate) fn truncate(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let endpoint = Endpoint::new("https://api.example.com/v1/");
        assert_eq!(endpoint.url("/search"), "https://api.example.com/v1/search");
        assert_eq!(endpoint.url("chat/completions"), "https://api.example.com/v1/chat/completions");
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        let endpoint = Endpoint::new("https://api.example.com").with_api_key("  ");
        assert!(matches!(
            endpoint.require_key("search"),
            Err(ServiceError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}

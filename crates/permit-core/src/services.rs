//! Outbound service contracts: design platform, search, reasoning, fetch
use crate::error::ServiceResult;
use crate::upstream::{UpstreamProject, UpstreamSystem};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Read-only access to the external design platform.
#[async_trait]
pub trait DesignPlatform: Send + Sync {
    /// Project record by external id.
    async fn fetch_project(&self, external_id: &str) -> ServiceResult<UpstreamProject>;

    /// System and BOM records for a project, in platform order.
    async fn fetch_systems(&self, external_id: &str) -> ServiceResult<Vec<UpstreamSystem>>;

    /// Rendered site layout for one system.
    async fn fetch_site_layout(&self, system_id: &str) -> ServiceResult<FetchedDocument>;
}

/// A keyword search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    /// Empty means unscoped
    pub include_domains: Vec<String>,
    pub num_results: u8,
    pub include_text: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[async_trait]
pub trait SearchService: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> ServiceResult<Vec<SearchHit>>;
}

/// Single-turn prompt in, free text out.
#[async_trait]
pub trait ReasoningService: Send + Sync {
    async fn complete(&self, prompt: &str) -> ServiceResult<String>;
}

/// Bytes downloaded from a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub url: String,
    pub content_type: Option<String>,
    /// Capped at `max_bytes + 1`
    pub bytes: Vec<u8>,
    /// Set when the body (or declared length) went past `max_bytes`
    pub exceeded_limit: bool,
}

#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Download `url`, reading at most `max_bytes + 1` bytes.
    async fn fetch(&self, url: &str, max_bytes: u64) -> ServiceResult<FetchedDocument>;
}
